//! Line-oriented interaction scripts.
//!
//! ```text
//! # comments and blank lines are skipped
//! input shoes          text entry, the rest of the line is the new value
//! erase                deletion, here down to an empty field
//! key shift+Tab        DOM key name, optionally shift-modified
//! click main#main      document click on the first node matching a selector
//! wait 250             keep the component running for 250ms
//! settle               run until no timer or request is pending
//! ```
//!
//! Commands only feed events in; timers, responses and clicks are processed
//! during `wait`, `settle` and the implicit settle at the end of the script.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::time::Duration;
use storefront_home_search::InputKind;
use storefront_home_search::Key;
use storefront_home_search::KeyPress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The field now holds `value`, changed by the given kind of edit.
    Edit { value: String, kind: InputKind },
    Key(KeyPress),
    Focus,
    Reset,
    Click(String),
    Pointer,
    ClearRecentlyViewed,
    Settle,
    Wait(Duration),
}

pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let command =
            parse_line(line.trim_start()).with_context(|| format!("line {}", index + 1))?;
        commands.push(command);
    }
    Ok(commands)
}

fn parse_line(line: &str) -> Result<Command> {
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = match word {
        "input" => edit(rest, InputKind::InsertText),
        "paste" => edit(rest, InputKind::Paste),
        "erase" => edit(rest, InputKind::DeleteBackward),
        "key" => Command::Key(parse_key(rest.trim())?),
        "focus" => Command::Focus,
        "reset" => Command::Reset,
        "click" => {
            let selector = rest.trim();
            if selector.is_empty() {
                bail!("`click` needs a selector");
            }
            Command::Click(selector.to_string())
        }
        "pointer" => Command::Pointer,
        "clear-recently-viewed" => Command::ClearRecentlyViewed,
        "settle" => Command::Settle,
        "wait" => {
            let millis: u64 = rest
                .trim()
                .parse()
                .with_context(|| format!("`wait` needs milliseconds, got `{}`", rest.trim()))?;
            Command::Wait(Duration::from_millis(millis))
        }
        other => bail!("unknown command `{other}`"),
    };
    Ok(command)
}

fn edit(value: &str, kind: InputKind) -> Command {
    Command::Edit {
        value: value.to_string(),
        kind,
    }
}

fn parse_key(spec: &str) -> Result<KeyPress> {
    let (shift, name) = match spec.strip_prefix("shift+") {
        Some(name) => (true, name),
        None => (false, spec),
    };
    if name.is_empty() {
        bail!("`key` needs a key name");
    }
    let key = Key::from_dom(name);
    Ok(if shift {
        KeyPress::shifted(key)
    } else {
        KeyPress::new(key)
    })
}
