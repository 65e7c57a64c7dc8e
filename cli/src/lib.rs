//! Headless driver for the home search component: mounts it on a page,
//! replays an interaction script against a live storefront and reports
//! where the component ended up.

mod console_host;
pub mod script;

pub use console_host::ConsoleHost;
pub use console_host::NavigationRecord;
pub use script::Command;
pub use script::parse_script;

use anyhow::Context;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use storefront_dom::Document;
use storefront_dom::Selector;
use storefront_home_search::COMPONENT_TAG;
use storefront_home_search::Collaborators;
use storefront_home_search::DocumentEvents;
use storefront_home_search::HomeSearch;
use storefront_home_search::HomeSearchConfig;
use storefront_home_search::find_component;
use storefront_recently_viewed::RecentlyViewedStore;
use storefront_section_renderer::SectionRenderer;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Page used when none is given: the component with every ref it needs and
/// some content around it to click on.
pub const DEFAULT_PAGE: &str = r#"<header id="site-header"><a href="/">Home</a></header>
<home-search-component data-section-id="predictive-search">
  <form action="/search" role="search">
    <input ref="searchInput" type="search" name="q" autocomplete="off">
    <button ref="resetButton" type="button" hidden>Clear</button>
  </form>
  <div ref="predictiveSearchResults" class="predictive-search-results" hidden></div>
</home-search-component>
<main id="main"></main>"#;

pub struct RunOptions {
    pub page: String,
    pub location: Url,
    pub config: HomeSearchConfig,
    pub renderer: Arc<dyn SectionRenderer>,
    pub recently_viewed: Arc<dyn RecentlyViewedStore>,
    /// Print each navigation to stdout as it happens.
    pub echo_navigations: bool,
}

/// State of the component once the script has run and everything settled.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub open: bool,
    pub term: String,
    pub input: String,
    pub selected: Option<usize>,
    pub results: String,
    pub navigations: Vec<NavigationRecord>,
    pub errors: Vec<String>,
}

pub async fn run_script(options: RunOptions, commands: &[Command]) -> Result<RunReport> {
    let RunOptions {
        page,
        location,
        config,
        renderer,
        recently_viewed,
        echo_navigations,
    } = options;

    let document = Document::parse(&page).context("failed to parse page markup")?;
    let component =
        find_component(&document).with_context(|| format!("page has no <{COMPONENT_TAG}>"))?;
    let host = Arc::new(ConsoleHost::new(location, false, echo_navigations));
    let events = DocumentEvents::new();
    let collaborators = Collaborators::new(renderer, recently_viewed, host.clone());
    let mut widget = HomeSearch::mount(document, component, config, collaborators, &events)?;
    widget.on_document_loaded();

    for command in commands {
        apply(&mut widget, &events, command).await?;
    }
    widget.settle().await;

    let report = RunReport {
        open: widget.is_open(),
        term: widget.session().term.clone(),
        input: widget.input_value().to_string(),
        selected: widget.cursor().index(),
        results: widget.results_markup(),
        navigations: host.navigations(),
        errors: host.errors(),
    };
    widget.unmount();
    Ok(report)
}

async fn apply(widget: &mut HomeSearch, events: &DocumentEvents, command: &Command) -> Result<()> {
    debug!(?command, "applying script command");
    match command {
        Command::Edit { value, kind } => widget.on_input_changed(value, *kind),
        Command::Key(press) => {
            let outcome = widget.on_key_down(*press);
            debug!(?press, prevent_default = outcome.prevent_default, "key handled");
        }
        Command::Focus => widget.on_focus_input(),
        Command::Reset => widget.on_reset_clicked(),
        Command::Click(selector) => {
            let parsed = Selector::parse(selector)?;
            let document = widget.document();
            let target = document
                .query(document.root(), &parsed)
                .with_context(|| format!("nothing on the page matches `{selector}`"))?;
            events.click(target);
        }
        Command::Pointer => widget.on_pointer_over(),
        Command::ClearRecentlyViewed => widget.clear_recently_viewed(),
        Command::Settle => widget.settle().await,
        Command::Wait(duration) => run_for(widget, *duration).await,
    }
    Ok(())
}

/// Keeps the component processing events for `duration`, or until it is
/// unmounted.
async fn run_for(widget: &mut HomeSearch, duration: Duration) {
    let drive = async { while widget.tick().await {} };
    if timeout(duration, drive).await.is_ok() {
        debug!("component unmounted while waiting");
    }
}
