//! Lenient HTML-fragment tokenizing on top of `quick-xml`, plus the inverse
//! serializer.
//!
//! Section markup is HTML, not XML, so the reader runs with end-name checks
//! off, HTML attribute rules (bare and unquoted values) and knowledge of void
//! elements. `script`, `style`, `textarea` and `title` bodies are read as
//! text up to their end tag. Named entities follow the HTML5 table.

use crate::document::Document;
use crate::document::NodeId;
use crate::document::NodeKind;
use crate::error::DomError;
use crate::error::Result;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use tracing::trace;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// `textarea` and `title` still resolve character references.
fn is_escapable_raw_text(tag: &str) -> bool {
    matches!(tag, "textarea" | "title")
}

fn html_reader(markup: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);
    reader.trim_text(false);
    reader
}

/// Length of the raw text body at the start of `rest` and the offset just
/// past its end tag. An unterminated body runs to the end of input.
fn raw_text_end(rest: &str, tag: &str) -> (usize, usize) {
    let lowered = rest.to_ascii_lowercase();
    let needle = format!("</{tag}");
    let mut from = 0;
    while let Some(found) = lowered[from..].find(&needle) {
        let start = from + found;
        let after = start + needle.len();
        let terminated = lowered[after..]
            .chars()
            .next()
            .is_none_or(|ch| ch == '>' || ch == '/' || ch.is_ascii_whitespace());
        if terminated {
            let resume = lowered[after..]
                .find('>')
                .map_or(rest.len(), |close| after + close + 1);
            return (start, resume);
        }
        from = after;
    }
    (rest.len(), rest.len())
}

/// Resolves character references, HTML5 named entities included. A
/// reference that cannot be resolved stays as literal text.
fn decode_html(raw: &str) -> String {
    match unescape(raw) {
        Ok(value) => value.into_owned(),
        Err(_) => decode_leniently(raw),
    }
}

fn decode_leniently(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let resolved = tail.find(';').and_then(|end| {
            unescape(&tail[..=end])
                .ok()
                .map(|value| (value.into_owned(), end + 1))
        });
        match resolved {
            Some((value, consumed)) => {
                out.push_str(&value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

impl Document {
    /// Parses `markup` as a fragment: its top-level nodes become children of
    /// [`Document::root`]. Whitespace-only text is dropped.
    pub fn parse(markup: &str) -> Result<Self> {
        let mut document = Document::new();
        let root = document.root();
        document.append_markup(root, markup)?;
        Ok(document)
    }

    /// Parses `markup` and appends the resulting nodes under `parent`.
    pub fn append_markup(&mut self, parent: NodeId, markup: &str) -> Result<()> {
        // Byte offset of `reader`'s input within `markup`; the reader is
        // restarted past every raw text element body.
        let mut offset = 0;
        let mut reader = html_reader(markup);

        let mut open: Vec<NodeId> = vec![parent];
        loop {
            let event = reader.read_event().map_err(|err| DomError::MalformedMarkup {
                position: offset + reader.buffer_position(),
                message: err.to_string(),
            })?;
            let current = open.last().copied().unwrap_or(parent);
            match event {
                Event::Start(start) => {
                    let element = self.element_from(&start);
                    self.append_child(current, element);
                    let tag = self.tag(element).unwrap_or_default().to_string();
                    if is_raw_text(&tag) {
                        let body_start = offset + reader.buffer_position();
                        let (body_len, resume) = raw_text_end(&markup[body_start..], &tag);
                        let body = &markup[body_start..body_start + body_len];
                        if !body.is_empty() {
                            let value = if is_escapable_raw_text(&tag) {
                                decode_html(body)
                            } else {
                                body.to_string()
                            };
                            let node = self.create_text(&value);
                            self.append_child(element, node);
                        }
                        offset = body_start + resume;
                        reader = html_reader(&markup[offset..]);
                    } else if !is_void(&tag) {
                        open.push(element);
                    }
                }
                Event::Empty(start) => {
                    let element = self.element_from(&start);
                    self.append_child(current, element);
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase();
                    // Close the nearest matching open element; stray end tags are ignored.
                    if let Some(depth) = open
                        .iter()
                        .skip(1)
                        .rposition(|id| self.tag(*id) == Some(name.as_str()))
                    {
                        open.truncate(depth + 1);
                    } else {
                        trace!(tag = %name, "ignoring unmatched end tag");
                    }
                }
                Event::Text(text) => {
                    let value = decode_html(&String::from_utf8_lossy(&text));
                    if !value.trim().is_empty() {
                        let node = self.create_text(&value);
                        self.append_child(current, node);
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    let node = self.create_text(&value);
                    self.append_child(current, node);
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
        Ok(())
    }

    /// Outer markup of `id`. For [`Document::root`] this is the markup of all
    /// top-level nodes.
    pub fn outer_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        if id == self.root() {
            for child in self.children(id) {
                self.write_node(*child, &mut out);
            }
        } else {
            self.write_node(id, &mut out);
        }
        out
    }

    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn element_from(&mut self, start: &BytesStart<'_>) -> NodeId {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let element = self.create_element(&tag);
        for attribute in start.html_attributes().flatten() {
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = decode_html(&String::from_utf8_lossy(&attribute.value));
            self.set_attr(element, &key, &value);
        }
        element
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => {
                let raw = self
                    .parent(id)
                    .and_then(|parent| self.tag(parent))
                    .is_some_and(|tag| is_raw_text(tag) && !is_escapable_raw_text(tag));
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            Some(NodeKind::Element(data)) => {
                out.push('<');
                out.push_str(&data.tag);
                for (key, value) in &data.attributes {
                    out.push(' ');
                    out.push_str(key);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        escape_into(value, true, out);
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void(&data.tag) {
                    return;
                }
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(&data.tag);
                out.push('>');
            }
            None => {}
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}
