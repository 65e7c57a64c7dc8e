//! Selectable result items, derived from the rendered tree on every access.
//!
//! Nothing here is cached: a reconciliation may have replaced every item
//! node, so positions and selection are re-read from the markup each time.

use crate::session::NavigationSource;
use storefront_dom::Document;
use storefront_dom::NodeId;
use storefront_dom::Selector;

pub const QUERIES_REGION: &str = "predictive-search-results__wrapper-queries";
pub const PRODUCTS_REGION: &str = "predictive-search-results__wrapper-products";
pub const LIST_REGION: &str = "predictive-search-results__list";
pub const CARD: &str = "predictive-search-results__card";
pub const KEYBOARD_FOCUS: &str = "keyboard-focus";
pub const ARIA_SELECTED: &str = "aria-selected";

/// Highlight position: on the input itself or on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Input,
    At(usize),
}

impl Cursor {
    /// Next position, wrapping from the last item (or the input) to the first.
    pub fn next(self, count: usize) -> Option<usize> {
        match self {
            _ if count == 0 => None,
            Cursor::At(index) if index + 1 < count => Some(index + 1),
            _ => Some(0),
        }
    }

    /// Previous position, wrapping from the first item (or the input) to the
    /// last.
    pub fn previous(self, count: usize) -> Option<usize> {
        match self {
            _ if count == 0 => None,
            Cursor::At(index) if index > 0 && index < count => Some(index - 1),
            _ => Some(count - 1),
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Cursor::Input => None,
            Cursor::At(index) => Some(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub position: usize,
    pub node: NodeId,
    pub selected: bool,
    /// `href` of the item's first link, unresolved.
    pub activation_target: Option<String>,
}

/// Read/write view of the result items below a scope element.
#[derive(Debug, Clone, Copy)]
pub struct ResultsIndex {
    scope: NodeId,
}

impl ResultsIndex {
    pub fn new(scope: NodeId) -> Self {
        Self { scope }
    }

    /// Items in region order (queries, products, generic list), then in
    /// document order within a region. An element listed by more than one
    /// region keeps its first position.
    pub fn item_nodes(&self, document: &Document) -> Vec<NodeId> {
        let card = Selector::class(CARD);
        let item = Selector::any_of([Selector::attr_eq("ref", "resultsItems[]"), card.clone()]);
        let mut nodes: Vec<NodeId> = Vec::new();
        for (region_class, item_selector) in [
            (QUERIES_REGION, &item),
            (PRODUCTS_REGION, &card),
            (LIST_REGION, &item),
        ] {
            for region in document.query_all(self.scope, &Selector::class(region_class)) {
                for node in document.query_all(region, item_selector) {
                    if !nodes.contains(&node) {
                        nodes.push(node);
                    }
                }
            }
        }
        nodes
    }

    pub fn current_items(&self, document: &Document) -> Vec<ResultItem> {
        let link = Selector::tag("a");
        self.item_nodes(document)
            .into_iter()
            .enumerate()
            .map(|(position, node)| ResultItem {
                position,
                node,
                selected: is_selected(document, node),
                activation_target: activation_link(document, node, &link)
                    .and_then(|anchor| document.attr(anchor, "href"))
                    .map(str::to_string),
            })
            .collect()
    }

    pub fn current_index(&self, document: &Document) -> Cursor {
        self.item_nodes(document)
            .into_iter()
            .position(|node| is_selected(document, node))
            .map_or(Cursor::Input, Cursor::At)
    }

    /// Moves the selection markers to `cursor` and returns the newly selected
    /// node. `None` when there are no items, in which case nothing changes.
    ///
    /// Keyboard focus styling is applied only for keyboard-driven moves.
    pub fn set_index(
        &self,
        document: &mut Document,
        cursor: Cursor,
        source: NavigationSource,
    ) -> Option<Option<NodeId>> {
        let nodes = self.item_nodes(document);
        if nodes.is_empty() {
            return None;
        }
        for node in &nodes {
            document.remove_class(*node, KEYBOARD_FOCUS);
        }
        let mut selected = None;
        for (position, node) in nodes.iter().copied().enumerate() {
            if cursor == Cursor::At(position) {
                document.set_attr(node, ARIA_SELECTED, "true");
                if source == NavigationSource::Keyboard {
                    document.add_class(node, KEYBOARD_FOCUS);
                }
                selected = Some(node);
            } else {
                document.remove_attr(node, ARIA_SELECTED);
            }
        }
        Some(selected)
    }

    /// Drops keyboard focus styling from every item.
    pub fn clear_keyboard_focus(&self, document: &mut Document) {
        for node in self.item_nodes(document) {
            document.remove_class(node, KEYBOARD_FOCUS);
        }
    }
}

/// The item itself when it is a link, otherwise its first descendant link.
fn activation_link(document: &Document, node: NodeId, link: &Selector) -> Option<NodeId> {
    if link.matches(document, node) {
        Some(node)
    } else {
        document.query(node, link)
    }
}

fn is_selected(document: &Document, node: NodeId) -> bool {
    document.attr(node, ARIA_SELECTED) == Some("true")
}
