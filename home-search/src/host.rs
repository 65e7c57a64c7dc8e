//! The page-level side effects the component asks its embedder to perform.

use crate::error::HomeSearchError;
use parking_lot::Mutex;
use storefront_dom::NodeId;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// A full-page navigation requested by the component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The `data-single-result-url` shortcut.
    SingleResult(Url),
    /// Primary activation of the highlighted item's link.
    ActivateItem(Url),
    /// The full search results page for the typed term.
    SearchPage(Url),
}

impl Navigation {
    pub fn url(&self) -> &Url {
        match self {
            Navigation::SingleResult(url)
            | Navigation::ActivateItem(url)
            | Navigation::SearchPage(url) => url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Navigation::SingleResult(_) => "single-result",
            Navigation::ActivateItem(_) => "item",
            Navigation::SearchPage(_) => "search-page",
        }
    }
}

pub trait Host: Send + Sync {
    /// URL of the page the component is mounted on.
    fn location(&self) -> Url;

    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    fn focus(&self, node: NodeId);

    /// Scrolls `node` into view with `block: nearest` semantics.
    fn scroll_into_view(&self, node: NodeId, behavior: ScrollBehavior);

    /// Scrolls the results viewport back to the top.
    fn reset_scroll(&self, node: NodeId);

    fn navigate(&self, navigation: Navigation);

    /// Process-wide sink for failures the component does not recover from.
    fn report_unhandled(&self, error: &HomeSearchError);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Focus(NodeId),
    ScrollIntoView(NodeId, ScrollBehavior),
    ResetScroll(NodeId),
    Navigate(Navigation),
    Unhandled(String),
}

/// [`Host`] that records every call, for tests and headless embedding.
#[derive(Debug)]
pub struct RecordingHost {
    location: Url,
    reduced_motion: bool,
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            reduced_motion: false,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().clone()
    }

    pub fn take_events(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                HostEvent::Navigate(navigation) => Some(navigation.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn unhandled(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                HostEvent::Unhandled(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        self.events.lock().push(event);
    }
}

impl Host for RecordingHost {
    fn location(&self) -> Url {
        self.location.clone()
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn focus(&self, node: NodeId) {
        self.push(HostEvent::Focus(node));
    }

    fn scroll_into_view(&self, node: NodeId, behavior: ScrollBehavior) {
        self.push(HostEvent::ScrollIntoView(node, behavior));
    }

    fn reset_scroll(&self, node: NodeId) {
        self.push(HostEvent::ResetScroll(node));
    }

    fn navigate(&self, navigation: Navigation) {
        self.push(HostEvent::Navigate(navigation));
    }

    fn report_unhandled(&self, error: &HomeSearchError) {
        self.push(HostEvent::Unhandled(error.to_string()));
    }
}
