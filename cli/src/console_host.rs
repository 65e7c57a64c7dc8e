use parking_lot::Mutex;
use serde::Serialize;
use storefront_dom::NodeId;
use storefront_home_search::HomeSearchError;
use storefront_home_search::Host;
use storefront_home_search::Navigation;
use storefront_home_search::ScrollBehavior;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationRecord {
    pub kind: &'static str,
    pub url: String,
}

impl From<&Navigation> for NavigationRecord {
    fn from(navigation: &Navigation) -> Self {
        Self {
            kind: navigation.kind(),
            url: navigation.url().to_string(),
        }
    }
}

/// Host for a headless run: navigations are collected (and optionally echoed
/// to stdout), unhandled errors are kept for the exit status.
#[derive(Debug)]
pub struct ConsoleHost {
    location: Url,
    reduced_motion: bool,
    echo: bool,
    navigations: Mutex<Vec<NavigationRecord>>,
    errors: Mutex<Vec<String>>,
}

impl ConsoleHost {
    pub fn new(location: Url, reduced_motion: bool, echo: bool) -> Self {
        Self {
            location,
            reduced_motion,
            echo,
            navigations: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn navigations(&self) -> Vec<NavigationRecord> {
        self.navigations.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Host for ConsoleHost {
    fn location(&self) -> Url {
        self.location.clone()
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn focus(&self, node: NodeId) {
        debug!(?node, "focus");
    }

    fn scroll_into_view(&self, node: NodeId, behavior: ScrollBehavior) {
        debug!(?node, ?behavior, "scroll into view");
    }

    fn reset_scroll(&self, node: NodeId) {
        debug!(?node, "reset scroll");
    }

    fn navigate(&self, navigation: Navigation) {
        let record = NavigationRecord::from(&navigation);
        if self.echo {
            println!("navigate {} {}", record.kind, record.url);
        }
        self.navigations.lock().push(record);
    }

    fn report_unhandled(&self, error: &HomeSearchError) {
        self.errors.lock().push(error.to_string());
    }
}
