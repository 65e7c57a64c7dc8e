//! Named element references inside the component, addressed the way the
//! theme markup marks them: `ref="name"` for singletons and `ref="name[]"`
//! for lists.

use crate::error::HomeSearchError;
use crate::error::Result;
use storefront_dom::Document;
use storefront_dom::NodeId;
use storefront_dom::Selector;

pub const SEARCH_INPUT: &str = "searchInput";
pub const PREDICTIVE_SEARCH_RESULTS: &str = "predictiveSearchResults";
pub const RESET_BUTTON: &str = "resetButton";
pub const RESULTS_ITEMS: &str = "resultsItems[]";
pub const RECENTLY_VIEWED_WRAPPER: &str = "recentlyViewedWrapper";
pub const RECENTLY_VIEWED_TITLE: &str = "recentlyViewedTitle[]";
pub const RECENTLY_VIEWED_ITEMS: &str = "recentlyViewedItems[]";

pub fn by_ref(name: &str) -> Selector {
    Selector::attr_eq("ref", name)
}

/// The refs the component refuses to mount without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRefs {
    pub component: NodeId,
    pub search_input: NodeId,
    pub results: NodeId,
    pub reset_button: NodeId,
}

impl ComponentRefs {
    pub fn resolve(document: &Document, component: NodeId) -> Result<Self> {
        let find = |name: &'static str| {
            document
                .query(component, &by_ref(name))
                .ok_or(HomeSearchError::MissingRef(name))
        };
        Ok(Self {
            component,
            search_input: find(SEARCH_INPUT)?,
            results: find(PREDICTIVE_SEARCH_RESULTS)?,
            reset_button: find(RESET_BUTTON)?,
        })
    }

    /// Optional list refs, resolved fresh on every call.
    pub fn all(&self, document: &Document, name: &str) -> Vec<NodeId> {
        document.query_all(self.component, &by_ref(name))
    }
}
