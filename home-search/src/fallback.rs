//! Empty-state fallback: the canonical empty section, with the visitor's
//! recently viewed products spliced in front of its product collection.

use crate::error::HomeSearchError;
use crate::error::Result;
use crate::fetch::Resolved;
use crate::refs::RECENTLY_VIEWED_WRAPPER;
use std::sync::Arc;
use storefront_dom::Document;
use storefront_dom::Selector;
use storefront_section_renderer::SectionRenderer;
use tracing::debug;
use tracing::warn;
use url::Url;

pub const EMPTY_SECTION_CLASS: &str = "predictive-search-empty-section";
pub const PRODUCTS_CONTAINER_ID: &str = "predictive-search-products";

/// How the recently viewed part of the empty state is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecentlyViewedSource {
    /// The visitor has not viewed any products.
    None,
    /// Products exist but the component has no section to render them with;
    /// the whole empty state is abandoned.
    Unrenderable,
    Fetch { section_id: String, url: Url },
}

#[derive(Debug, Clone)]
pub struct EmptyStateRequest {
    pub empty_section_id: String,
    pub empty_url: Url,
    pub recently_viewed: RecentlyViewedSource,
    /// Whether a successful merge should open the overlay.
    pub reveal: bool,
}

/// Fetches the empty state and, when needed, the recently viewed products,
/// in that order.
pub async fn load_empty_state(
    renderer: Arc<dyn SectionRenderer>,
    request: EmptyStateRequest,
) -> Result<Resolved> {
    let empty_markup = renderer
        .section_html(&request.empty_section_id, false, &request.empty_url)
        .await?;
    let empty = Document::parse(&empty_markup)?;

    let recently_viewed = match &request.recently_viewed {
        RecentlyViewedSource::None => None,
        RecentlyViewedSource::Unrenderable => {
            // Still enforce the empty-section contract before giving up.
            section_root(&empty)?;
            debug!("recently viewed products present but no section id; skipping empty state");
            return Ok(Resolved::EmptyState {
                fragment: None,
                reveal: false,
            });
        }
        RecentlyViewedSource::Fetch { section_id, url } => {
            let markup = renderer.section_html(section_id, false, url).await?;
            Some(Document::parse(&markup)?)
        }
    };

    let fragment = merge_recently_viewed(&empty, recently_viewed.as_ref())?;
    Ok(Resolved::EmptyState {
        fragment,
        reveal: request.reveal,
    })
}

/// Search query selecting exactly `product_ids`.
pub fn recently_viewed_query(product_ids: &[String]) -> String {
    product_ids
        .iter()
        .map(|id| format!("id:{id}"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Extracts the empty section from `empty` and prepends the product entries
/// of `recently_viewed` into its products container, each tagged
/// `ref="recentlyViewedWrapper"`.
///
/// Returns `Ok(None)` when either side lacks the products container.
pub fn merge_recently_viewed(
    empty: &Document,
    recently_viewed: Option<&Document>,
) -> Result<Option<Document>> {
    let section = section_root(empty)?;
    let mut merged = empty.extract(section);

    let Some(recently_viewed) = recently_viewed else {
        return Ok(Some(merged));
    };

    let products = Selector::id(PRODUCTS_CONTAINER_ID);
    let Some(source) = recently_viewed.query(recently_viewed.root(), &products) else {
        warn!("recently viewed markup has no #{PRODUCTS_CONTAINER_ID}");
        return Ok(None);
    };
    let Some(collection) = merged.query(merged.root(), &products) else {
        warn!("empty state markup has no #{PRODUCTS_CONTAINER_ID}");
        return Ok(None);
    };

    let mut entries = Vec::new();
    for child in recently_viewed.element_children(source) {
        if let Some(imported) = merged.import(recently_viewed, child) {
            merged.set_attr(imported, "ref", RECENTLY_VIEWED_WRAPPER);
            entries.push(imported);
        }
    }
    merged.prepend_children(collection, &entries);
    Ok(Some(merged))
}

fn section_root(empty: &Document) -> Result<storefront_dom::NodeId> {
    empty
        .query(empty.root(), &Selector::class(EMPTY_SECTION_CLASS))
        .ok_or_else(|| {
            HomeSearchError::ContractViolation(format!(
                "no .{EMPTY_SECTION_CLASS} in empty state markup"
            ))
        })
}
