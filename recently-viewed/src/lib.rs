//! The visitor's recently viewed products.
//!
//! Ids are kept most-recent-first, without duplicates, and bounded to
//! [`MAX_PRODUCTS`] entries. The search widget only ever reads the list and
//! clears it; recording happens on product pages.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

use thiserror::Error;

pub const MAX_PRODUCTS: usize = 4;

#[derive(Debug, Error)]
pub enum RecentlyViewedError {
    #[error("recently viewed store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("recently viewed store is not valid json: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecentlyViewedError>;

pub trait RecentlyViewedStore: Send + Sync {
    /// Product ids, most recently viewed first.
    fn products(&self) -> Result<Vec<String>>;

    fn record(&self, product_id: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Moves `product_id` to the front of `ids`, dropping older duplicates and
/// anything past `limit`.
pub(crate) fn push_front(ids: &mut Vec<String>, product_id: &str, limit: usize) {
    ids.retain(|existing| existing != product_id);
    ids.insert(0, product_id.to_string());
    ids.truncate(limit);
}
