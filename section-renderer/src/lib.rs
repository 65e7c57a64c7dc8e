//! Section rendering: the collaborator that turns a storefront URL into the
//! server-rendered markup of one theme section.
//!
//! [`SectionRenderer`] is the seam the search widget talks to;
//! [`HttpSectionRenderer`] is the production implementation speaking the
//! storefront's section rendering protocol (`?section_id=<id>`).

mod error;
mod http;

pub use error::RenderError;
pub use error::Result;
pub use http::DEFAULT_CACHE_CAPACITY;
pub use http::DEFAULT_TIMEOUT;
pub use http::HttpSectionRenderer;
pub use http::section_request_url;
pub use reqwest::StatusCode;

use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait SectionRenderer: Send + Sync {
    /// Fetches the markup of `section_id` rendered in the context of `url`.
    ///
    /// When `cacheable` is false the response must come from the network.
    async fn section_html(&self, section_id: &str, cacheable: bool, url: &Url) -> Result<String>;
}
