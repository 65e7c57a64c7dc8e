use crate::Result;
use crate::SectionRenderer;
use crate::error::RenderError;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

const SECTION_ID_PARAM: &str = "section_id";

/// Appends the `section_id` parameter the storefront uses to render a single
/// section instead of the whole page.
pub fn section_request_url(url: &Url, section_id: &str) -> Url {
    let mut request = url.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SECTION_ID_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = request.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(SECTION_ID_PARAM, section_id);
    }
    request
}

pub struct HttpSectionRenderer {
    http: reqwest::Client,
    cache: Mutex<LruCache<String, String>>,
}

impl HttpSectionRenderer {
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_TIMEOUT, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_options(timeout: Duration, cache_capacity: usize) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            http,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    async fn fetch(&self, request: &Url) -> Result<String> {
        let resp = self.http.get(request.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(RenderError::Status {
                status: resp.status(),
                url: request.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl SectionRenderer for HttpSectionRenderer {
    async fn section_html(&self, section_id: &str, cacheable: bool, url: &Url) -> Result<String> {
        let request = section_request_url(url, section_id);
        let key = request.to_string();
        if cacheable && let Some(hit) = self.cache.lock().get(&key).cloned() {
            debug!(url = %key, "section cache hit");
            return Ok(hit);
        }

        debug!(url = %key, cacheable, "fetching section");
        let markup = self.fetch(&request).await?;
        if cacheable {
            self.cache.lock().put(key, markup.clone());
        }
        Ok(markup)
    }
}
