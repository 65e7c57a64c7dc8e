//! Request issuance with last-request-wins cancellation.
//!
//! Every request gets a fresh child of the component lifetime token; issuing
//! one cancels the previous live token before the new request starts. The
//! spawned task races the render call against its token, and the widget
//! re-checks the token when the completion is delivered, right before it
//! touches the tree.

use crate::config::StorefrontRoutes;
use crate::error::HomeSearchError;
use crate::error::Result;
use crate::fallback::recently_viewed_query;
use crate::session::SearchSession;
use std::future::Future;
use storefront_async_utils::CancelErr;
use storefront_async_utils::OrCancelExt;
use storefront_dom::Document;
use tokio::task::JoinError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Results,
    EmptyState,
}

/// Successful payload of a request.
#[derive(Debug)]
pub enum Resolved {
    /// Raw predictive search markup.
    Results(String),
    /// Empty-state tree, merged with recently viewed products when present.
    /// `None` when the merge was abandoned.
    EmptyState { fragment: Option<Document>, reveal: bool },
}

#[derive(Debug)]
pub struct Completion {
    pub token: CancellationToken,
    pub kind: RequestKind,
    pub outcome: Result<Resolved>,
}

#[derive(Debug)]
pub struct FetchCoordinator {
    lifetime: CancellationToken,
    tasks: JoinSet<std::result::Result<Completion, CancelErr>>,
}

impl FetchCoordinator {
    pub fn new(lifetime: CancellationToken) -> Self {
        Self {
            lifetime,
            tasks: JoinSet::new(),
        }
    }

    /// Cancels the live request, if any, and installs a fresh token.
    pub fn issue(&mut self, session: &mut SearchSession) -> CancellationToken {
        let token = self.lifetime.child_token();
        session.replace_active_request(token.clone());
        token
    }

    /// Runs `request` until it finishes or `token` is cancelled.
    pub fn spawn<F>(&mut self, token: CancellationToken, kind: RequestKind, request: F)
    where
        F: Future<Output = Result<Resolved>> + Send + 'static,
    {
        self.tasks.spawn(async move {
            match request.or_cancel(&token).await {
                Ok(outcome) => Ok(Completion {
                    token,
                    kind,
                    outcome,
                }),
                Err(CancelErr::Cancelled) => {
                    debug!(?kind, "request cancelled before completion");
                    Err(CancelErr::Cancelled)
                }
            }
        });
    }

    /// Next finished task. Resolves to `None` immediately when idle.
    pub async fn next_finished(
        &mut self,
    ) -> Option<std::result::Result<std::result::Result<Completion, CancelErr>, JoinError>> {
        self.tasks.join_next().await
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn abort_all(&mut self) {
        self.tasks.abort_all();
    }
}

/// `GET {origin}{predictive_search_url}?q=<term>&resources[limit_scope]=each`
pub fn results_url(location: &Url, routes: &StorefrontRoutes, term: &str) -> Result<Url> {
    let mut url = location.join(&routes.predictive_search_url)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("q", term)
        .append_pair("resources[limit_scope]", "each");
    Ok(url)
}

/// `GET {origin}{search_url}?q=id:A OR id:B&resources[type]=product`
pub fn recently_viewed_url(
    location: &Url,
    routes: &StorefrontRoutes,
    product_ids: &[String],
) -> Result<Url> {
    let mut url = location.join(&routes.search_url)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("q", &recently_viewed_query(product_ids))
        .append_pair("resources[type]", "product");
    Ok(url)
}

/// The current page with its `page` parameter removed.
pub fn empty_state_url(location: &Url) -> Url {
    let retained: Vec<(String, String)> = location
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = location.clone();
    if retained.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(retained);
    }
    url
}

/// Full search results page for `term`.
pub fn search_page_url(location: &Url, routes: &StorefrontRoutes, term: &str) -> Result<Url> {
    let mut url = location.join(&routes.search_url)?;
    url.query_pairs_mut().clear().append_pair("q", term);
    Ok(url)
}

/// Resolves an item link against the page.
pub fn resolve_link(location: &Url, href: &str) -> Result<Url> {
    location.join(href).map_err(HomeSearchError::from)
}
