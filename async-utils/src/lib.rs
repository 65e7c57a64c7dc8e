//! Small async building blocks shared by the storefront crates.
//!
//! - [`OrCancelExt`] races any future against a [`CancellationToken`].
//! - [`Debouncer`] coalesces bursts of triggers into one delayed firing.

use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

mod debouncer;

pub use debouncer::Debouncer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelErr {
    Cancelled,
}

#[async_trait]
pub trait OrCancelExt: Sized {
    type Output;

    /// Resolves to `Err(CancelErr::Cancelled)` as soon as `token` is cancelled,
    /// dropping the wrapped future without polling it further.
    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr>;
}

#[async_trait]
impl<F> OrCancelExt for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CancelErr::Cancelled),
            res = self => Ok(res),
        }
    }
}
