//! Overlay show/hide with a deferred `hidden` flag, and the document-level
//! click listener used for outside-click dismissal.

use crate::session::SearchSession;
use std::time::Duration;
use storefront_async_utils::Debouncer;
use storefront_dom::Document;
use storefront_dom::NodeId;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::debug;

pub const VISIBLE_CLASS: &str = "visible";

const CLICK_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct VisibilityController {
    overlay: NodeId,
    hide_timer: Debouncer<()>,
}

impl VisibilityController {
    pub fn new(overlay: NodeId, hide_delay: Duration) -> Self {
        Self {
            overlay,
            hide_timer: Debouncer::new(hide_delay),
        }
    }

    pub fn show(&mut self, session: &mut SearchSession, document: &mut Document) {
        session.open();
        document.add_class(self.overlay, VISIBLE_CLASS);
        document.set_hidden(self.overlay, false);
        self.hide_timer.cancel();
    }

    /// Drops the visible class now and arms the deferred `hidden` flag.
    pub fn hide(&mut self, session: &mut SearchSession, document: &mut Document) {
        session.close();
        document.remove_class(self.overlay, VISIBLE_CLASS);
        self.hide_timer.schedule(());
    }

    pub async fn hide_due(&mut self) {
        self.hide_timer.fired().await
    }

    /// Applies the deferred flag unless the overlay was reopened meanwhile.
    pub fn finish_hide(&self, session: &SearchSession, document: &mut Document) {
        if session.is_open() {
            debug!("overlay reopened before exit transition ended");
            return;
        }
        document.set_hidden(self.overlay, true);
    }

    pub fn is_hide_pending(&self) -> bool {
        self.hide_timer.is_armed()
    }

    pub fn cancel(&mut self) {
        self.hide_timer.cancel();
    }

    /// A click dismisses the overlay only when it is open and the target lies
    /// outside `component`.
    pub fn dismisses(
        session: &SearchSession,
        document: &Document,
        component: NodeId,
        click: DocumentClick,
    ) -> bool {
        session.is_open() && !document.contains(component, click.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentClick {
    pub target: NodeId,
}

/// Document-wide event bus the embedder publishes into.
#[derive(Debug, Clone)]
pub struct DocumentEvents {
    clicks: broadcast::Sender<DocumentClick>,
}

impl Default for DocumentEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentEvents {
    pub fn new() -> Self {
        let (clicks, _) = broadcast::channel(CLICK_CHANNEL_CAPACITY);
        Self { clicks }
    }

    /// Publishes a click; returns how many listeners received it.
    pub fn click(&self, target: NodeId) -> usize {
        self.clicks.send(DocumentClick { target }).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.clicks.receiver_count()
    }

    pub fn listen(&self) -> ClickListener {
        ClickListener {
            receiver: self.clicks.subscribe(),
        }
    }
}

/// One subscription to document clicks. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ClickListener {
    receiver: broadcast::Receiver<DocumentClick>,
}

impl ClickListener {
    /// Next click, or `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<DocumentClick> {
        loop {
            match self.receiver.recv().await {
                Ok(click) => return Some(click),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "document click listener lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published click without waiting.
    pub fn try_next(&mut self) -> Option<DocumentClick> {
        loop {
            match self.receiver.try_recv() {
                Ok(click) => return Some(click),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
