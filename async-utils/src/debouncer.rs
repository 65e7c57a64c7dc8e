use std::pin::Pin;
use std::time::Duration;
use tokio::time::Instant;
use tokio::time::Sleep;
use tokio::time::sleep_until;

/// Trailing-edge debounce timer.
///
/// Every [`schedule`](Debouncer::schedule) restarts the quiet window and
/// replaces the pending value, so at most one firing is ever outstanding and
/// it always carries the most recent value.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    sleep: Pin<Box<Sleep>>,
    value: T,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, value: T) {
        let deadline = Instant::now() + self.delay;
        match self.pending.as_mut() {
            Some(pending) => {
                pending.sleep.as_mut().reset(deadline);
                pending.value = value;
            }
            None => {
                self.pending = Some(Pending {
                    sleep: Box::pin(sleep_until(deadline)),
                    value,
                });
            }
        }
    }

    /// Drops the pending firing, returning its value if one was armed.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.sleep.deadline())
    }

    /// Waits for the armed window to elapse and yields its value.
    ///
    /// Never resolves while disarmed. Cancel-safe: dropping the future before
    /// it resolves leaves the pending value in place.
    pub async fn fired(&mut self) -> T {
        match self.pending.as_mut() {
            Some(pending) => pending.sleep.as_mut().await,
            None => std::future::pending::<()>().await,
        }
        match self.pending.take() {
            Some(pending) => pending.value,
            None => std::future::pending().await,
        }
    }
}
