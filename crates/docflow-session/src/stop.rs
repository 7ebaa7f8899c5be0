use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;
use tracing::debug;

/// Cooperative cancellation for a running turn.
///
/// Clones share one flag. Once [`stop`](Self::stop) is called the turn ends
/// at its next await point; text already applied to the document stays.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopToken {
    /// A token that has not been stopped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the turn end. Idempotent.
    pub fn stop(&self) {
        if !self.inner.stopped.swap(true, Ordering::AcqRel) {
            debug!("stop requested");
        }
        self.inner.notify.notify_waiters();
    }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Resolves once the token is stopped.
    pub async fn stopped(&self) {
        loop {
            let mut notified = std::pin::pin!(self.inner.notify.notified());
            // Register before checking the flag so a concurrent stop cannot
            // slip in between.
            notified.as_mut().enable();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}
