//! One-shot readiness barrier.
//!
//! The repricing loop must not act before the exchange init handshake has
//! completed, because the book fetch and the order-tracking channel come up
//! concurrently. The barrier replaces the fixed startup sleep such designs
//! tend to accrete: the loop waits on it once, and the init path satisfies
//! it.

use tokio::sync::watch;
use tracing::debug;

/// One-shot barrier backed by a watch channel.
///
/// Satisfying is idempotent; waiters observing a satisfied barrier return
/// immediately.
#[derive(Debug)]
pub struct ReadyBarrier {
    tx: watch::Sender<bool>,
}

impl ReadyBarrier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Whether the barrier has been satisfied.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Satisfy the barrier, releasing all waiters.
    pub fn satisfy(&self) {
        if !self.is_ready() {
            debug!("Readiness barrier satisfied");
        }
        let _ = self.tx.send(true);
    }

    /// Wait until the barrier is satisfied.
    ///
    /// Returns immediately if already satisfied.
    pub async fn wait_ready(&self) {
        if self.is_ready() {
            return;
        }

        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender lives in self, so this cannot happen in practice
                return;
            }
        }
    }

    /// Subscribe to readiness changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ReadyBarrier {
    fn default() -> Self {
        Self::new()
    }
}
