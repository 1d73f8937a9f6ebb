//! Process-wide health latch.
//!
//! Once tripped, the guard stays unhealthy and the shutdown request stands
//! until a fresh successful init handshake re-arms it. No automatic
//! recovery happens mid-run.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Reason the guard was tripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// Initialization handshake reported failure, or init-time order
    /// reconciliation failed.
    InitFailed {
        /// Human-readable detail.
        message: String,
    },
    /// Transport-level error pushed by the exchange.
    Transport {
        /// Error detail from the transport.
        message: String,
    },
    /// Book fetches failed `count` consecutive times.
    FeedFailure {
        /// Consecutive failure count at trip time.
        count: u32,
        /// Last error observed.
        message: String,
    },
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitFailed { message } => write!(f, "init failed: {message}"),
            Self::Transport { message } => write!(f, "transport error: {message}"),
            Self::FeedFailure { count, message } => {
                write!(f, "feed failure x{count}: {message}")
            }
        }
    }
}

/// Health flag with fail-stop semantics.
///
/// Thread-safe; share via `Arc<HaltGuard>`. Starts unhealthy: the init
/// handshake must succeed before the loop is allowed to act.
#[derive(Debug)]
pub struct HaltGuard {
    /// True only between a successful init handshake and a trip.
    healthy: AtomicBool,
    /// Latched trip flag; distinguishes "tripped" from "not yet initialized".
    tripped: AtomicBool,
    /// First trip reason; later trips are ignored.
    reason: RwLock<Option<HaltReason>>,
    /// Shutdown request channel (true = shut down).
    shutdown_tx: watch::Sender<bool>,
}

impl HaltGuard {
    /// Create a new guard plus a receiver for shutdown requests.
    #[must_use]
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let guard = Self {
            healthy: AtomicBool::new(false),
            tripped: AtomicBool::new(false),
            reason: RwLock::new(None),
            shutdown_tx,
        };
        (guard, shutdown_rx)
    }

    /// Whether the loop may act.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Whether the guard has been tripped since the last re-arm.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    /// First trip reason, if tripped.
    #[must_use]
    pub fn reason(&self) -> Option<HaltReason> {
        if self.is_tripped() {
            self.reason.read().clone()
        } else {
            None
        }
    }

    /// Trip the guard and request shutdown.
    ///
    /// Idempotent: only the first reason is kept.
    pub fn trip(&self, reason: HaltReason) {
        if self
            .tripped
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.healthy.store(false, Ordering::SeqCst);
            {
                let mut guard = self.reason.write();
                *guard = Some(reason.clone());
            }
            error!(reason = %reason, "HALT: guard tripped, requesting shutdown");
            let _ = self.shutdown_tx.send(true);
        } else {
            warn!(new_reason = %reason, "Guard already tripped, ignoring");
        }
    }

    /// Mark healthy after a successful init handshake.
    ///
    /// This is the only path that turns the flag back on; nothing re-arms
    /// the guard automatically.
    pub fn rearm(&self) {
        let previous = self.reason.write().take();
        self.tripped.store(false, Ordering::SeqCst);
        self.healthy.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(false);
        if let Some(reason) = previous {
            info!(previous_reason = %reason, "Guard re-armed by init handshake");
        } else {
            info!("Guard armed: init handshake complete");
        }
    }

    /// Subscribe to shutdown requests.
    #[must_use]
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }
}
