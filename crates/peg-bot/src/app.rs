//! Main application orchestration.
//!
//! Owns the repricing engine and drives it from a single task: a periodic
//! timer produces repricing ticks and the exchange push channel produces
//! lifecycle events. Running both through one `select` loop keeps the
//! quote state single-writer; the cancel/replace sequence can never race a
//! fill update.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use peg_exchange::{DynExchangeClient, ExchangeClient, ExchangeError, ExchangeEvent};
use peg_health::{HaltGuard, HaltReason, ReadyBarrier};
use peg_strategy::RepricingEngine;

/// Main application.
pub struct Application {
    engine: RepricingEngine,
    client: DynExchangeClient,
    events: mpsc::Receiver<ExchangeEvent>,
    guard: Arc<HaltGuard>,
    barrier: Arc<ReadyBarrier>,
    shutdown: watch::Receiver<bool>,
}

impl Application {
    /// Wire the application around an exchange client and its push channel.
    pub fn new(
        config: AppConfig,
        client: DynExchangeClient,
        events: mpsc::Receiver<ExchangeEvent>,
    ) -> AppResult<Self> {
        let (guard, shutdown) = HaltGuard::new();
        let guard = Arc::new(guard);
        let barrier = Arc::new(ReadyBarrier::new());

        let engine = RepricingEngine::new(
            config.strategy.clone(),
            client.clone(),
            guard.clone(),
            barrier.clone(),
        )?;

        Ok(Self {
            engine,
            client,
            events,
            guard,
            barrier,
            shutdown,
        })
    }

    /// The process health latch (diagnostics and tests).
    #[must_use]
    pub fn halt_guard(&self) -> Arc<HaltGuard> {
        self.guard.clone()
    }

    /// Run until the guard requests shutdown.
    ///
    /// On shutdown no further orders are placed or cancelled; a resting
    /// order is deliberately left in the book for manual intervention.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            symbol = %self.engine.config().symbol,
            interval_ms = self.engine.config().poll_interval_ms,
            "Entering main loop"
        );

        let mut ticker = tokio::time::interval(self.engine.poll_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.engine.on_tick().await;
                    debug!(outcome = outcome.as_str(), "Tick complete");
                }
                Some(event) = self.events.recv() => {
                    self.handle_event(event).await;
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        warn!(
            reason = ?self.guard.reason(),
            resting_order = ?self.engine.quote().order_id(),
            "Shutting down; resting order (if any) left for manual intervention"
        );
        Ok(())
    }

    async fn handle_event(&mut self, event: ExchangeEvent) {
        match event {
            ExchangeEvent::Order(update) => {
                debug!(order_id = %update.order_id, status = %update.status, "Order update");
                self.engine.on_order_update(&update);
            }
            ExchangeEvent::Init { success } => {
                self.on_init(success).await;
            }
            ExchangeEvent::TransportError(message) => {
                self.guard.trip(HaltReason::Transport { message });
            }
        }
    }

    /// Complete the init handshake.
    ///
    /// A previous run may have left orders resting; they are cancelled
    /// before trading starts so the loop begins from a clean slate. A
    /// failed init-time cancel halts rather than assuming success.
    async fn on_init(&mut self, success: bool) {
        if !success {
            self.guard.trip(HaltReason::InitFailed {
                message: "handshake reported failure".to_string(),
            });
            return;
        }

        match self.cancel_open_orders().await {
            Ok(cancelled) => {
                info!(cancelled, "Init-time order reconciliation complete");
                self.guard.rearm();
                self.barrier.satisfy();
            }
            Err(e) => {
                self.guard.trip(HaltReason::InitFailed {
                    message: format!("init-time cancel failed: {e}"),
                });
            }
        }
    }

    async fn cancel_open_orders(&self) -> Result<usize, ExchangeError> {
        let symbol = &self.engine.config().symbol;
        let open = self.client.open_orders(symbol).await?;
        let count = open.len();
        for order_id in open {
            info!(order_id = %order_id, "Cancelling order left from previous run");
            self.client.cancel_order(order_id).await?;
        }
        Ok(count)
    }
}
