//! Periodic repricing engine.
//!
//! One tick: check health, fetch the book, derive the band, then keep the
//! resting quote or cancel-and-replace it at the band target. The engine
//! owns [`QuoteState`]; the application drives ticks and push updates from
//! a single task, so every mutation is serialized.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use peg_core::{OrderBook, OrderId, OrderSide, Price, Size};
use peg_exchange::{DynExchangeClient, ExchangeClient, ExchangeError, OrderUpdate};
use peg_health::{HaltGuard, HaltReason, ReadyBarrier};
use peg_telemetry::Metrics;

use crate::band::compute_band;
use crate::config::StrategyConfig;
use crate::error::{StrategyError, StrategyResult};
use crate::quote::QuoteState;
use crate::reconciler;

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Init handshake not yet complete; no action taken.
    AwaitingInit,
    /// Guard unhealthy; no action taken.
    Idle,
    /// Book fetch or band computation failed; no action taken.
    FetchFailed,
    /// Resting price inside the band; nothing to do.
    Steady,
    /// Placed a quote with no prior order to cancel.
    Placed,
    /// Cancelled the stale quote and placed a fresh one.
    Requoted,
    /// A cancel or create call failed; retried next tick.
    ActionFailed,
}

impl TickOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingInit => "awaiting_init",
            Self::Idle => "idle",
            Self::FetchFailed => "fetch_failed",
            Self::Steady => "steady",
            Self::Placed => "placed",
            Self::Requoted => "requoted",
            Self::ActionFailed => "action_failed",
        }
    }
}

/// The repricing loop body plus the state it guards.
pub struct RepricingEngine {
    config: StrategyConfig,
    client: DynExchangeClient,
    guard: Arc<HaltGuard>,
    barrier: Arc<ReadyBarrier>,
    quote: QuoteState,
    fetch_failures: u32,
}

impl RepricingEngine {
    /// Build an engine after validating the configuration.
    pub fn new(
        config: StrategyConfig,
        client: DynExchangeClient,
        guard: Arc<HaltGuard>,
        barrier: Arc<ReadyBarrier>,
    ) -> StrategyResult<Self> {
        config.validate()?;
        let quote = QuoteState::new(Size::new(config.quantity));
        Ok(Self {
            config,
            client,
            guard,
            barrier,
            quote,
            fetch_failures: 0,
        })
    }

    /// Current quote state (read-only).
    #[must_use]
    pub fn quote(&self) -> &QuoteState {
        &self.quote
    }

    #[must_use]
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Tick period for the driving timer.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    /// Fold one pushed order update into the quote state.
    pub fn on_order_update(&mut self, update: &OrderUpdate) {
        reconciler::apply(&mut self.quote, update);
    }

    /// Run one repricing tick.
    pub async fn on_tick(&mut self) -> TickOutcome {
        let outcome = self.tick_inner().await;
        Metrics::tick(outcome.as_str());
        Metrics::set_healthy(self.guard.is_healthy());
        outcome
    }

    async fn tick_inner(&mut self) -> TickOutcome {
        // The order-tracking channel and the book feed come up concurrently;
        // acting before the handshake could place an order nothing watches.
        if !self.barrier.is_ready() {
            debug!("Init handshake pending, holding first tick");
            return TickOutcome::AwaitingInit;
        }

        if !self.guard.is_healthy() {
            warn!(reason = ?self.guard.reason(), "Guard unhealthy, idle tick");
            return TickOutcome::Idle;
        }

        let book = match self.fetch_book().await {
            Ok(book) => book,
            Err(e) => {
                self.record_feed_failure(&e);
                return TickOutcome::FetchFailed;
            }
        };

        let band = match compute_band(&book, &self.config) {
            Ok(band) => band,
            Err(e) => {
                // A malformed snapshot is as useless as no snapshot
                self.record_feed_failure(&e);
                return TickOutcome::FetchFailed;
            }
        };
        self.fetch_failures = 0;
        self.quote.reset_failed();

        if self.quote.has_live_order() {
            if let Some(price) = self.quote.price() {
                if band.contains(price) {
                    debug!(
                        resting = %price,
                        low = %band.low,
                        high = %band.high,
                        "Resting price inside band, keeping quote"
                    );
                    return TickOutcome::Steady;
                }
            }
        }

        let had_order = self.quote.has_live_order();
        if had_order {
            if let Err(e) = self.cancel_resting().await {
                warn!(error = %e, "Cancel failed, holding create until resolved");
                Metrics::order_failed("cancel");
                return TickOutcome::ActionFailed;
            }
        }

        match self.place_quote(band.target).await {
            Ok(order_id) => {
                info!(
                    order_id = %order_id,
                    price = %band.target,
                    low = %band.low,
                    high = %band.high,
                    "Quote placed"
                );
                Metrics::order_created();
                if had_order {
                    TickOutcome::Requoted
                } else {
                    TickOutcome::Placed
                }
            }
            Err(e) => {
                warn!(error = %e, "Create failed, retrying next tick");
                Metrics::order_failed("create");
                TickOutcome::ActionFailed
            }
        }
    }

    /// Fetch the book, bounded by the per-call timeout.
    async fn fetch_book(&self) -> StrategyResult<OrderBook> {
        let client = Arc::clone(&self.client);
        match timeout(
            self.call_timeout(),
            client.fetch_order_book(&self.config.symbol, self.config.book_depth),
        )
        .await
        {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ExchangeError::Timeout(self.config.call_timeout_ms).into()),
        }
    }

    /// Cancel the tracked order before re-quoting.
    ///
    /// `UnknownOrder` means the venue no longer has it (a fill beat us);
    /// that clears the slot. Every other failure keeps the order tracked so
    /// no second order can go live beside it.
    async fn cancel_resting(&mut self) -> StrategyResult<()> {
        let order_id = self.quote.begin_cancel()?;
        let client = Arc::clone(&self.client);
        let result = match timeout(self.call_timeout(), client.cancel_order(order_id.clone()))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout(self.config.call_timeout_ms)),
        };

        match result {
            Ok(()) => {
                debug!(order_id = %order_id, "Order cancelled");
                Metrics::order_canceled();
                self.quote.confirm_cancel()?;
                Ok(())
            }
            Err(ExchangeError::UnknownOrder(_)) => {
                debug!(order_id = %order_id, "Cancel target already gone");
                self.quote.confirm_cancel()?;
                Ok(())
            }
            Err(e) => {
                self.quote.fail_cancel();
                Err(e.into())
            }
        }
    }

    /// Submit the buy quote at the band target.
    async fn place_quote(&mut self, price: Price) -> StrategyResult<OrderId> {
        self.quote.begin_create()?;
        let quantity = self.quote.quantity();
        let client = Arc::clone(&self.client);
        let result = match timeout(
            self.call_timeout(),
            client.create_order(OrderSide::Buy, price, quantity),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout(self.config.call_timeout_ms)),
        };

        match result {
            Ok(order_id) => {
                self.quote.confirm_create(order_id.clone(), price)?;
                Ok(order_id)
            }
            Err(e) => {
                self.quote.fail_create();
                Err(e.into())
            }
        }
    }

    fn record_feed_failure(&mut self, error: &StrategyError) {
        self.fetch_failures += 1;
        warn!(
            error = %error,
            failures = self.fetch_failures,
            limit = self.config.max_fetch_failures,
            "Book fetch failed"
        );
        if self.fetch_failures >= self.config.max_fetch_failures {
            self.guard.trip(HaltReason::FeedFailure {
                count: self.fetch_failures,
                message: error.to_string(),
            });
        }
    }

    fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.config.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::QuoteStatus;
    use peg_core::BookLevel;
    use peg_exchange::{ExchangeResult, MockCall, MockExchange, OrderUpdate};
    use peg_core::OrderStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Bids with level 6 = 100.00 + shift and level 8 = 99.96 + shift,
    /// so the band target is 99.98 + shift.
    fn book(shift: Decimal) -> OrderBook {
        let prices = [
            dec!(100.05),
            dec!(100.04),
            dec!(100.03),
            dec!(100.02),
            dec!(100.01),
            dec!(100.00),
            dec!(99.98),
            dec!(99.96),
            dec!(99.95),
            dec!(99.94),
        ];
        let bids = prices
            .iter()
            .map(|p| BookLevel::new(Price::new(*p + shift), Size::new(dec!(1))))
            .collect();
        OrderBook::new(bids, vec![]).unwrap()
    }

    fn shallow_book(levels: usize) -> OrderBook {
        let bids = (0..levels)
            .map(|i| {
                BookLevel::new(
                    Price::new(dec!(100) - Decimal::new(i as i64, 2)),
                    Size::new(dec!(1)),
                )
            })
            .collect();
        OrderBook::new(bids, vec![]).unwrap()
    }

    struct Harness {
        engine: RepricingEngine,
        mock: Arc<MockExchange>,
        guard: Arc<HaltGuard>,
        barrier: Arc<ReadyBarrier>,
    }

    fn harness_with(config: StrategyConfig) -> Harness {
        let mock = Arc::new(MockExchange::new());
        let (guard, _shutdown_rx) = HaltGuard::new();
        let guard = Arc::new(guard);
        let barrier = Arc::new(ReadyBarrier::new());
        let engine = RepricingEngine::new(
            config,
            mock.clone() as DynExchangeClient,
            guard.clone(),
            barrier.clone(),
        )
        .unwrap();
        Harness {
            engine,
            mock,
            guard,
            barrier,
        }
    }

    /// Ready-to-trade harness: handshake done, guard armed.
    fn harness() -> Harness {
        let h = harness_with(StrategyConfig::default());
        h.barrier.satisfy();
        h.guard.rearm();
        h
    }

    fn push_book(mock: &MockExchange, result: ExchangeResult<OrderBook>) {
        mock.push_book(result);
    }

    #[tokio::test]
    async fn test_first_tick_places_at_target() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));

        let outcome = h.engine.on_tick().await;

        assert_eq!(outcome, TickOutcome::Placed);
        assert_eq!(h.engine.quote().status(), QuoteStatus::Resting);
        assert_eq!(h.engine.quote().price().unwrap().inner(), dec!(99.98));

        let calls = h.mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            MockCall::FetchBook {
                symbol: "BNBUSDT".to_string(),
                depth: 10
            }
        );
        assert_eq!(
            calls[1],
            MockCall::Create {
                side: OrderSide::Buy,
                price: Price::new(dec!(99.98)),
                quantity: Size::new(dec!(0.1)),
            }
        );
    }

    #[tokio::test]
    async fn test_steady_state_is_idempotent() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await;
        h.mock.clear_calls();

        // Same book, repeatedly: zero order actions
        for _ in 0..3 {
            push_book(&h.mock, Ok(book(dec!(0))));
            assert_eq!(h.engine.on_tick().await, TickOutcome::Steady);
        }

        assert!(h.mock.creates().is_empty());
        assert!(h.mock.cancels().is_empty());
    }

    #[tokio::test]
    async fn test_resting_inside_band_after_drift() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await; // resting at 99.98
        h.mock.clear_calls();

        // Small drift: 99.98 still within [99.97, 100.01]
        push_book(&h.mock, Ok(book(dec!(0.01))));
        assert_eq!(h.engine.on_tick().await, TickOutcome::Steady);
        assert!(h.mock.creates().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_band_cancels_then_creates() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await;
        let old_id = h.engine.quote().order_id().unwrap().clone();
        h.mock.clear_calls();

        // Shift up 0.10: band [100.06, 100.10] no longer contains 99.98
        push_book(&h.mock, Ok(book(dec!(0.10))));
        let outcome = h.engine.on_tick().await;

        assert_eq!(outcome, TickOutcome::Requoted);
        assert_eq!(h.engine.quote().price().unwrap().inner(), dec!(100.08));
        assert_ne!(h.engine.quote().order_id().unwrap(), &old_id);

        // Strict ordering: fetch, cancel old, create new
        let calls = h.mock.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], MockCall::FetchBook { .. }));
        assert_eq!(calls[1], MockCall::Cancel { order_id: old_id });
        assert!(matches!(calls[2], MockCall::Create { .. }));
    }

    #[tokio::test]
    async fn test_fetch_error_trips_guard_and_idles() {
        let mut h = harness();
        // No scripted book: mock returns a transport error
        let outcome = h.engine.on_tick().await;

        assert_eq!(outcome, TickOutcome::FetchFailed);
        assert!(!h.guard.is_healthy());
        assert!(matches!(
            h.guard.reason(),
            Some(HaltReason::FeedFailure { count: 1, .. })
        ));

        // Subsequent ticks perform no exchange action at all
        h.mock.clear_calls();
        assert_eq!(h.engine.on_tick().await, TickOutcome::Idle);
        assert!(h.mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_depth_counts_as_fetch_failure() {
        let mut h = harness();
        push_book(&h.mock, Ok(shallow_book(5)));

        assert_eq!(h.engine.on_tick().await, TickOutcome::FetchFailed);
        assert!(!h.guard.is_healthy());
    }

    #[tokio::test]
    async fn test_relaxed_failure_limit() {
        let mut h = harness_with(StrategyConfig {
            max_fetch_failures: 3,
            ..StrategyConfig::default()
        });
        h.barrier.satisfy();
        h.guard.rearm();

        // Two failures tolerated
        h.engine.on_tick().await;
        h.engine.on_tick().await;
        assert!(h.guard.is_healthy());

        // A good tick in between resets the count
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await;
        h.engine.on_tick().await;
        h.engine.on_tick().await;
        assert!(h.guard.is_healthy());

        // Third consecutive failure trips
        h.engine.on_tick().await;
        assert!(!h.guard.is_healthy());
    }

    #[tokio::test]
    async fn test_failed_cancel_blocks_create() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await;
        let old_id = h.engine.quote().order_id().unwrap().clone();
        h.mock.clear_calls();

        push_book(&h.mock, Ok(book(dec!(0.10))));
        h.mock
            .push_cancel(Err(ExchangeError::Transport("cancel lost".into())));

        let outcome = h.engine.on_tick().await;

        assert_eq!(outcome, TickOutcome::ActionFailed);
        // No create went out and the old order stays tracked
        assert!(h.mock.creates().is_empty());
        assert_eq!(h.engine.quote().status(), QuoteStatus::Resting);
        assert!(h.engine.quote().is_tracking(&old_id));

        // Next tick the cancel succeeds and the requote completes
        h.mock.clear_calls();
        push_book(&h.mock, Ok(book(dec!(0.10))));
        assert_eq!(h.engine.on_tick().await, TickOutcome::Requoted);
        assert_eq!(h.engine.quote().price().unwrap().inner(), dec!(100.08));
    }

    #[tokio::test]
    async fn test_cancel_of_vanished_order_proceeds() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await;
        h.mock.clear_calls();

        // The venue no longer knows the order (a fill beat the cancel)
        push_book(&h.mock, Ok(book(dec!(0.10))));
        h.mock
            .push_cancel(Err(ExchangeError::UnknownOrder("gone".into())));

        assert_eq!(h.engine.on_tick().await, TickOutcome::Requoted);
        assert_eq!(h.engine.quote().status(), QuoteStatus::Resting);
        assert_eq!(h.mock.creates().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_create_retries_next_tick() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.mock
            .push_create(Err(ExchangeError::Rejected("balance".into())));

        assert_eq!(h.engine.on_tick().await, TickOutcome::ActionFailed);
        assert!(!h.engine.quote().has_live_order());
        // Create failures never trip the guard
        assert!(h.guard.is_healthy());

        push_book(&h.mock, Ok(book(dec!(0))));
        assert_eq!(h.engine.on_tick().await, TickOutcome::Placed);
        assert_eq!(h.engine.quote().status(), QuoteStatus::Resting);
    }

    #[tokio::test]
    async fn test_fill_update_frees_slot_for_next_tick() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await;
        let id = h.engine.quote().order_id().unwrap().clone();
        h.mock.clear_calls();

        h.engine
            .on_order_update(&OrderUpdate::new(id, OrderStatus::Filled));
        assert_eq!(h.engine.quote().status(), QuoteStatus::Absent);

        // Fresh placement, no cancel: there is nothing to cancel
        push_book(&h.mock, Ok(book(dec!(0))));
        assert_eq!(h.engine.on_tick().await, TickOutcome::Placed);
        assert!(h.mock.cancels().is_empty());
        assert_eq!(h.mock.creates().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_update_does_not_disturb_quote() {
        let mut h = harness();
        push_book(&h.mock, Ok(book(dec!(0))));
        h.engine.on_tick().await;
        h.mock.clear_calls();

        h.engine.on_order_update(&OrderUpdate::new(
            OrderId::from("superseded"),
            OrderStatus::Filled,
        ));
        assert_eq!(h.engine.quote().status(), QuoteStatus::Resting);

        push_book(&h.mock, Ok(book(dec!(0))));
        assert_eq!(h.engine.on_tick().await, TickOutcome::Steady);
    }

    #[tokio::test]
    async fn test_holds_until_init_handshake() {
        let h = harness_with(StrategyConfig::default());
        let mut engine = h.engine;
        h.guard.rearm();
        // Barrier not satisfied: no exchange traffic at all
        assert_eq!(engine.on_tick().await, TickOutcome::AwaitingInit);
        assert!(h.mock.calls().is_empty());

        h.barrier.satisfy();
        push_book(&h.mock, Ok(book(dec!(0))));
        assert_eq!(engine.on_tick().await, TickOutcome::Placed);
    }

    #[tokio::test]
    async fn test_rearm_after_halt_resumes_trading() {
        let mut h = harness();
        // Trip via fetch failure
        h.engine.on_tick().await;
        assert!(!h.guard.is_healthy());
        assert_eq!(h.engine.on_tick().await, TickOutcome::Idle);

        // Fresh init handshake re-arms the guard
        h.guard.rearm();
        push_book(&h.mock, Ok(book(dec!(0))));
        assert_eq!(h.engine.on_tick().await, TickOutcome::Placed);
    }
}
