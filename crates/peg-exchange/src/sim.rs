//! Deterministic paper exchange.
//!
//! Synthesizes a random-walk order book and simulated fills so the bot can
//! run end-to-end without a venue connection. The walk is seeded, so a
//! paper run is reproducible.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use parking_lot::Mutex;
use peg_core::{BookLevel, OrderBook, OrderId, OrderSide, OrderStatus, Price, Size};

use crate::client::{BoxFuture, ExchangeClient};
use crate::error::{ExchangeError, ExchangeResult};
use crate::events::{ExchangeEvent, OrderUpdate};

/// Paper exchange configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Mid price the walk starts from.
    #[serde(default = "default_start_price")]
    pub start_price: Decimal,
    /// Price distance between adjacent book levels.
    #[serde(default = "default_tick")]
    pub tick: Decimal,
    /// Size quoted at every synthetic level.
    #[serde(default = "default_level_size")]
    pub level_size: Decimal,
    /// Seed for the walk; identical seeds replay identical runs.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_start_price() -> Decimal {
    dec!(100)
}

fn default_tick() -> Decimal {
    dec!(0.01)
}

fn default_level_size() -> Decimal {
    dec!(5)
}

fn default_seed() -> u64 {
    42
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_price: default_start_price(),
            tick: default_tick(),
            level_size: default_level_size(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug)]
struct SimState {
    mid: Decimal,
    rng: u64,
    open: Vec<(OrderId, OrderSide, Price, Size)>,
}

/// In-process exchange with a seeded random-walk book.
///
/// Push events (init handshake, order updates) are delivered over the
/// receiver returned by [`SimExchange::new`], on the same ordered channel
/// a real transport would use.
pub struct SimExchange {
    config: SimConfig,
    state: Mutex<SimState>,
    events: mpsc::Sender<ExchangeEvent>,
}

impl SimExchange {
    /// Create the paper exchange and its event channel.
    ///
    /// The init handshake is emitted immediately; it sits buffered until
    /// the application drains the channel.
    pub fn new(config: SimConfig) -> (Self, mpsc::Receiver<ExchangeEvent>) {
        let (tx, rx) = mpsc::channel(64);

        let sim = Self {
            state: Mutex::new(SimState {
                mid: config.start_price,
                rng: config.seed,
                open: Vec::new(),
            }),
            config,
            events: tx,
        };
        sim.emit(ExchangeEvent::Init { success: true });

        (sim, rx)
    }

    fn emit(&self, event: ExchangeEvent) {
        if self.events.try_send(event).is_err() {
            debug!("sim event channel full, dropping event");
        }
    }

    /// One step of a 64-bit LCG; low bias is irrelevant here.
    fn next_rng(rng: u64) -> u64 {
        rng.wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407)
    }

    fn mint_id() -> OrderId {
        let short = &Uuid::new_v4().to_string()[..8];
        let ts = chrono::Utc::now().timestamp_millis();
        OrderId::from(format!("sim_{ts}_{short}"))
    }

    /// Advance the walk one step and settle any crossed resting orders.
    fn step(&self) -> Decimal {
        let mut state = self.state.lock();
        state.rng = Self::next_rng(state.rng);
        // Bit 62 picks direction, bit 61 decides whether to move at all
        let moves = (state.rng >> 61) & 1 == 1;
        if moves {
            let up = (state.rng >> 62) & 1 == 1;
            if up {
                state.mid += self.config.tick;
            } else {
                state.mid -= self.config.tick;
            }
        }
        let mid = state.mid;

        // A resting buy fills once the walk trades through its price
        let mut filled = Vec::new();
        state.open.retain(|(id, side, price, _)| {
            let crossed = match side {
                OrderSide::Buy => mid <= price.inner(),
                OrderSide::Sell => mid >= price.inner(),
            };
            if crossed {
                filled.push(id.clone());
                false
            } else {
                true
            }
        });
        drop(state);

        for id in filled {
            debug!(order_id = %id, "sim fill");
            self.emit(ExchangeEvent::Order(OrderUpdate::new(
                id,
                OrderStatus::Filled,
            )));
        }

        mid
    }
}

impl ExchangeClient for SimExchange {
    fn fetch_order_book<'a>(
        &'a self,
        _symbol: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, ExchangeResult<OrderBook>> {
        Box::pin(async move {
            let mid = self.step();
            let size = Size::new(self.config.level_size);

            let bids = (1..=depth)
                .map(|i| {
                    let px = mid - self.config.tick * Decimal::from(i as u64);
                    BookLevel::new(Price::new(px), size)
                })
                .collect();
            let asks = (1..=depth)
                .map(|i| {
                    let px = mid + self.config.tick * Decimal::from(i as u64);
                    BookLevel::new(Price::new(px), size)
                })
                .collect();

            OrderBook::new(bids, asks)
                .map_err(|e| ExchangeError::Transport(format!("sim book: {e}")))
        })
    }

    fn create_order(
        &self,
        side: OrderSide,
        price: Price,
        quantity: Size,
    ) -> BoxFuture<'_, ExchangeResult<OrderId>> {
        Box::pin(async move {
            if !price.is_positive() {
                return Err(ExchangeError::Rejected(format!(
                    "non-positive price: {price}"
                )));
            }
            let id = Self::mint_id();
            self.state
                .lock()
                .open
                .push((id.clone(), side, price, quantity));
            self.emit(ExchangeEvent::Order(OrderUpdate::new(
                id.clone(),
                OrderStatus::New,
            )));
            Ok(id)
        })
    }

    fn cancel_order(&self, order_id: OrderId) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            let before = state.open.len();
            state.open.retain(|(id, _, _, _)| id != &order_id);
            let removed = state.open.len() < before;
            drop(state);

            if removed {
                self.emit(ExchangeEvent::Order(OrderUpdate::new(
                    order_id,
                    OrderStatus::Canceled,
                )));
                Ok(())
            } else {
                Err(ExchangeError::UnknownOrder(order_id.to_string()))
            }
        })
    }

    fn open_orders<'a>(
        &'a self,
        _symbol: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<Vec<OrderId>>> {
        Box::pin(async move {
            Ok(self
                .state
                .lock()
                .open
                .iter()
                .map(|(id, _, _, _)| id.clone())
                .collect())
        })
    }
}
