//! Band-based single-order repricing strategy.
//!
//! Keeps one resting buy limit order pegged between two configured bid
//! depths, re-quoting only when the market drifts far enough that the
//! resting price falls out of the acceptance band.
//!
//! # Architecture
//!
//! ```text
//! timer tick → RepricingEngine.on_tick()
//!               ├─ HaltGuard: healthy? else idle
//!               ├─ ExchangeClient.fetch_order_book()
//!               ├─ band::compute_band(): target + [low, high]
//!               └─ QuoteState: keep / cancel-then-create
//!
//! push event → reconciler::apply(QuoteState, OrderUpdate)
//! ```
//!
//! Both paths run on the single application task, so `QuoteState` has
//! exactly one writer.

pub mod band;
pub mod config;
pub mod engine;
pub mod error;
pub mod quote;
pub mod reconciler;

pub use band::{compute_band, PriceBand};
pub use config::StrategyConfig;
pub use engine::{RepricingEngine, TickOutcome};
pub use error::{StrategyError, StrategyResult};
pub use quote::{QuoteState, QuoteStatus};
