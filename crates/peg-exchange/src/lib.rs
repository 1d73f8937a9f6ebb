//! Exchange collaborator interface for the peg re-quoting bot.
//!
//! The strategy core never talks to a venue directly; it consumes the
//! narrow [`ExchangeClient`] trait plus one ordered push channel of
//! [`ExchangeEvent`]s. This crate provides:
//!
//! - [`ExchangeClient`]: dyn-compatible trait over the four venue calls
//! - [`ExchangeEvent`]: typed push events (order updates, init handshake,
//!   transport errors)
//! - [`MockExchange`]: recording mock with scripted results for tests
//! - [`SimExchange`]: deterministic paper transport for dry runs

pub mod client;
pub mod error;
pub mod events;
pub mod mock;
pub mod sim;

pub use client::{BoxFuture, DynExchangeClient, ExchangeClient};
pub use error::{ExchangeError, ExchangeResult};
pub use events::{ExchangeEvent, OrderUpdate};
pub use mock::{MockCall, MockExchange};
pub use sim::{SimConfig, SimExchange};
