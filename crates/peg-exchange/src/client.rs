//! Exchange client trait.
//!
//! Trait-based abstraction over the venue calls the strategy needs.
//! This allows for:
//! - Dependency injection for testing
//! - Separation of strategy logic from transport
//! - Plugging in a real venue transport without touching the core

use std::pin::Pin;
use std::sync::Arc;

use peg_core::{OrderBook, OrderId, OrderSide, Price, Size};

use crate::error::ExchangeResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// The four venue calls the strategy consumes.
///
/// Implementations own authentication, framing, and retry policy; none of
/// that leaks through this interface. All methods may suspend; the caller
/// is responsible for bounding them with a timeout.
pub trait ExchangeClient: Send + Sync {
    /// Fetch a depth snapshot for a symbol.
    fn fetch_order_book<'a>(
        &'a self,
        symbol: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, ExchangeResult<OrderBook>>;

    /// Submit a limit order; returns the exchange-assigned id.
    fn create_order(
        &self,
        side: OrderSide,
        price: Price,
        quantity: Size,
    ) -> BoxFuture<'_, ExchangeResult<OrderId>>;

    /// Cancel a resting order by id.
    fn cancel_order(&self, order_id: OrderId) -> BoxFuture<'_, ExchangeResult<()>>;

    /// List open order ids for a symbol. Diagnostics and init-time
    /// reconciliation only, never on the tick path.
    fn open_orders<'a>(&'a self, symbol: &'a str)
        -> BoxFuture<'a, ExchangeResult<Vec<OrderId>>>;
}

/// Arc wrapper for ExchangeClient trait objects.
pub type DynExchangeClient = Arc<dyn ExchangeClient>;
