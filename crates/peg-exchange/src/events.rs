//! Typed push events from the exchange.
//!
//! All asynchronous notifications arrive over a single ordered channel so
//! consumers never race one callback against another.

use serde::{Deserialize, Serialize};

use peg_core::{OrderId, OrderStatus};

/// Order status update pushed by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// Exchange-assigned order id the update refers to.
    pub order_id: OrderId,
    /// New status.
    pub status: OrderStatus,
}

impl OrderUpdate {
    pub fn new(order_id: OrderId, status: OrderStatus) -> Self {
        Self { order_id, status }
    }
}

/// Push event delivered to the application over one ordered channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    /// Order status change.
    Order(OrderUpdate),
    /// One-shot initialization handshake result.
    Init { success: bool },
    /// Transport-level failure (connection lost, auth rejected, ...).
    TransportError(String),
}
