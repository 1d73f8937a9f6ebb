//! Mock exchange for testing.
//!
//! Records every call and returns scripted results, so strategy tests can
//! assert exactly which venue actions a tick produced.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use peg_core::{OrderBook, OrderId, OrderSide, Price, Size};

use crate::client::{BoxFuture, ExchangeClient};
use crate::error::{ExchangeError, ExchangeResult};

/// A recorded venue call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchBook { symbol: String, depth: usize },
    Create { side: OrderSide, price: Price, quantity: Size },
    Cancel { order_id: OrderId },
    OpenOrders { symbol: String },
}

/// Recording mock with scripted result queues.
///
/// Each call pops the front of its result queue; an empty queue falls back
/// to a sensible default (books: transport error, creates: a fresh minted
/// id, cancels: success, open orders: the configured list).
#[derive(Debug, Default)]
pub struct MockExchange {
    calls: Mutex<Vec<MockCall>>,
    book_results: Mutex<VecDeque<ExchangeResult<OrderBook>>>,
    create_results: Mutex<VecDeque<ExchangeResult<OrderId>>>,
    cancel_results: Mutex<VecDeque<ExchangeResult<()>>>,
    open_orders: Mutex<Vec<OrderId>>,
    next_id: AtomicU64,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a book snapshot result for the next fetch.
    pub fn push_book(&self, result: ExchangeResult<OrderBook>) {
        self.book_results.lock().push_back(result);
    }

    /// Queue a create result.
    pub fn push_create(&self, result: ExchangeResult<OrderId>) {
        self.create_results.lock().push_back(result);
    }

    /// Queue a cancel result.
    pub fn push_cancel(&self, result: ExchangeResult<()>) {
        self.cancel_results.lock().push_back(result);
    }

    /// Set the open-orders list returned by `open_orders`.
    pub fn set_open_orders(&self, orders: Vec<OrderId>) {
        *self.open_orders.lock() = orders;
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Recorded calls of a given shape.
    pub fn creates(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, MockCall::Create { .. }))
            .cloned()
            .collect()
    }

    pub fn cancels(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, MockCall::Cancel { .. }))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn mint_id(&self) -> OrderId {
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        OrderId::from(format!("mock_{seq}"))
    }
}

impl ExchangeClient for MockExchange {
    fn fetch_order_book<'a>(
        &'a self,
        symbol: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, ExchangeResult<OrderBook>> {
        Box::pin(async move {
            self.calls.lock().push(MockCall::FetchBook {
                symbol: symbol.to_string(),
                depth,
            });
            self.book_results
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ExchangeError::Transport("no scripted book".to_string())))
        })
    }

    fn create_order(
        &self,
        side: OrderSide,
        price: Price,
        quantity: Size,
    ) -> BoxFuture<'_, ExchangeResult<OrderId>> {
        Box::pin(async move {
            self.calls.lock().push(MockCall::Create {
                side,
                price,
                quantity,
            });
            match self.create_results.lock().pop_front() {
                Some(result) => result,
                None => Ok(self.mint_id()),
            }
        })
    }

    fn cancel_order(&self, order_id: OrderId) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            self.calls.lock().push(MockCall::Cancel { order_id });
            self.cancel_results.lock().pop_front().unwrap_or(Ok(()))
        })
    }

    fn open_orders<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<Vec<OrderId>>> {
        Box::pin(async move {
            self.calls.lock().push(MockCall::OpenOrders {
                symbol: symbol.to_string(),
            });
            Ok(self.open_orders.lock().clone())
        })
    }
}
