//! Validated order-book depth snapshots.
//!
//! A snapshot carries bids and asks best-first. Construction validates
//! side ordering so downstream code can index levels without re-checking.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::{Price, Size};

/// A single depth level: price and aggregate size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Size,
}

impl BookLevel {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

/// Order-book depth snapshot, best level first on both sides.
///
/// Invariant (checked at construction): bid prices strictly descending,
/// ask prices strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    bids: Vec<BookLevel>,
    asks: Vec<BookLevel>,
}

impl OrderBook {
    /// Build a snapshot, rejecting unordered or crossed-within-side input.
    pub fn new(bids: Vec<BookLevel>, asks: Vec<BookLevel>) -> Result<Self, CoreError> {
        if let Some(w) = bids.windows(2).find(|w| w[0].price <= w[1].price) {
            return Err(CoreError::InvalidBook(format!(
                "bids not strictly descending: {} then {}",
                w[0].price, w[1].price
            )));
        }
        if let Some(w) = asks.windows(2).find(|w| w[0].price >= w[1].price) {
            return Err(CoreError::InvalidBook(format!(
                "asks not strictly ascending: {} then {}",
                w[0].price, w[1].price
            )));
        }
        Ok(Self { bids, asks })
    }

    /// The n-th best bid level, 1-based (`bid(1)` is the best bid).
    #[must_use]
    pub fn bid(&self, depth: usize) -> Option<&BookLevel> {
        if depth == 0 {
            return None;
        }
        self.bids.get(depth - 1)
    }

    /// The n-th best ask level, 1-based.
    #[must_use]
    pub fn ask(&self, depth: usize) -> Option<&BookLevel> {
        if depth == 0 {
            return None;
        }
        self.asks.get(depth - 1)
    }

    /// Number of bid levels in the snapshot.
    #[must_use]
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask levels in the snapshot.
    #[must_use]
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    #[must_use]
    pub fn bids(&self) -> &[BookLevel] {
        &self.bids
    }

    #[must_use]
    pub fn asks(&self) -> &[BookLevel] {
        &self.asks
    }
}
