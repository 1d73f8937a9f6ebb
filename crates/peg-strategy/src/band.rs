//! Acceptance band computation.
//!
//! The band spans two configured bid depths; the quote target is the
//! rounded midpoint. Re-quoting is suppressed while the resting price lies
//! anywhere inside `[low, high]`, which bounds quoting frequency under
//! continuous micro-drift.

use peg_core::{OrderBook, Price};

use crate::config::StrategyConfig;
use crate::error::{StrategyError, StrategyResult};

/// Acceptance band with its quote target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    /// Low edge (the deeper bid level).
    pub low: Price,
    /// High edge (the shallower bid level).
    pub high: Price,
    /// Quote target: midpoint rounded to the configured precision.
    pub target: Price,
}

impl PriceBand {
    /// Whether a resting price needs no re-quote.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        self.low <= price && price <= self.high
    }
}

/// Derive the band from a depth snapshot.
///
/// Pure and deterministic: identical snapshots and config yield identical
/// bands. Fails with `InsufficientDepth` when the snapshot has fewer bid
/// levels than `band_far_depth`; never returns a partial band.
pub fn compute_band(book: &OrderBook, config: &StrategyConfig) -> StrategyResult<PriceBand> {
    let got = book.bid_depth();
    if got < config.band_far_depth {
        return Err(StrategyError::InsufficientDepth {
            needed: config.band_far_depth,
            got,
        });
    }

    // Both lookups are covered by the depth check; band_near_depth is
    // validated shallower than band_far_depth at config load.
    let high = book
        .bid(config.band_near_depth)
        .map(|l| l.price)
        .ok_or(StrategyError::InsufficientDepth {
            needed: config.band_near_depth,
            got,
        })?;
    let low = book
        .bid(config.band_far_depth)
        .map(|l| l.price)
        .ok_or(StrategyError::InsufficientDepth {
            needed: config.band_far_depth,
            got,
        })?;

    debug_assert!(low <= high, "book ordering guarantees low <= high");

    let target = low.midpoint(high).round_dp(config.price_decimals);

    Ok(PriceBand { low, high, target })
}
