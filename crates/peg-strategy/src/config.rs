//! Strategy configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{StrategyError, StrategyResult};

/// Repricing strategy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Symbol to quote.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Order quantity in base units.
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,

    /// Repricing tick period in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Depth requested from the book fetch.
    #[serde(default = "default_book_depth")]
    pub book_depth: usize,

    /// Bid depth forming the high edge of the acceptance band (1-based).
    #[serde(default = "default_band_near_depth")]
    pub band_near_depth: usize,

    /// Bid depth forming the low edge of the acceptance band (1-based).
    /// A snapshot with fewer bid levels than this is rejected.
    #[serde(default = "default_band_far_depth")]
    pub band_far_depth: usize,

    /// Decimal digits the quote price is rounded to. Part of the quoting
    /// policy: two targets that round equal are considered equal.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,

    /// Bound on each exchange call (fetch/create/cancel) in milliseconds.
    /// Expiry counts as a fetch-style failure.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Consecutive book-fetch failures tolerated before the guard trips.
    /// The default of 1 is the fail-closed posture: a single failure halts.
    #[serde(default = "default_max_fetch_failures")]
    pub max_fetch_failures: u32,
}

fn default_symbol() -> String {
    "BNBUSDT".to_string()
}

fn default_quantity() -> Decimal {
    dec!(0.1)
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_book_depth() -> usize {
    10
}

fn default_band_near_depth() -> usize {
    6
}

fn default_band_far_depth() -> usize {
    8
}

fn default_price_decimals() -> u32 {
    4
}

fn default_call_timeout_ms() -> u64 {
    5000
}

fn default_max_fetch_failures() -> u32 {
    1
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            quantity: default_quantity(),
            poll_interval_ms: default_poll_interval_ms(),
            book_depth: default_book_depth(),
            band_near_depth: default_band_near_depth(),
            band_far_depth: default_band_far_depth(),
            price_decimals: default_price_decimals(),
            call_timeout_ms: default_call_timeout_ms(),
            max_fetch_failures: default_max_fetch_failures(),
        }
    }
}

impl StrategyConfig {
    /// Validate cross-field constraints.
    pub fn validate(&self) -> StrategyResult<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.band_near_depth == 0 || self.band_far_depth == 0 {
            return Err(StrategyError::InvalidConfig(
                "band depths are 1-based and must be nonzero".to_string(),
            ));
        }
        if self.band_near_depth >= self.band_far_depth {
            return Err(StrategyError::InvalidConfig(format!(
                "band_near_depth ({}) must be shallower than band_far_depth ({})",
                self.band_near_depth, self.band_far_depth
            )));
        }
        if self.book_depth < self.band_far_depth {
            return Err(StrategyError::InvalidConfig(format!(
                "book_depth ({}) must cover band_far_depth ({})",
                self.book_depth, self.band_far_depth
            )));
        }
        if self.max_fetch_failures == 0 {
            return Err(StrategyError::InvalidConfig(
                "max_fetch_failures must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
