//! Strategy error types.

use thiserror::Error;

use crate::quote::QuoteStatus;

/// Strategy error types.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Insufficient depth: needed {needed} bid levels, got {got}")]
    InsufficientDepth { needed: usize, got: usize },

    #[error("Exchange error: {0}")]
    Exchange(#[from] peg_exchange::ExchangeError),

    #[error("Illegal quote transition: {from} -> {to}")]
    IllegalTransition {
        from: QuoteStatus,
        to: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
