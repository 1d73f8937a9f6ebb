//! Exchange error types.

use thiserror::Error;

/// Errors surfaced by the exchange collaborator.
///
/// Clone is intentional: mocks script result sequences by value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Unknown order: {0}")]
    UnknownOrder(String),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
