//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] peg_strategy::StrategyError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] peg_exchange::ExchangeError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] peg_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
