//! Core domain types for the peg re-quoting bot.
//!
//! This crate provides the fundamental types shared across the system:
//! - `Price`, `Size`: precision-safe numeric types
//! - `OrderId`, `OrderSide`, `OrderStatus`: order identifiers and enums
//! - `OrderBook`, `BookLevel`: validated depth snapshots

pub mod book;
pub mod decimal;
pub mod error;
pub mod order;

pub use book::{BookLevel, OrderBook};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use order::{OrderId, OrderSide, OrderStatus};
