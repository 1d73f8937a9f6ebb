//! Process health latch and readiness barrier.
//!
//! - [`HaltGuard`]: the process-wide health flag. Starts unhealthy, turns
//!   healthy on a successful init handshake, and latches unhealthy on any
//!   unrecoverable error, requesting shutdown.
//! - [`ReadyBarrier`]: one-shot barrier the repricing loop waits on before
//!   its first action, satisfied by the init handshake.

pub mod halt;
pub mod ready;

pub use halt::{HaltGuard, HaltReason};
pub use ready::ReadyBarrier;
