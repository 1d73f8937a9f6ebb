//! Prometheus metrics for the peg bot.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should crash at startup rather than fail silently. These panics only
//! occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter,
};

/// Tick outcomes by kind.
/// Labels: outcome (steady/requote/place/idle/error)
pub static TICKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "peg_ticks_total",
        "Repricing ticks by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Total orders created.
pub static ORDERS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("peg_orders_created_total", "Total orders created").unwrap()
});

/// Total orders cancelled.
pub static ORDERS_CANCELED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("peg_orders_canceled_total", "Total orders cancelled").unwrap()
});

/// Total order fills observed via push updates.
pub static FILLS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("peg_fills_total", "Total fills observed").unwrap()
});

/// Failed order actions by kind.
/// Labels: action (create/cancel)
pub static ORDER_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "peg_order_failures_total",
        "Failed order actions",
        &["action"]
    )
    .unwrap()
});

/// Process health flag (1 = healthy).
pub static HEALTHY: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("peg_healthy", "Process health flag (1=healthy)").unwrap()
});

/// Facade for recording metrics.
pub struct Metrics;

impl Metrics {
    /// Record a tick outcome.
    pub fn tick(outcome: &str) {
        TICKS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a successful order create.
    pub fn order_created() {
        ORDERS_CREATED_TOTAL.inc();
    }

    /// Record a successful order cancel.
    pub fn order_canceled() {
        ORDERS_CANCELED_TOTAL.inc();
    }

    /// Record a fill.
    pub fn fill() {
        FILLS_TOTAL.inc();
    }

    /// Record a failed order action.
    pub fn order_failed(action: &str) {
        ORDER_FAILURES_TOTAL.with_label_values(&[action]).inc();
    }

    /// Record the current health flag.
    pub fn set_healthy(healthy: bool) {
        HEALTHY.set(if healthy { 1.0 } else { 0.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = ORDERS_CREATED_TOTAL.get();
        Metrics::order_created();
        assert_eq!(ORDERS_CREATED_TOTAL.get(), before + 1);
    }

    #[test]
    fn test_health_gauge() {
        Metrics::set_healthy(true);
        assert_eq!(HEALTHY.get(), 1.0);
        Metrics::set_healthy(false);
        assert_eq!(HEALTHY.get(), 0.0);
    }

    #[test]
    fn test_labelled_counters() {
        let before = TICKS_TOTAL.with_label_values(&["steady"]).get();
        Metrics::tick("steady");
        assert_eq!(TICKS_TOTAL.with_label_values(&["steady"]).get(), before + 1.0);
    }
}
