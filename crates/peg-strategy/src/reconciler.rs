//! Order lifecycle reconciliation.
//!
//! Folds exchange-pushed status updates into [`QuoteState`]. Pushed truth
//! wins over local call results: a fill can arrive while the loop still
//! believes the order is resting, and a stale update can arrive for an
//! order the loop has already superseded. The latter is ignored, never an
//! error.

use tracing::{debug, info, warn};

use peg_core::OrderStatus;
use peg_exchange::OrderUpdate;
use peg_telemetry::Metrics;

use crate::quote::{QuoteState, QuoteStatus};

/// Apply one pushed update to the quote state.
///
/// Transition table (events for untracked ids are dropped up front):
///
/// | current            | event            | next             |
/// |--------------------|------------------|------------------|
/// | Resting            | Filled           | Absent           |
/// | Resting            | PartiallyFilled  | PartiallyFilled  |
/// | PartiallyFilled    | Filled           | Absent           |
/// | any live           | Failed           | Absent (no halt) |
/// | PendingCancel      | Canceled         | Absent           |
/// | anything else      | any              | unchanged        |
pub fn apply(quote: &mut QuoteState, update: &OrderUpdate) {
    if !quote.is_tracking(&update.order_id) {
        debug!(
            order_id = %update.order_id,
            status = %update.status,
            "Ignoring update for untracked order"
        );
        return;
    }

    match (quote.status(), update.status) {
        (QuoteStatus::Resting | QuoteStatus::PartiallyFilled, OrderStatus::Filled) => {
            info!(order_id = %update.order_id, "Order filled");
            Metrics::fill();
            quote.apply_fill();
        }
        (QuoteStatus::Resting, OrderStatus::PartiallyFilled) => {
            info!(order_id = %update.order_id, "Order partially filled");
            quote.apply_partial_fill();
        }
        (_, OrderStatus::Failed) => {
            warn!(order_id = %update.order_id, "Order failed on exchange");
            quote.apply_failed();
        }
        (QuoteStatus::PendingCancel, OrderStatus::Filled) => {
            // The fill beat our cancel; the cancel call will report an
            // unknown order, which the loop tolerates.
            info!(order_id = %update.order_id, "Order filled while cancel in flight");
            Metrics::fill();
            quote.apply_fill();
        }
        (QuoteStatus::PendingCancel, OrderStatus::Canceled) => {
            debug!(order_id = %update.order_id, "Cancel confirmed via push");
            quote.apply_canceled();
        }
        (current, status) => {
            debug!(
                order_id = %update.order_id,
                quote_status = %current,
                event_status = %status,
                "Ignoring non-actionable status update"
            );
        }
    }
}
