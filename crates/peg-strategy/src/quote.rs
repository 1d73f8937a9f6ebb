//! Single-quote state.
//!
//! `QuoteState` is the one source of truth for the resting order (or its
//! absence). All mutation goes through the transition methods below, which
//! reject sequences that would track two live orders at once.

use std::fmt;

use peg_core::{OrderId, Price, Size};

use crate::error::{StrategyError, StrategyResult};

/// Lifecycle status of the tracked quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStatus {
    /// No order tracked.
    Absent,
    /// Create submitted, not yet confirmed.
    PendingCreate,
    /// Confirmed resting in the book.
    Resting,
    /// Partially filled, remainder resting.
    PartiallyFilled,
    /// Cancel submitted, not yet confirmed.
    PendingCancel,
    /// Create failed; cleared to Absent at the next tick.
    Failed,
}

impl QuoteStatus {
    /// Whether an order may be live on the exchange in this status.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            Self::PendingCreate | Self::Resting | Self::PartiallyFilled | Self::PendingCancel
        )
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::PendingCreate => write!(f, "pending_create"),
            Self::Resting => write!(f, "resting"),
            Self::PartiallyFilled => write!(f, "partially_filled"),
            Self::PendingCancel => write!(f, "pending_cancel"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The currently tracked quote. At most one order is live at any time;
/// the transition methods enforce it structurally.
#[derive(Debug, Clone)]
pub struct QuoteState {
    order_id: Option<OrderId>,
    price: Option<Price>,
    quantity: Size,
    status: QuoteStatus,
}

impl QuoteState {
    /// New state with no tracked order.
    #[must_use]
    pub fn new(quantity: Size) -> Self {
        Self {
            order_id: None,
            price: None,
            quantity,
            status: QuoteStatus::Absent,
        }
    }

    #[must_use]
    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    #[must_use]
    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.price
    }

    #[must_use]
    pub fn quantity(&self) -> Size {
        self.quantity
    }

    /// Whether an order may currently be live on the exchange.
    #[must_use]
    pub fn has_live_order(&self) -> bool {
        self.status.is_live()
    }

    /// Whether `id` is the tracked order.
    #[must_use]
    pub fn is_tracking(&self, id: &OrderId) -> bool {
        self.order_id.as_ref() == Some(id)
    }

    /// Start a create. Only legal when nothing is live.
    pub fn begin_create(&mut self) -> StrategyResult<()> {
        match self.status {
            QuoteStatus::Absent | QuoteStatus::Failed => {
                self.status = QuoteStatus::PendingCreate;
                Ok(())
            }
            from => Err(StrategyError::IllegalTransition {
                from,
                to: "pending_create",
            }),
        }
    }

    /// Record a confirmed create.
    pub fn confirm_create(&mut self, order_id: OrderId, price: Price) -> StrategyResult<()> {
        match self.status {
            QuoteStatus::PendingCreate => {
                self.order_id = Some(order_id);
                self.price = Some(price);
                self.status = QuoteStatus::Resting;
                Ok(())
            }
            from => Err(StrategyError::IllegalTransition {
                from,
                to: "resting",
            }),
        }
    }

    /// Record a failed create. The next tick retries from scratch.
    pub fn fail_create(&mut self) {
        self.order_id = None;
        self.price = None;
        self.status = QuoteStatus::Failed;
    }

    /// Start a cancel; returns the id to cancel.
    pub fn begin_cancel(&mut self) -> StrategyResult<OrderId> {
        match (self.status, self.order_id.clone()) {
            (QuoteStatus::Resting | QuoteStatus::PartiallyFilled, Some(id)) => {
                self.status = QuoteStatus::PendingCancel;
                Ok(id)
            }
            (from, _) => Err(StrategyError::IllegalTransition {
                from,
                to: "pending_cancel",
            }),
        }
    }

    /// Record a confirmed cancel.
    pub fn confirm_cancel(&mut self) -> StrategyResult<()> {
        match self.status {
            QuoteStatus::PendingCancel => {
                self.clear();
                Ok(())
            }
            from => Err(StrategyError::IllegalTransition { from, to: "absent" }),
        }
    }

    /// Record a failed cancel. The order is assumed still live and stays
    /// tracked, which blocks any create until it is resolved.
    pub fn fail_cancel(&mut self) {
        if self.status == QuoteStatus::PendingCancel {
            self.status = QuoteStatus::Resting;
        }
    }

    /// Fold in a full fill for the tracked order (any live status).
    pub fn apply_fill(&mut self) {
        self.clear();
    }

    /// Fold in a partial fill: the order keeps resting.
    pub fn apply_partial_fill(&mut self) {
        if self.status == QuoteStatus::Resting {
            self.status = QuoteStatus::PartiallyFilled;
        }
    }

    /// Fold in an exchange-side failure of the tracked order.
    pub fn apply_failed(&mut self) {
        self.clear();
    }

    /// Fold in an asynchronous cancel confirmation.
    pub fn apply_canceled(&mut self) {
        if self.status == QuoteStatus::PendingCancel {
            self.clear();
        }
    }

    /// Drop a stale `Failed` marker before the next create attempt.
    pub fn reset_failed(&mut self) {
        if self.status == QuoteStatus::Failed {
            self.status = QuoteStatus::Absent;
        }
    }

    fn clear(&mut self) {
        self.order_id = None;
        self.price = None;
        self.status = QuoteStatus::Absent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote() -> QuoteState {
        QuoteState::new(Size::new(dec!(0.1)))
    }

    #[test]
    fn test_starts_absent() {
        let q = quote();
        assert_eq!(q.status(), QuoteStatus::Absent);
        assert!(q.order_id().is_none());
        assert!(q.price().is_none());
        assert!(!q.has_live_order());
    }

    #[test]
    fn test_create_lifecycle() {
        let mut q = quote();
        q.begin_create().unwrap();
        assert_eq!(q.status(), QuoteStatus::PendingCreate);
        assert!(q.has_live_order());

        q.confirm_create(OrderId::from("ord_1"), Price::new(dec!(99.98)))
            .unwrap();
        assert_eq!(q.status(), QuoteStatus::Resting);
        assert_eq!(q.price().unwrap().inner(), dec!(99.98));
        assert!(q.is_tracking(&OrderId::from("ord_1")));
    }

    #[test]
    fn test_no_second_live_order() {
        let mut q = quote();
        q.begin_create().unwrap();
        q.confirm_create(OrderId::from("ord_1"), Price::new(dec!(99.98)))
            .unwrap();

        // Creating on top of a resting order is rejected
        assert!(matches!(
            q.begin_create(),
            Err(StrategyError::IllegalTransition { .. })
        ));
        // The resting order is untouched
        assert_eq!(q.status(), QuoteStatus::Resting);
    }

    #[test]
    fn test_cancel_lifecycle() {
        let mut q = quote();
        q.begin_create().unwrap();
        q.confirm_create(OrderId::from("ord_1"), Price::new(dec!(99.98)))
            .unwrap();

        let id = q.begin_cancel().unwrap();
        assert_eq!(id, OrderId::from("ord_1"));
        assert_eq!(q.status(), QuoteStatus::PendingCancel);

        q.confirm_cancel().unwrap();
        assert_eq!(q.status(), QuoteStatus::Absent);
        assert!(q.order_id().is_none());
    }

    #[test]
    fn test_failed_cancel_keeps_order_tracked() {
        let mut q = quote();
        q.begin_create().unwrap();
        q.confirm_create(OrderId::from("ord_1"), Price::new(dec!(99.98)))
            .unwrap();
        q.begin_cancel().unwrap();

        q.fail_cancel();
        // Still tracked, still live: the next create stays blocked
        assert_eq!(q.status(), QuoteStatus::Resting);
        assert!(q.is_tracking(&OrderId::from("ord_1")));
        assert!(q.begin_create().is_err());
    }

    #[test]
    fn test_failed_create_allows_retry() {
        let mut q = quote();
        q.begin_create().unwrap();
        q.fail_create();
        assert_eq!(q.status(), QuoteStatus::Failed);
        assert!(!q.has_live_order());

        // Retry goes straight through
        q.begin_create().unwrap();
        assert_eq!(q.status(), QuoteStatus::PendingCreate);
    }

    #[test]
    fn test_cancel_requires_live_order() {
        let mut q = quote();
        assert!(q.begin_cancel().is_err());
    }

    #[test]
    fn test_fill_clears_state() {
        let mut q = quote();
        q.begin_create().unwrap();
        q.confirm_create(OrderId::from("ord_1"), Price::new(dec!(99.98)))
            .unwrap();

        q.apply_fill();
        assert_eq!(q.status(), QuoteStatus::Absent);
        assert!(q.order_id().is_none());
        assert!(q.price().is_none());
    }

    #[test]
    fn test_partial_fill_retains_order() {
        let mut q = quote();
        q.begin_create().unwrap();
        q.confirm_create(OrderId::from("ord_1"), Price::new(dec!(99.98)))
            .unwrap();

        q.apply_partial_fill();
        assert_eq!(q.status(), QuoteStatus::PartiallyFilled);
        assert!(q.is_tracking(&OrderId::from("ord_1")));
        assert_eq!(q.price().unwrap().inner(), dec!(99.98));

        // Terminal fill afterwards clears
        q.apply_fill();
        assert_eq!(q.status(), QuoteStatus::Absent);
    }
}
