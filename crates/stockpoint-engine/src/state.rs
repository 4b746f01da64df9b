//! Per-attempt state machine. Transitions are logged, never persisted.

use std::fmt;
use tracing::debug;

/// Where a sale attempt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleAttemptState {
    Validating,
    Deducting,
    Recording,
    ReceiptPending,
    Complete,
    RolledBack,
    Failed,
    CompleteWithoutReceipt,
}

impl SaleAttemptState {
    /// Whether `self -> next` is a legal step.
    pub fn can_transition_to(self, next: SaleAttemptState) -> bool {
        use SaleAttemptState::*;

        matches!(
            (self, next),
            (Validating, Deducting)
                | (Validating, Failed)
                | (Deducting, Recording)
                | (Deducting, RolledBack)
                | (Recording, ReceiptPending)
                | (Recording, RolledBack)
                | (RolledBack, Failed)
                | (ReceiptPending, Complete)
                | (ReceiptPending, CompleteWithoutReceipt)
        )
    }

    /// No further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SaleAttemptState::Complete
                | SaleAttemptState::Failed
                | SaleAttemptState::CompleteWithoutReceipt
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaleAttemptState::Validating => "validating",
            SaleAttemptState::Deducting => "deducting",
            SaleAttemptState::Recording => "recording",
            SaleAttemptState::ReceiptPending => "receipt_pending",
            SaleAttemptState::Complete => "complete",
            SaleAttemptState::RolledBack => "rolled_back",
            SaleAttemptState::Failed => "failed",
            SaleAttemptState::CompleteWithoutReceipt => "complete_without_receipt",
        }
    }
}

impl fmt::Display for SaleAttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one attempt's state and logs every step.
#[derive(Debug)]
pub(crate) struct AttemptTracker {
    id: String,
    state: SaleAttemptState,
}

impl AttemptTracker {
    pub(crate) fn new() -> Self {
        let tracker = AttemptTracker {
            id: uuid::Uuid::new_v4().to_string(),
            state: SaleAttemptState::Validating,
        };
        debug!(attempt = %tracker.id, state = %tracker.state, "Sale attempt started");
        tracker
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn advance(&mut self, next: SaleAttemptState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal sale attempt transition {} -> {}",
            self.state,
            next
        );
        debug!(attempt = %self.id, from = %self.state, to = %next, "Sale attempt transition");
        self.state = next;
        if next.is_terminal() {
            debug!(attempt = %self.id, outcome = %next, "Sale attempt finished");
        }
    }
}
