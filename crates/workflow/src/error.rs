//! Error types for the request workflow.

use blockbridge_accounts::AccountError;
use blockbridge_core::{LedgerError, RequestStatus};
use blockbridge_store::StoreError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while submitting or resolving requests.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The request has already been resolved; Approved and Declined are
    /// terminal.
    #[error("request {id} already resolved: {status:?}")]
    InvalidStateTransition {
        /// Request id.
        id: String,
        /// Status the request was found in.
        status: RequestStatus,
    },

    /// Referenced request does not exist.
    #[error("request not found: {0}")]
    RequestNotFound(String),

    /// Submitted amount was zero or negative.
    #[error("invalid amount: {0} (must be positive)")]
    InvalidAmount(Decimal),

    /// The wallet mutation succeeded but the status write failed, leaving
    /// funds applied against a still-Pending request. Requires manual
    /// reconciliation.
    #[error("request {request_id} partially approved: wallet of user {user_id} was updated but the status write failed")]
    PartialApproval {
        /// Request left in Pending.
        request_id: String,
        /// User whose wallet was already mutated.
        user_id: String,
        /// The failure that interrupted the second step.
        #[source]
        source: Box<WorkflowError>,
    },

    /// Ledger rejection (insufficient funds).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Accounts-layer failure.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Document store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Creates an invalid state transition error.
    pub fn invalid_transition(id: impl Into<String>, status: RequestStatus) -> Self {
        Self::InvalidStateTransition {
            id: id.into(),
            status,
        }
    }
}

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_transition_display() {
        let err = WorkflowError::invalid_transition("req-1", RequestStatus::Approved);
        assert!(err.to_string().contains("req-1"));
        assert!(err.to_string().contains("Approved"));
    }

    #[test]
    fn test_invalid_amount_display() {
        let err = WorkflowError::InvalidAmount(dec!(-5));
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_ledger_error_passes_through() {
        let err: WorkflowError =
            LedgerError::insufficient_funds("BTC", dec!(0.5), dec!(0.6)).into();
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn test_partial_approval_carries_source() {
        use std::error::Error as _;

        let source = Box::new(WorkflowError::RequestNotFound("req-1".to_string()));
        let err = WorkflowError::PartialApproval {
            request_id: "req-1".to_string(),
            user_id: "user-1".to_string(),
            source,
        };

        assert!(err.to_string().contains("partially approved"));
        assert!(err.source().is_some());
    }
}
