//! Funding and withdrawal request records.
//!
//! Funding and withdrawal share one shape: a pending ledger-mutation intent
//! owned by a user and resolved exactly once by an admin. Resolved requests
//! are never deleted; they are the audit trail.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a transfer request. Approved and Declined are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting admin review.
    Pending,
    /// Approved; the ledger mutation has been applied.
    Approved,
    /// Declined; no ledger effect.
    Declined,
}

impl RequestStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Declined => "Declined",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }

    /// Returns true once the request can no longer transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A pending ledger-mutation intent (funding or withdrawal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Asset credited (funding) or debited (withdrawal).
    pub asset: String,
    /// Requested amount, always positive.
    pub amount: Decimal,
    /// Opaque proof-of-payment URL or withdrawal destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Review status.
    pub status: RequestStatus,
}

impl TransferRequest {
    /// Creates a new Pending request.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        asset: impl Into<String>,
        amount: Decimal,
        detail: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            asset: asset.into(),
            amount,
            detail,
            created_at: Utc::now(),
            status: RequestStatus::Pending,
        }
    }

    /// Returns true while the request awaits review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
