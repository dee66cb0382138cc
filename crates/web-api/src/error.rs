//! Maps domain errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blockbridge_accounts::AccountError;
use blockbridge_store::StoreError;
use blockbridge_workflow::WorkflowError;
use serde_json::json;

/// An HTTP-ready error: status code plus a JSON body `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 401 with a generic message.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication required")
    }

    /// 403 with a generic message.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "admin privileges required")
    }

    /// 422 with the given message.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Conflict { .. } => StatusCode::CONFLICT,
            StoreError::Transport(_) | StoreError::Timeout(_) | StoreError::Api { .. } => {
                StatusCode::BAD_GATEWAY
            }
            StoreError::Schema(_) | StoreError::Serialization(_) | StoreError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateEmail(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            AccountError::NotFound(_)
            | AccountError::NotificationNotFound(_)
            | AccountError::MessageNotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            AccountError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            AccountError::InvalidTier(_) => Self::unprocessable(err.to_string()),
            AccountError::PasswordHash(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AccountError::Store(store) => store.into(),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidStateTransition { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            WorkflowError::RequestNotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            WorkflowError::InvalidAmount(_) | WorkflowError::Ledger(_) => {
                Self::unprocessable(err.to_string())
            }
            WorkflowError::PartialApproval { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            WorkflowError::Account(account) => account.into(),
            WorkflowError::Store(store) => store.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbridge_core::{LedgerError, RequestStatus};
    use rust_decimal_macros::dec;

    #[test]
    fn test_duplicate_email_maps_to_conflict() {
        let err: ApiError = AccountError::DuplicateEmail("a@x.com".to_string()).into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_invalid_credentials_maps_to_unauthorized() {
        let err: ApiError = AccountError::InvalidCredentials.into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_insufficient_funds_maps_to_unprocessable() {
        let err: ApiError =
            WorkflowError::Ledger(LedgerError::insufficient_funds("BTC", dec!(0.5), dec!(0.6)))
                .into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_resolved_request_maps_to_conflict() {
        let err: ApiError =
            WorkflowError::invalid_transition("req-1", RequestStatus::Approved).into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_version_conflict_maps_to_conflict() {
        let err: ApiError = StoreError::conflict("users", 1, 2).into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_transport_maps_to_bad_gateway() {
        let err: ApiError = StoreError::Transport("refused".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_partial_approval_maps_to_internal_error() {
        let err: ApiError = WorkflowError::PartialApproval {
            request_id: "req-1".to_string(),
            user_id: "user-1".to_string(),
            source: Box::new(WorkflowError::RequestNotFound("req-1".to_string())),
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
