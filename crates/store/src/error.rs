//! Error types for document store access.

use thiserror::Error;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Store responded with a non-2xx status.
    #[error("store API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body or status text.
        message: String,
    },

    /// The document's version no longer matches the one read at the start of
    /// the read-modify-write cycle; a concurrent writer got there first.
    #[error("version conflict on {handle}: expected {expected}, found {actual}")]
    Conflict {
        /// Document handle.
        handle: String,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Stored document did not match the expected shape.
    #[error("schema error: {0}")]
    Schema(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Client misconfiguration (missing bin id, bad rate limit, ...).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a version conflict error.
    pub fn conflict(handle: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::Conflict {
            handle: handle.into(),
            expected,
            actual,
        }
    }

    /// Returns true if retrying the whole read-modify-write cycle could
    /// succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) | Self::Conflict { .. } => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Schema(err.to_string())
        } else if err.is_connect() {
            Self::Transport(format!("connection failed: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_construction() {
        let err = StoreError::api(502, "bad gateway");
        assert!(matches!(err, StoreError::Api { status_code: 502, .. }));
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_conflict_error_display() {
        let err = StoreError::conflict("users", 3, 5);
        let display = err.to_string();
        assert!(display.contains("users"));
        assert!(display.contains("expected 3"));
        assert!(display.contains("found 5"));
    }

    #[test]
    fn test_transport_is_transient() {
        assert!(StoreError::Transport("refused".to_string()).is_transient());
        assert!(StoreError::Timeout("slow".to_string()).is_transient());
    }

    #[test]
    fn test_conflict_is_transient() {
        assert!(StoreError::conflict("users", 1, 2).is_transient());
    }

    #[test]
    fn test_server_error_is_transient() {
        assert!(StoreError::api(503, "unavailable").is_transient());
        assert!(!StoreError::api(404, "missing").is_transient());
    }

    #[test]
    fn test_schema_error_is_not_transient() {
        assert!(!StoreError::Schema("bad shape".to_string()).is_transient());
        assert!(!StoreError::Configuration("no bin".to_string()).is_transient());
    }
}
