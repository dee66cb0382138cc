//! Document store client.
//!
//! The platform persists each collection as one whole JSON document in a
//! hosted bin service: every read is a full-document GET of the latest
//! version, every write a full-document PUT. [`DocumentStore`] is the
//! boundary trait so callers never see the transport; [`BinStoreClient`] is
//! the HTTP implementation.
//!
//! # Versioning
//! Documents are wrapped in an envelope `{"version": n, "record": ...}`.
//! Writers pass back the version they read; a mismatch at write time fails
//! with [`StoreError::Conflict`] instead of silently overwriting the other
//! writer. Over a plain PUT endpoint the check is read-then-write, which
//! narrows the lost-update window without closing it.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use blockbridge_core::StoreConfig;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;

// =============================================================================
// Handles
// =============================================================================

/// The named documents that make up the system of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentHandle {
    /// User accounts (with embedded credential hashes).
    Users,
    /// Notifications.
    Notifications,
    /// Funding requests.
    FundingRequests,
    /// Withdrawal requests.
    WithdrawalRequests,
    /// Support-chat messages.
    Messages,
}

impl DocumentHandle {
    /// Returns the handle name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Notifications => "notifications",
            Self::FundingRequests => "funding-requests",
            Self::WithdrawalRequests => "withdrawal-requests",
            Self::Messages => "messages",
        }
    }
}

impl std::fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Versioned documents
// =============================================================================

/// A whole document together with its optimistic-concurrency token.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument {
    /// Monotonic version, incremented on every successful write.
    pub version: u64,
    /// The document body; `Null` for a document never written.
    pub record: Value,
}

impl VersionedDocument {
    /// The state of a document that has never been written.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: 0,
            record: Value::Null,
        }
    }
}

/// On-the-wire envelope carrying the version token alongside the record.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u64,
    record: Value,
}

// =============================================================================
// DocumentStore
// =============================================================================

/// Whole-document persistence boundary.
///
/// Implementations swap freely (hosted bin service, in-memory test double)
/// without leaking the transport to callers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the latest version of the named document.
    ///
    /// A document that has never been written reads back as
    /// [`VersionedDocument::empty`].
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure or a non-2xx response.
    async fn get(&self, handle: DocumentHandle) -> Result<VersionedDocument>;

    /// Replaces the named document, guarded by the version the caller read.
    ///
    /// Returns the new version on success.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if the stored version no longer
    /// equals `expected_version`, or [`StoreError`] on transport failure.
    async fn put(
        &self,
        handle: DocumentHandle,
        record: Value,
        expected_version: u64,
    ) -> Result<u64>;
}

/// Reads and decodes the named document into `T`.
///
/// A never-written document decodes as `T::default()`. Returns the document
/// version for use as the write token of this read-modify-write cycle.
///
/// # Errors
/// Returns [`StoreError::Schema`] if the stored record does not match `T`.
pub async fn fetch<T>(store: &dyn DocumentStore, handle: DocumentHandle) -> Result<(T, u64)>
where
    T: DeserializeOwned + Default,
{
    let doc = store.get(handle).await?;
    if doc.record.is_null() {
        return Ok((T::default(), doc.version));
    }
    let value = serde_json::from_value(doc.record)
        .map_err(|e| StoreError::Schema(format!("{handle}: {e}")))?;
    Ok((value, doc.version))
}

/// Encodes `value` and writes it as the named document.
///
/// # Errors
/// Returns [`StoreError::Conflict`] on a version mismatch, or
/// [`StoreError`] on transport/serialization failure.
pub async fn store_record<T>(
    store: &dyn DocumentStore,
    handle: DocumentHandle,
    value: &T,
    expected_version: u64,
) -> Result<u64>
where
    T: Serialize,
{
    let record = serde_json::to_value(value)?;
    store.put(handle, record, expected_version).await
}

// =============================================================================
// BinStoreClient
// =============================================================================

/// Raw read response from the bin service, which wraps the stored record
/// with its own metadata.
#[derive(Debug, Deserialize)]
struct BinReadResponse {
    record: Value,
}

/// HTTP client for the hosted JSON-bin service.
///
/// All requests are rate-limited and authenticated with the two static API
/// keys from configuration.
pub struct BinStoreClient {
    /// Store configuration (base URL, keys, bin ids).
    config: StoreConfig,

    /// HTTP client.
    http: Client,

    /// Rate limiter.
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for BinStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinStoreClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl BinStoreClient {
    /// Creates a new client from store configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the rate limit
    /// is zero.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build HTTP client: {e}")))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            StoreError::Configuration("requests_per_minute must be nonzero".to_string())
        })?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    fn bin_id(&self, handle: DocumentHandle) -> Result<&str> {
        let bins = &self.config.bins;
        let id = match handle {
            DocumentHandle::Users => &bins.users,
            DocumentHandle::Notifications => &bins.notifications,
            DocumentHandle::FundingRequests => &bins.funding_requests,
            DocumentHandle::WithdrawalRequests => &bins.withdrawal_requests,
            DocumentHandle::Messages => &bins.messages,
        };
        if id.is_empty() {
            return Err(StoreError::Configuration(format!(
                "no bin id configured for {handle}"
            )));
        }
        Ok(id)
    }

    /// Unwraps the version envelope, tolerating documents written before the
    /// envelope existed (they read as version 0).
    fn unwrap_envelope(record: Value) -> VersionedDocument {
        if record.is_null() {
            return VersionedDocument::empty();
        }
        match serde_json::from_value::<Envelope>(record.clone()) {
            Ok(envelope) => VersionedDocument {
                version: envelope.version,
                record: envelope.record,
            },
            Err(_) => VersionedDocument { version: 0, record },
        }
    }
}

#[async_trait]
impl DocumentStore for BinStoreClient {
    async fn get(&self, handle: DocumentHandle) -> Result<VersionedDocument> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/b/{}/latest", self.config.base_url, self.bin_id(handle)?);

        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Master-Key", self.config.master_key.expose_secret())
            .header("X-Access-Key", self.config.access_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            // A bin with no content yet reads as an empty document.
            return Ok(VersionedDocument::empty());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::api(status.as_u16(), text));
        }

        let body: BinReadResponse = response.json().await?;
        Ok(Self::unwrap_envelope(body.record))
    }

    async fn put(
        &self,
        handle: DocumentHandle,
        record: Value,
        expected_version: u64,
    ) -> Result<u64> {
        // Read-check-write: reject the write if someone else won the race
        // since our read. Not atomic over a plain PUT endpoint.
        let current = self.get(handle).await?;
        if current.version != expected_version {
            return Err(StoreError::conflict(
                handle.as_str(),
                expected_version,
                current.version,
            ));
        }

        self.rate_limiter.until_ready().await;

        let url = format!("{}/b/{}", self.config.base_url, self.bin_id(handle)?);
        let new_version = expected_version + 1;
        let envelope = Envelope {
            version: new_version,
            record,
        };

        tracing::debug!("PUT {} version={}", url, new_version);

        let response = self
            .http
            .put(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("X-Master-Key", self.config.master_key.expose_secret())
            .header("X-Access-Key", self.config.access_key.expose_secret())
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::api(status.as_u16(), text));
        }

        Ok(new_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbridge_core::BinConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> StoreConfig {
        StoreConfig {
            base_url,
            master_key: "test-master".to_string().into(),
            access_key: "test-access".to_string().into(),
            requests_per_minute: 600,
            timeout_secs: 5,
            bins: BinConfig {
                users: "bin-users".to_string(),
                notifications: "bin-notifications".to_string(),
                funding_requests: "bin-funding".to_string(),
                withdrawal_requests: "bin-withdrawals".to_string(),
                messages: "bin-messages".to_string(),
            },
        }
    }

    fn test_client(server: &MockServer) -> BinStoreClient {
        BinStoreClient::new(test_config(server.uri())).unwrap()
    }

    #[test]
    fn test_handle_names() {
        assert_eq!(DocumentHandle::Users.as_str(), "users");
        assert_eq!(DocumentHandle::FundingRequests.as_str(), "funding-requests");
    }

    #[test]
    fn test_unwrap_envelope_versioned() {
        let doc = BinStoreClient::unwrap_envelope(json!({
            "version": 7,
            "record": {"users": []}
        }));
        assert_eq!(doc.version, 7);
        assert_eq!(doc.record, json!({"users": []}));
    }

    #[test]
    fn test_unwrap_envelope_legacy_record() {
        // Documents written before the envelope read as version 0.
        let doc = BinStoreClient::unwrap_envelope(json!([{"id": "r1"}]));
        assert_eq!(doc.version, 0);
        assert_eq!(doc.record, json!([{"id": "r1"}]));
    }

    #[test]
    fn test_unwrap_envelope_null() {
        assert_eq!(
            BinStoreClient::unwrap_envelope(Value::Null),
            VersionedDocument::empty()
        );
    }

    #[tokio::test]
    async fn test_get_sends_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin-users/latest"))
            .and(header("X-Master-Key", "test-master"))
            .and(header("X-Access-Key", "test-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "record": {"version": 2, "record": {"users": []}},
                "metadata": {"id": "bin-users"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let doc = client.get(DocumentHandle::Users).await.unwrap();

        assert_eq!(doc.version, 2);
        assert_eq!(doc.record, json!({"users": []}));
    }

    #[tokio::test]
    async fn test_get_missing_bin_reads_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin-messages/latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let doc = client.get(DocumentHandle::Messages).await.unwrap();
        assert_eq!(doc, VersionedDocument::empty());
    }

    #[tokio::test]
    async fn test_get_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin-users/latest"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get(DocumentHandle::Users).await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status_code: 500, .. }));
    }

    #[tokio::test]
    async fn test_put_writes_incremented_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin-users/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "record": {"version": 3, "record": {"users": []}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/b/bin-users"))
            .and(body_partial_json(json!({"version": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"record": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let version = client
            .put(DocumentHandle::Users, json!({"users": []}), 3)
            .await
            .unwrap();
        assert_eq!(version, 4);
    }

    #[tokio::test]
    async fn test_put_stale_version_conflicts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin-users/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "record": {"version": 5, "record": {"users": []}}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .put(DocumentHandle::Users, json!({"users": []}), 3)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: 3,
                actual: 5,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_bin_id_is_configuration_error() {
        let server = MockServer::start().await;
        let mut config = test_config(server.uri());
        config.bins.users = String::new();

        let client = BinStoreClient::new(config).unwrap();
        let err = client.get(DocumentHandle::Users).await.unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_fetch_decodes_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin-notifications/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "record": {"version": 1, "record": ["a", "b"]}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let (items, version): (Vec<String>, u64) =
            fetch(&client, DocumentHandle::Notifications).await.unwrap();

        assert_eq!(items, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn test_fetch_shape_mismatch_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin-notifications/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "record": {"version": 1, "record": {"not": "a list"}}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = fetch::<Vec<String>>(&client, DocumentHandle::Notifications)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
    }
}
