//! In-memory document store.
//!
//! Backs tests and local development. Unlike the HTTP client, the version
//! check here is a genuine compare-and-swap under a lock.

use crate::client::{DocumentHandle, DocumentStore, VersionedDocument};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// Lock-guarded in-process document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<DocumentHandle, VersionedDocument>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document at version 1, replacing any existing content.
    pub fn seed(&self, handle: DocumentHandle, record: Value) {
        self.docs
            .lock()
            .insert(handle, VersionedDocument { version: 1, record });
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, handle: DocumentHandle) -> Result<VersionedDocument> {
        Ok(self
            .docs
            .lock()
            .get(&handle)
            .cloned()
            .unwrap_or_else(VersionedDocument::empty))
    }

    async fn put(
        &self,
        handle: DocumentHandle,
        record: Value,
        expected_version: u64,
    ) -> Result<u64> {
        let mut docs = self.docs.lock();
        let current = docs.get(&handle).map_or(0, |d| d.version);
        if current != expected_version {
            return Err(StoreError::conflict(
                handle.as_str(),
                expected_version,
                current,
            ));
        }
        let new_version = expected_version + 1;
        docs.insert(
            handle,
            VersionedDocument {
                version: new_version,
                record,
            },
        );
        Ok(new_version)
    }
}
