pub mod client;
pub mod error;
pub mod memory;

pub use client::{
    fetch, store_record, BinStoreClient, DocumentHandle, DocumentStore, VersionedDocument,
};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
