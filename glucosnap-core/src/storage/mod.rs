//! Durable key-value storage backing the Persistence Gateway.
//!
//! Each collection lives under a single key as one JSON document. Backends
//! only move strings; parsing belongs to the gateway.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Errors that can occur in a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage backend error: {0}")]
    Backend(String),
}
