mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Object already exists: {0}")]
    AlreadyExists(String),
}

/// Abstraction over where uploaded assets live.
/// Keys are bare file names below the uploads directory.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` only if the key is unused.
    ///
    /// Claiming the key and creating the object is one step, so two callers
    /// can never both succeed for the same key. A taken key yields
    /// [`ObjectStoreError::AlreadyExists`].
    async fn put_new(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError>;
    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError>;
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
}
