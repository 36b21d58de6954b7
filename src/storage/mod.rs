//! Record Store: the persisted, insertion-ordered sequence of page records.

pub mod db;
pub mod json_file;
pub mod models;
mod tables;

pub use db::RedbStore;
pub use json_file::JsonFileStore;
pub use models::PageRecord;
pub use tables::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted document exists but does not hold a sequence of page records.
    #[error("Corrupt store at {location}: {reason}")]
    Corrupt { location: String, reason: String },
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl StoreError {
    pub fn corrupt(location: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Corrupt {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(e: redb::CommitError) -> Self {
        StoreError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(e: redb::DatabaseError) -> Self {
        StoreError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for StoreError {
    fn from(e: redb::Error) -> Self {
        StoreError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(e: redb::StorageError) -> Self {
        StoreError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        StoreError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        StoreError::Transaction(Box::new(e))
    }
}

/// Read-all / write-all access to the page records.
///
/// Implementations keep insertion order. None of them isolate a caller's
/// `load_all` from its later `replace_all`: two callers interleaving those
/// steps lose one of the updates.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every stored record in insertion order; empty when nothing was persisted yet.
    async fn load_all(&self) -> Result<Vec<PageRecord>, StoreError>;

    /// Append one record to the persisted sequence.
    async fn append_and_save(&self, record: &PageRecord) -> Result<(), StoreError>;

    /// Overwrite the persisted sequence with exactly `records`.
    async fn replace_all(&self, records: &[PageRecord]) -> Result<(), StoreError>;
}
