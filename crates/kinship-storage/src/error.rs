//! Storage error types

use kinship_core::{Label, NodeId, RelationshipKey};
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{label} not found: {id}")]
    MissingNode { label: Label, id: NodeId },

    #[error("Duplicate node identifier: {0}")]
    DuplicateNode(NodeId),

    #[error("Relationship endpoint does not exist: {0}")]
    DanglingRelationship(RelationshipKey),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[cfg(feature = "redb")]
    #[error("ReDB error: {0}")]
    Redb(#[from] ::redb::Error),

    #[cfg(feature = "redb")]
    #[error("ReDB database error: {0}")]
    RedbDatabase(#[from] ::redb::DatabaseError),

    #[cfg(feature = "redb")]
    #[error("ReDB table error: {0}")]
    RedbTable(#[from] ::redb::TableError),

    #[cfg(feature = "redb")]
    #[error("ReDB storage error: {0}")]
    RedbStorage(#[from] ::redb::StorageError),

    #[cfg(feature = "redb")]
    #[error("ReDB commit error: {0}")]
    RedbCommit(#[from] ::redb::CommitError),

    #[cfg(feature = "redb")]
    #[error("ReDB transaction error: {0}")]
    RedbTransaction(#[from] ::redb::TransactionError),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] ::rusqlite::Error),
}

impl From<StorageError> for kinship_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissingNode { label, id } => Self::NotFound { label, id },
            StorageError::DuplicateNode(id) => {
                Self::Conflict(format!("node identifier already in use: {}", id))
            }
            StorageError::Serialization(e) => Self::Serialization(e),
            other => Self::Storage(other.to_string()),
        }
    }
}
