//! Error types for Kinship Core

use crate::id::NodeId;
use crate::limits::ValidationError;
use crate::node::Label;
use thiserror::Error;

/// Result type alias using Kinship's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kinship error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("{label} not found: {id}")]
    NotFound { label: Label, id: NodeId },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot relate {0} to itself")]
    SelfRelation(NodeId),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(label: Label, id: NodeId) -> Self {
        Self::NotFound { label, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
