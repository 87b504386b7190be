//! Domain error types.

use common::DocumentId;
use doc_store::DocStoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    DocStore(#[from] DocStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        kind: &'static str,
        id: DocumentId,
    },

    /// Input failed validation.
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
