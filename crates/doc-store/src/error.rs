use thiserror::Error;

use crate::{DocRef, Revision};

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// A conditional commit observed a document at a different revision
    /// than the one it was read at.
    #[error("Revision conflict for {doc}: expected {expected:?}, found {actual:?}")]
    RevisionConflict {
        doc: DocRef,
        expected: Option<Revision>,
        actual: Option<Revision>,
    },

    /// The document was not found in the store.
    #[error("Document not found: {0}")]
    NotFound(DocRef),

    /// A document with the same reference already exists.
    #[error("Document already exists: {0}")]
    AlreadyExists(DocRef),

    /// The staged write batch is malformed (empty, or names the same
    /// document more than once).
    #[error("Invalid write batch: {0}")]
    InvalidWriteBatch(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, DocStoreError>;
