use doc_store::DocStoreError;
use thiserror::Error;

/// Errors that can occur while building read-side views.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// Document store error.
    #[error("Document store error: {0}")]
    DocStore(#[from] DocStoreError),

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while finalizing an export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reporting operations.
pub type Result<T> = std::result::Result<T, ReportingError>;
