//! Quoting error types.

use doc_store::{DocStoreError, TransactionError};
use domain::{DomainError, ProductId, QuoteId, QuoteStatus};
use thiserror::Error;

/// Errors that can occur while committing or transitioning quotes.
#[derive(Debug, Error)]
pub enum QuotingError {
    /// The submission carried no line items.
    #[error("Quote must contain at least one line item")]
    EmptyQuote,

    /// A line item requested a non-positive quantity.
    #[error("Invalid quantity {quantity} for product {product}")]
    InvalidQuantity { product: ProductId, quantity: u32 },

    /// The same product appeared in more than one line item.
    #[error("Product {0} appears in more than one line item")]
    DuplicateLineItem(ProductId),

    /// A referenced product document does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A line item asked for more units than are on hand.
    #[error("{name} is out of stock. Requested: {requested}, available: {available}")]
    InsufficientStock {
        product: ProductId,
        name: String,
        requested: u32,
        available: u32,
    },

    /// The commit transaction lost every retry to concurrent writers.
    #[error("Transaction conflict: gave up after {attempts} attempts")]
    TransactionConflict { attempts: u32 },

    /// The quote does not exist.
    #[error("Quote not found: {0}")]
    QuoteNotFound(QuoteId),

    /// A status transition from a non-Pending quote was attempted.
    #[error("Quote is {current}; only Pending quotes can become {attempted}")]
    InvalidStatusTransition {
        current: QuoteStatus,
        attempted: QuoteStatus,
    },

    /// Customer lookup-or-create failed.
    #[error("Customer resolution failed: {0}")]
    CustomerResolution(String),

    /// Document store error.
    #[error("Document store error: {0}")]
    DocStore(#[from] DocStoreError),

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TransactionError<QuotingError>> for QuotingError {
    fn from(e: TransactionError<QuotingError>) -> Self {
        match e {
            TransactionError::Aborted(e) => e,
            TransactionError::Conflict { attempts } => {
                QuotingError::TransactionConflict { attempts }
            }
            TransactionError::Store(e) => QuotingError::DocStore(e),
        }
    }
}

/// Convenience type alias for quoting results.
pub type Result<T> = std::result::Result<T, QuotingError>;
