pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod tx;

pub use common::DocumentId;
pub use document::{DocRef, Document, Revision};
pub use error::{DocStoreError, Result};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use store::{
    DocumentStore, DocumentStoreExt, DocumentStream, RevisionGuard, TxSnapshot, WriteOp,
    validate_writes,
};
pub use tx::{TransactionError, TransactionOptions, TransactionRunner};
