//! Optimistic transaction runner.
//!
//! Owns the read → plan → conditional-commit retry loop. The planning
//! closure is pure over the snapshot it is handed: every retry re-runs the
//! full read-validate-apply sequence against fresh reads, never a stale
//! decision from a previous attempt.

use thiserror::Error;

use crate::{DocRef, DocStoreError, DocumentStore, TxSnapshot, WriteOp};

/// Options controlling transaction execution.
#[derive(Debug, Clone)]
pub struct TransactionOptions {
    /// Maximum number of attempts before giving up with a conflict.
    pub max_attempts: u32,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

/// Errors surfaced by the transaction runner.
#[derive(Debug, Error)]
pub enum TransactionError<E: std::error::Error> {
    /// The planning closure rejected the transaction; no side effects.
    #[error(transparent)]
    Aborted(E),

    /// Every attempt lost a revision race against concurrent commits.
    #[error("Transaction conflict: retries exhausted after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// The store failed for a reason other than a revision race.
    #[error("Document store error: {0}")]
    Store(#[from] DocStoreError),
}

/// Runs read-validate-apply transactions with optimistic retry.
///
/// Each attempt takes one batched, point-in-time read of the given
/// references, hands the snapshot to the planning closure, and commits the
/// staged writes guarded by the revisions observed. A `RevisionConflict`
/// on commit triggers a retry from the read; any other failure is final.
pub struct TransactionRunner<S> {
    store: S,
    options: TransactionOptions,
}

impl<S: DocumentStore> TransactionRunner<S> {
    /// Creates a runner with the default retry limit.
    pub fn new(store: S) -> Self {
        Self::with_options(store, TransactionOptions::default())
    }

    /// Creates a runner with explicit options.
    pub fn with_options(store: S, options: TransactionOptions) -> Self {
        Self { store, options }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Executes the transaction.
    ///
    /// `plan` must stage all writes from the snapshot alone. An `Err` from
    /// `plan` aborts the transaction with no side effects. A plan staging
    /// no writes commits nothing and returns its value directly.
    pub async fn run<T, E, F>(&self, refs: &[DocRef], mut plan: F) -> Result<T, TransactionError<E>>
    where
        E: std::error::Error,
        F: FnMut(&TxSnapshot) -> Result<(Vec<WriteOp>, T), E>,
    {
        let attempts = self.options.max_attempts.max(1);

        for attempt in 1..=attempts {
            let snapshot = self.store.get_many(refs).await?;
            let (writes, value) = plan(&snapshot).map_err(TransactionError::Aborted)?;

            if writes.is_empty() {
                return Ok(value);
            }

            match self
                .store
                .commit_conditional(snapshot.guards(), writes)
                .await
            {
                Ok(()) => return Ok(value),
                Err(DocStoreError::RevisionConflict { doc, .. }) => {
                    metrics::counter!("doc_store_tx_conflicts_total").increment(1);
                    tracing::debug!(%doc, attempt, "transaction lost a revision race, retrying");
                }
                Err(e) => return Err(TransactionError::Store(e)),
            }
        }

        metrics::counter!("doc_store_tx_exhausted_total").increment(1);
        Err(TransactionError::Conflict { attempts })
    }
}
