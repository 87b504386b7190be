use std::collections::HashSet;
use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{DocRef, DocStoreError, Document, Result, Revision};

/// A staged write, produced inside a transaction attempt and applied only
/// by a successful commit.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Creates a new document; fails if the reference is already taken.
    Create {
        doc: DocRef,
        body: serde_json::Value,
    },

    /// Replaces an existing document's body, bumping its revision.
    Replace {
        doc: DocRef,
        body: serde_json::Value,
    },

    /// Removes a document.
    Delete { doc: DocRef },
}

impl WriteOp {
    /// Returns the document this write targets.
    pub fn doc(&self) -> &DocRef {
        match self {
            WriteOp::Create { doc, .. } | WriteOp::Replace { doc, .. } | WriteOp::Delete { doc } => {
                doc
            }
        }
    }
}

/// Precondition for a conditional commit: the document must still be at
/// the given revision (`None` means it must still be absent).
#[derive(Debug, Clone)]
pub struct RevisionGuard {
    pub doc: DocRef,
    pub revision: Option<Revision>,
}

/// Point-in-time view of a batched read.
///
/// Records, for every reference in the read set, the document observed —
/// or its absence. The snapshot's guards pin the exact revisions seen, so
/// a commit built from it fails if any of them moved in the meantime.
#[derive(Debug, Clone, Default)]
pub struct TxSnapshot {
    entries: Vec<(DocRef, Option<Document>)>,
}

impl TxSnapshot {
    /// Builds a snapshot from read results, in read order.
    pub fn new(entries: Vec<(DocRef, Option<Document>)>) -> Self {
        Self { entries }
    }

    /// Returns the document observed for a reference, if it existed.
    pub fn get(&self, doc: &DocRef) -> Option<&Document> {
        self.entries
            .iter()
            .find(|(d, _)| d == doc)
            .and_then(|(_, document)| document.as_ref())
    }

    /// Returns true if the reference was part of the read set.
    pub fn was_read(&self, doc: &DocRef) -> bool {
        self.entries.iter().any(|(d, _)| d == doc)
    }

    /// Returns the revision guards pinning every read to what was observed.
    pub fn guards(&self) -> Vec<RevisionGuard> {
        self.entries
            .iter()
            .map(|(doc, document)| RevisionGuard {
                doc: doc.clone(),
                revision: document.as_ref().map(|d| d.revision),
            })
            .collect()
    }

    /// Number of references in the read set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the read set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A stream of documents from one collection.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<Document>> + Send>>;

/// Core trait for document store implementations.
///
/// A document store persists JSON documents addressed by collection + id,
/// each carrying a revision for optimistic concurrency control. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a single document.
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>>;

    /// Reads a set of documents in one batched, point-in-time read.
    ///
    /// Duplicate references are read once. Missing documents are recorded
    /// in the snapshot so their absence can be guarded at commit time.
    async fn get_many(&self, refs: &[DocRef]) -> Result<TxSnapshot>;

    /// Lists all documents in a collection, oldest first.
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// Streams all documents in a collection, oldest first.
    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream>;

    /// Finds at most one document whose body field equals the given value.
    ///
    /// When several match, the oldest wins.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Option<Document>>;

    /// Creates a document at revision 1. Fails with `AlreadyExists` if the
    /// reference is taken.
    async fn create(&self, doc: DocRef, body: serde_json::Value) -> Result<Document>;

    /// Replaces a document's body, bumping its revision. Last write wins;
    /// fails with `NotFound` if the document is absent.
    async fn replace(&self, doc: DocRef, body: serde_json::Value) -> Result<Document>;

    /// Deletes a document. Fails with `NotFound` if it is absent.
    async fn delete(&self, doc: &DocRef) -> Result<()>;

    /// Atomically applies a batch of writes, but only if every guarded
    /// document is still at its observed revision.
    ///
    /// On any guard mismatch the whole batch is discarded and
    /// `RevisionConflict` is returned; partial application is impossible.
    async fn commit_conditional(
        &self,
        guards: Vec<RevisionGuard>,
        writes: Vec<WriteOp>,
    ) -> Result<()>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Reads a document, failing with `NotFound` if it is absent.
    async fn get_existing(&self, doc: &DocRef) -> Result<Document> {
        self.get(doc)
            .await?
            .ok_or_else(|| DocStoreError::NotFound(doc.clone()))
    }

    /// Returns true if the document exists.
    async fn exists(&self, doc: &DocRef) -> Result<bool> {
        Ok(self.get(doc).await?.is_some())
    }

    /// Counts the documents in a collection.
    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.list(collection).await?.len())
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Validates a staged write batch before committing.
///
/// A batch naming the same document twice is rejected: the second write
/// would silently clobber the first.
pub fn validate_writes(writes: &[WriteOp]) -> Result<()> {
    if writes.is_empty() {
        return Err(DocStoreError::InvalidWriteBatch(
            "cannot commit an empty write batch".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for write in writes {
        if !seen.insert(write.doc().clone()) {
            return Err(DocStoreError::InvalidWriteBatch(format!(
                "write batch names {} more than once",
                write.doc()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::DocumentId;

    fn make_document(doc: DocRef, revision: i64) -> Document {
        Document {
            doc,
            revision: Revision::new(revision),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            body: serde_json::json!({}),
        }
    }

    #[test]
    fn snapshot_guards_pin_observed_revisions() {
        let present = DocRef::new("products", DocumentId::new());
        let absent = DocRef::new("products", DocumentId::new());

        let snapshot = TxSnapshot::new(vec![
            (present.clone(), Some(make_document(present.clone(), 3))),
            (absent.clone(), None),
        ]);

        let guards = snapshot.guards();
        assert_eq!(guards.len(), 2);
        assert_eq!(guards[0].revision, Some(Revision::new(3)));
        assert_eq!(guards[1].revision, None);
        assert!(snapshot.was_read(&absent));
        assert!(snapshot.get(&absent).is_none());
        assert!(snapshot.get(&present).is_some());
    }

    #[test]
    fn validate_writes_rejects_empty_batch() {
        assert!(matches!(
            validate_writes(&[]),
            Err(DocStoreError::InvalidWriteBatch(_))
        ));
    }

    #[test]
    fn validate_writes_rejects_duplicate_targets() {
        let doc = DocRef::new("products", DocumentId::new());
        let writes = vec![
            WriteOp::Replace {
                doc: doc.clone(),
                body: serde_json::json!({"stock": 4}),
            },
            WriteOp::Replace {
                doc,
                body: serde_json::json!({"stock": 2}),
            },
        ];

        assert!(matches!(
            validate_writes(&writes),
            Err(DocStoreError::InvalidWriteBatch(_))
        ));
    }

    #[test]
    fn validate_writes_accepts_distinct_targets() {
        let writes = vec![
            WriteOp::Replace {
                doc: DocRef::new("products", DocumentId::new()),
                body: serde_json::json!({}),
            },
            WriteOp::Create {
                doc: DocRef::new("quotes", DocumentId::new()),
                body: serde_json::json!({}),
            },
        ];

        assert!(validate_writes(&writes).is_ok());
    }
}
