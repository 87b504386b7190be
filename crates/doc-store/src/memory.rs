use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    DocRef, DocStoreError, Document, Result, Revision,
    store::{DocumentStore, DocumentStream, RevisionGuard, TxSnapshot, WriteOp, validate_writes},
};

/// In-memory document store implementation.
///
/// Used for tests and as the default runtime store. All documents live in
/// one map behind a single lock, so a conditional commit is atomic with
/// respect to every other operation.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    docs: Arc<RwLock<HashMap<DocRef, Document>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of documents across all collections.
    pub async fn document_count(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Clears all documents.
    pub async fn clear(&self) {
        self.docs.write().await.clear();
    }

    fn sorted_collection(docs: &HashMap<DocRef, Document>, collection: &str) -> Vec<Document> {
        let mut documents: Vec<_> = docs
            .values()
            .filter(|d| d.doc.collection == collection)
            .cloned()
            .collect();
        documents.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.doc.id.as_uuid().cmp(&b.doc.id.as_uuid()))
        });
        documents
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>> {
        Ok(self.docs.read().await.get(doc).cloned())
    }

    async fn get_many(&self, refs: &[DocRef]) -> Result<TxSnapshot> {
        // One lock hold gives the whole batch a single point in time.
        let docs = self.docs.read().await;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(refs.len());
        for doc in refs {
            if !seen.insert(doc.clone()) {
                continue;
            }
            entries.push((doc.clone(), docs.get(doc).cloned()));
        }

        Ok(TxSnapshot::new(entries))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let docs = self.docs.read().await;
        Ok(Self::sorted_collection(&docs, collection))
    }

    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream> {
        use futures_util::stream;

        let docs = self.docs.read().await;
        let documents = Self::sorted_collection(&docs, collection);
        Ok(Box::pin(stream::iter(documents.into_iter().map(Ok))))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Option<Document>> {
        let docs = self.docs.read().await;
        let found = Self::sorted_collection(&docs, collection)
            .into_iter()
            .find(|d| d.body.get(field) == Some(value));
        Ok(found)
    }

    async fn create(&self, doc: DocRef, body: serde_json::Value) -> Result<Document> {
        let mut docs = self.docs.write().await;

        if docs.contains_key(&doc) {
            return Err(DocStoreError::AlreadyExists(doc));
        }

        let now = Utc::now();
        let document = Document {
            doc: doc.clone(),
            revision: Revision::first(),
            created_at: now,
            updated_at: now,
            body,
        };
        docs.insert(doc, document.clone());
        Ok(document)
    }

    async fn replace(&self, doc: DocRef, body: serde_json::Value) -> Result<Document> {
        let mut docs = self.docs.write().await;

        let existing = docs
            .get_mut(&doc)
            .ok_or_else(|| DocStoreError::NotFound(doc.clone()))?;
        existing.revision = existing.revision.next();
        existing.updated_at = Utc::now();
        existing.body = body;
        Ok(existing.clone())
    }

    async fn delete(&self, doc: &DocRef) -> Result<()> {
        let mut docs = self.docs.write().await;
        docs.remove(doc)
            .map(|_| ())
            .ok_or_else(|| DocStoreError::NotFound(doc.clone()))
    }

    async fn commit_conditional(
        &self,
        guards: Vec<RevisionGuard>,
        writes: Vec<WriteOp>,
    ) -> Result<()> {
        validate_writes(&writes)?;

        // One write lock across check and apply makes the commit atomic.
        let mut docs = self.docs.write().await;

        for guard in &guards {
            let actual = docs.get(&guard.doc).map(|d| d.revision);
            if actual != guard.revision {
                return Err(DocStoreError::RevisionConflict {
                    doc: guard.doc.clone(),
                    expected: guard.revision,
                    actual,
                });
            }
        }

        // Check every write target up front so the batch can never be
        // half-applied.
        for write in &writes {
            match write {
                WriteOp::Create { doc, .. } => {
                    if docs.contains_key(doc) {
                        return Err(DocStoreError::AlreadyExists(doc.clone()));
                    }
                }
                WriteOp::Replace { doc, .. } | WriteOp::Delete { doc } => {
                    if !docs.contains_key(doc) {
                        return Err(DocStoreError::NotFound(doc.clone()));
                    }
                }
            }
        }

        let now = Utc::now();
        for write in writes {
            match write {
                WriteOp::Create { doc, body } => {
                    docs.insert(
                        doc.clone(),
                        Document {
                            doc,
                            revision: Revision::first(),
                            created_at: now,
                            updated_at: now,
                            body,
                        },
                    );
                }
                WriteOp::Replace { doc, body } => {
                    if let Some(existing) = docs.get_mut(&doc) {
                        existing.revision = existing.revision.next();
                        existing.updated_at = now;
                        existing.body = body;
                    }
                }
                WriteOp::Delete { doc } => {
                    docs.remove(&doc);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::DocumentId;
    use futures_util::StreamExt;

    use super::*;
    use crate::store::DocumentStoreExt;

    fn product_ref() -> DocRef {
        DocRef::new("products", DocumentId::new())
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let store = InMemoryDocumentStore::new();
        let doc = product_ref();

        let created = store
            .create(doc.clone(), serde_json::json!({"name": "Widget"}))
            .await
            .unwrap();
        assert_eq!(created.revision, Revision::first());

        let fetched = store.get(&doc).await.unwrap().unwrap();
        assert_eq!(fetched.body["name"], "Widget");
        assert_eq!(fetched.revision, Revision::first());
    }

    #[tokio::test]
    async fn create_twice_fails() {
        let store = InMemoryDocumentStore::new();
        let doc = product_ref();

        store
            .create(doc.clone(), serde_json::json!({}))
            .await
            .unwrap();
        let result = store.create(doc, serde_json::json!({})).await;
        assert!(matches!(result, Err(DocStoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn replace_bumps_revision() {
        let store = InMemoryDocumentStore::new();
        let doc = product_ref();

        store
            .create(doc.clone(), serde_json::json!({"stock": 5}))
            .await
            .unwrap();
        let replaced = store
            .replace(doc.clone(), serde_json::json!({"stock": 4}))
            .await
            .unwrap();

        assert_eq!(replaced.revision, Revision::new(2));
        assert_eq!(replaced.body["stock"], 4);
    }

    #[tokio::test]
    async fn replace_missing_fails() {
        let store = InMemoryDocumentStore::new();
        let result = store.replace(product_ref(), serde_json::json!({})).await;
        assert!(matches!(result, Err(DocStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_many_records_absent_documents() {
        let store = InMemoryDocumentStore::new();
        let present = product_ref();
        let absent = product_ref();
        store
            .create(present.clone(), serde_json::json!({}))
            .await
            .unwrap();

        let snapshot = store
            .get_many(&[present.clone(), absent.clone()])
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get(&present).is_some());
        assert!(snapshot.was_read(&absent));
        assert!(snapshot.get(&absent).is_none());
    }

    #[tokio::test]
    async fn get_many_deduplicates_refs() {
        let store = InMemoryDocumentStore::new();
        let doc = product_ref();
        store
            .create(doc.clone(), serde_json::json!({}))
            .await
            .unwrap();

        let snapshot = store.get_many(&[doc.clone(), doc.clone()]).await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn commit_applies_all_writes() {
        let store = InMemoryDocumentStore::new();
        let product = product_ref();
        let quote = DocRef::new("quotes", DocumentId::new());
        store
            .create(product.clone(), serde_json::json!({"stock": 5}))
            .await
            .unwrap();

        let snapshot = store.get_many(std::slice::from_ref(&product)).await.unwrap();
        store
            .commit_conditional(
                snapshot.guards(),
                vec![
                    WriteOp::Replace {
                        doc: product.clone(),
                        body: serde_json::json!({"stock": 3}),
                    },
                    WriteOp::Create {
                        doc: quote.clone(),
                        body: serde_json::json!({"total": 200}),
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            store.get_existing(&product).await.unwrap().body["stock"],
            3
        );
        assert!(store.exists(&quote).await.unwrap());
    }

    #[tokio::test]
    async fn commit_with_stale_guard_fails_and_applies_nothing() {
        let store = InMemoryDocumentStore::new();
        let product = product_ref();
        let quote = DocRef::new("quotes", DocumentId::new());
        store
            .create(product.clone(), serde_json::json!({"stock": 5}))
            .await
            .unwrap();

        let snapshot = store.get_many(std::slice::from_ref(&product)).await.unwrap();

        // A rival write lands after our read.
        store
            .replace(product.clone(), serde_json::json!({"stock": 1}))
            .await
            .unwrap();

        let result = store
            .commit_conditional(
                snapshot.guards(),
                vec![
                    WriteOp::Replace {
                        doc: product.clone(),
                        body: serde_json::json!({"stock": 3}),
                    },
                    WriteOp::Create {
                        doc: quote.clone(),
                        body: serde_json::json!({}),
                    },
                ],
            )
            .await;

        assert!(matches!(
            result,
            Err(DocStoreError::RevisionConflict { .. })
        ));
        assert_eq!(
            store.get_existing(&product).await.unwrap().body["stock"],
            1
        );
        assert!(!store.exists(&quote).await.unwrap());
    }

    #[tokio::test]
    async fn commit_guards_absence() {
        let store = InMemoryDocumentStore::new();
        let doc = product_ref();

        // Read while absent, then a rival creates it.
        let snapshot = store.get_many(std::slice::from_ref(&doc)).await.unwrap();
        store
            .create(doc.clone(), serde_json::json!({}))
            .await
            .unwrap();

        let result = store
            .commit_conditional(
                snapshot.guards(),
                vec![WriteOp::Create {
                    doc: doc.clone(),
                    body: serde_json::json!({}),
                }],
            )
            .await;

        assert!(matches!(
            result,
            Err(DocStoreError::RevisionConflict { .. })
        ));
    }

    #[tokio::test]
    async fn find_by_field_matches_exactly_one() {
        let store = InMemoryDocumentStore::new();
        store
            .create(
                DocRef::new("customers", DocumentId::new()),
                serde_json::json!({"email": "a@example.com"}),
            )
            .await
            .unwrap();
        store
            .create(
                DocRef::new("customers", DocumentId::new()),
                serde_json::json!({"email": "b@example.com"}),
            )
            .await
            .unwrap();

        let found = store
            .find_by_field("customers", "email", &serde_json::json!("b@example.com"))
            .await
            .unwrap();
        assert_eq!(found.unwrap().body["email"], "b@example.com");

        let missing = store
            .find_by_field("customers", "email", &serde_json::json!("c@example.com"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_is_scoped_to_collection() {
        let store = InMemoryDocumentStore::new();
        store
            .create(product_ref(), serde_json::json!({}))
            .await
            .unwrap();
        store
            .create(DocRef::new("quotes", DocumentId::new()), serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(store.list("products").await.unwrap().len(), 1);
        assert_eq!(store.list("quotes").await.unwrap().len(), 1);
        assert_eq!(store.list("customers").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn stream_collection_yields_all_documents() {
        let store = InMemoryDocumentStore::new();
        for i in 0..3 {
            store
                .create(product_ref(), serde_json::json!({"n": i}))
                .await
                .unwrap();
        }

        let stream = store.stream_collection("products").await.unwrap();
        let documents: Vec<_> = stream.collect().await;
        assert_eq!(documents.len(), 3);
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = InMemoryDocumentStore::new();
        let doc = product_ref();
        store
            .create(doc.clone(), serde_json::json!({}))
            .await
            .unwrap();

        store.delete(&doc).await.unwrap();
        assert!(!store.exists(&doc).await.unwrap());

        let again = store.delete(&doc).await;
        assert!(matches!(again, Err(DocStoreError::NotFound(_))));
    }
}
