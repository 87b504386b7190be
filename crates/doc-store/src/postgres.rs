use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    DocRef, DocStoreError, Document, DocumentId, Result, Revision,
    store::{DocumentStore, DocumentStream, RevisionGuard, TxSnapshot, WriteOp, validate_writes},
};

/// PostgreSQL-backed document store implementation.
///
/// Documents are rows in a single `documents` table, keyed by
/// (collection, id), with the JSON body in a JSONB column and the
/// revision checked under row locks for conditional commits.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            doc: DocRef::new(
                row.try_get::<String, _>("collection")?,
                DocumentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            ),
            revision: Revision::new(row.try_get("revision")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            body: row.try_get("body")?,
        })
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT collection, id, revision, created_at, updated_at, body
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(&doc.collection)
        .bind(doc.id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn get_many(&self, refs: &[DocRef]) -> Result<TxSnapshot> {
        let mut seen = HashSet::new();
        let unique: Vec<DocRef> = refs
            .iter()
            .filter(|doc| seen.insert((*doc).clone()))
            .cloned()
            .collect();

        if unique.is_empty() {
            return Ok(TxSnapshot::new(vec![]));
        }

        let collections: Vec<String> = unique.iter().map(|d| d.collection.clone()).collect();
        let ids: Vec<Uuid> = unique.iter().map(|d| d.id.as_uuid()).collect();

        let rows = sqlx::query(
            r#"
            SELECT d.collection, d.id, d.revision, d.created_at, d.updated_at, d.body
            FROM documents d
            JOIN UNNEST($1::text[], $2::uuid[]) AS r(collection, id)
              ON d.collection = r.collection AND d.id = r.id
            "#,
        )
        .bind(&collections)
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut found: HashMap<DocRef, Document> = HashMap::with_capacity(rows.len());
        for row in rows {
            let document = Self::row_to_document(row)?;
            found.insert(document.doc.clone(), document);
        }

        let entries = unique
            .into_iter()
            .map(|doc| {
                let document = found.remove(&doc);
                (doc, document)
            })
            .collect();

        Ok(TxSnapshot::new(entries))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            r#"
            SELECT collection, id, revision, created_at, updated_at, body
            FROM documents
            WHERE collection = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream> {
        use futures_util::StreamExt;

        let stream = sqlx::query(
            r#"
            SELECT collection, id, revision, created_at, updated_at, body
            FROM documents
            WHERE collection = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection.to_string())
        .fetch(&self.pool)
        .map(|result| match result {
            Ok(row) => Self::row_to_document(row),
            Err(e) => Err(DocStoreError::Database(e)),
        });

        Ok(Box::pin(stream))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT collection, id, revision, created_at, updated_at, body
            FROM documents
            WHERE collection = $1 AND body -> $2::text = $3
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn create(&self, doc: DocRef, body: serde_json::Value) -> Result<Document> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, revision, created_at, updated_at, body)
            VALUES ($1, $2, 1, $3, $3, $4)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(&doc.collection)
        .bind(doc.id.as_uuid())
        .bind(now)
        .bind(&body)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::AlreadyExists(doc));
        }

        Ok(Document {
            doc,
            revision: Revision::first(),
            created_at: now,
            updated_at: now,
            body,
        })
    }

    async fn replace(&self, doc: DocRef, body: serde_json::Value) -> Result<Document> {
        let row = sqlx::query(
            r#"
            UPDATE documents
            SET revision = revision + 1, updated_at = $3, body = $4
            WHERE collection = $1 AND id = $2
            RETURNING collection, id, revision, created_at, updated_at, body
            "#,
        )
        .bind(&doc.collection)
        .bind(doc.id.as_uuid())
        .bind(Utc::now())
        .bind(&body)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_document(row),
            None => Err(DocStoreError::NotFound(doc)),
        }
    }

    async fn delete(&self, doc: &DocRef) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(&doc.collection)
            .bind(doc.id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::NotFound(doc.clone()));
        }

        Ok(())
    }

    async fn commit_conditional(
        &self,
        guards: Vec<RevisionGuard>,
        writes: Vec<WriteOp>,
    ) -> Result<()> {
        validate_writes(&writes)?;

        let mut tx = self.pool.begin().await?;

        // Lock and check every guarded row; dropping the transaction on a
        // mismatch rolls everything back.
        for guard in &guards {
            let revision: Option<i64> = sqlx::query_scalar(
                "SELECT revision FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
            )
            .bind(&guard.doc.collection)
            .bind(guard.doc.id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;

            let actual = revision.map(Revision::new);
            if actual != guard.revision {
                return Err(DocStoreError::RevisionConflict {
                    doc: guard.doc.clone(),
                    expected: guard.revision,
                    actual,
                });
            }
        }

        let now = Utc::now();
        for write in &writes {
            match write {
                WriteOp::Create { doc, body } => {
                    let result = sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, revision, created_at, updated_at, body)
                        VALUES ($1, $2, 1, $3, $3, $4)
                        ON CONFLICT (collection, id) DO NOTHING
                        "#,
                    )
                    .bind(&doc.collection)
                    .bind(doc.id.as_uuid())
                    .bind(now)
                    .bind(body)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        return Err(DocStoreError::AlreadyExists(doc.clone()));
                    }
                }
                WriteOp::Replace { doc, body } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE documents
                        SET revision = revision + 1, updated_at = $3, body = $4
                        WHERE collection = $1 AND id = $2
                        "#,
                    )
                    .bind(&doc.collection)
                    .bind(doc.id.as_uuid())
                    .bind(now)
                    .bind(body)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        return Err(DocStoreError::NotFound(doc.clone()));
                    }
                }
                WriteOp::Delete { doc } => {
                    let result =
                        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                            .bind(&doc.collection)
                            .bind(doc.id.as_uuid())
                            .execute(&mut *tx)
                            .await?;

                    if result.rows_affected() == 0 {
                        return Err(DocStoreError::NotFound(doc.clone()));
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
