//! Append-only activity log.
//!
//! Every successful mutation leaves a short audit trail entry. Writing the
//! entry is best-effort: a failure is logged and never blocks the mutation
//! that triggered it.

use chrono::{DateTime, Utc};
use common::DocumentId;
use doc_store::{DocRef, DocumentStore};
use serde::{Deserialize, Serialize};

use crate::Result;

/// One audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Machine-readable action tag (e.g. "add_product", "create_quote").
    pub action: String,

    /// Human-readable description.
    pub description: String,

    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Collection the activity log lives in.
    pub const COLLECTION: &'static str = "activity_log";
}

/// Writes audit entries to the activity log collection.
#[derive(Clone)]
pub struct ActivityLog<S> {
    store: S,
}

impl<S: DocumentStore> ActivityLog<S> {
    /// Creates an activity log over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Records an entry. Failures are logged, not surfaced.
    pub async fn record(&self, action: &str, description: impl Into<String>) {
        let entry = ActivityEntry {
            action: action.to_string(),
            description: description.into(),
            recorded_at: Utc::now(),
        };

        let body = match serde_json::to_value(&entry) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, action, "could not serialize activity entry");
                return;
            }
        };

        let doc = DocRef::new(ActivityEntry::COLLECTION, DocumentId::new());
        if let Err(e) = self.store.create(doc, body).await {
            tracing::warn!(error = %e, action, "could not record activity entry");
        }
    }

    /// Returns the most recent entries, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ActivityEntry>> {
        let mut entries: Vec<ActivityEntry> = self
            .store
            .list(ActivityEntry::COLLECTION)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect::<doc_store::Result<_>>()?;
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        entries.truncate(limit);
        Ok(entries)
    }
}
