use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{DocumentId, Result};

/// Revision number for a document, used for optimistic concurrency control.
///
/// A freshly created document is at revision 1; every replace increments
/// the revision by 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(i64);

impl Revision {
    /// Creates a revision from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the revision assigned to a freshly created document.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next revision.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw revision value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Revision {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Revision> for i64 {
    fn from(revision: Revision) -> Self {
        revision.0
    }
}

/// Address of a document: a collection name plus a document ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocRef {
    /// The collection the document lives in (e.g. "products", "quotes").
    pub collection: String,

    /// The document's identifier within the collection.
    pub id: DocumentId,
}

impl DocRef {
    /// Creates a document reference.
    pub fn new(collection: impl Into<String>, id: DocumentId) -> Self {
        Self {
            collection: collection.into(),
            id,
        }
    }
}

impl std::fmt::Display for DocRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document: its address, revision, timestamps, and JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The document's address.
    pub doc: DocRef,

    /// Current revision, incremented on every write.
    pub revision: Revision,

    /// When the document was created.
    pub created_at: DateTime<Utc>,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,

    /// The document body as JSON.
    pub body: serde_json::Value,
}

impl Document {
    /// Deserializes the document body into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_first_and_next() {
        assert_eq!(Revision::first().as_i64(), 1);
        assert_eq!(Revision::first().next(), Revision::new(2));
        assert!(Revision::first() < Revision::first().next());
    }

    #[test]
    fn doc_ref_display() {
        let id = DocumentId::new();
        let doc = DocRef::new("products", id);
        assert_eq!(doc.to_string(), format!("products/{id}"));
    }

    #[test]
    fn document_decode() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Payload {
            name: String,
        }

        let document = Document {
            doc: DocRef::new("things", DocumentId::new()),
            revision: Revision::first(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            body: serde_json::json!({"name": "widget"}),
        };

        let payload: Payload = document.decode().unwrap();
        assert_eq!(payload.name, "widget");
    }

    #[test]
    fn document_decode_rejects_wrong_shape() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Payload {
            count: u32,
        }

        let document = Document {
            doc: DocRef::new("things", DocumentId::new()),
            revision: Revision::first(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            body: serde_json::json!({"name": "widget"}),
        };

        assert!(document.decode::<Payload>().is_err());
    }
}
