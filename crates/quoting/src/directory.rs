//! Customer directory: lookup-or-create by email.
//!
//! Runs strictly before the quote commit transaction and shares none of
//! its atomicity. A crash between customer creation and quote commit
//! leaves an orphan customer record, which is an acceptable outcome:
//! customers are independently useful records.

use doc_store::DocumentStore;
use domain::{Customer, CustomerId};

use crate::error::{QuotingError, Result};

/// Resolves a buyer to a customer record keyed by email.
pub struct CustomerDirectory<S> {
    store: S,
}

impl<S: DocumentStore> CustomerDirectory<S> {
    /// Creates a directory over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the ID of the customer with the candidate's email, creating
    /// the record if none exists.
    ///
    /// An existing match returns its ID unchanged — stored fields are not
    /// updated even when the candidate info differs.
    #[tracing::instrument(skip(self, candidate), fields(email = %candidate.email))]
    pub async fn resolve(&self, candidate: &Customer) -> Result<CustomerId> {
        let candidate = candidate.trimmed();
        if candidate.email.is_empty() {
            return Err(QuotingError::CustomerResolution(
                "email must not be empty".to_string(),
            ));
        }

        let found = self
            .store
            .find_by_field(
                Customer::COLLECTION,
                "email",
                &serde_json::Value::String(candidate.email.clone()),
            )
            .await
            .map_err(|e| QuotingError::CustomerResolution(e.to_string()))?;

        if let Some(doc) = found {
            return Ok(CustomerId::from(doc.doc.id));
        }

        let id = CustomerId::new();
        self.store
            .create(Customer::doc_ref(id), serde_json::to_value(&candidate)?)
            .await
            .map_err(|e| QuotingError::CustomerResolution(e.to_string()))?;

        tracing::info!(%id, "created customer from quote submission");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use doc_store::{DocumentStore, InMemoryDocumentStore};

    use super::*;

    fn candidate(name: &str, email: &str) -> Customer {
        Customer {
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            address: "12 Analytical Row".to_string(),
        }
    }

    #[tokio::test]
    async fn creates_when_missing() {
        let store = InMemoryDocumentStore::new();
        let directory = CustomerDirectory::new(store.clone());

        let id = directory
            .resolve(&candidate("Ada", "ada@example.com"))
            .await
            .unwrap();

        let stored = store.get(&Customer::doc_ref(id)).await.unwrap().unwrap();
        assert_eq!(stored.body["name"], "Ada");
    }

    #[tokio::test]
    async fn returns_existing_id_without_updating_fields() {
        let store = InMemoryDocumentStore::new();
        let directory = CustomerDirectory::new(store.clone());

        let first = directory
            .resolve(&candidate("Ada", "ada@example.com"))
            .await
            .unwrap();
        let second = directory
            .resolve(&candidate("Ada Lovelace", "ada@example.com"))
            .await
            .unwrap();

        assert_eq!(first, second);

        // The differing candidate name did not overwrite the record.
        let stored = store.get(&Customer::doc_ref(first)).await.unwrap().unwrap();
        assert_eq!(stored.body["name"], "Ada");
    }

    #[tokio::test]
    async fn email_is_trimmed_before_matching() {
        let store = InMemoryDocumentStore::new();
        let directory = CustomerDirectory::new(store);

        let first = directory
            .resolve(&candidate("Ada", "ada@example.com"))
            .await
            .unwrap();
        let second = directory
            .resolve(&candidate("Ada", "  ada@example.com  "))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn blank_email_is_an_error() {
        let directory = CustomerDirectory::new(InMemoryDocumentStore::new());
        let result = directory.resolve(&candidate("Ada", "   ")).await;
        assert!(matches!(result, Err(QuotingError::CustomerResolution(_))));
    }
}
