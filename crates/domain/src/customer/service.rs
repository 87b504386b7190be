//! Customer CRUD service.

use doc_store::{DocStoreError, DocumentStore};

use crate::activity::ActivityLog;
use crate::error::{DomainError, Result};
use crate::value_objects::CustomerId;

use super::Customer;

fn validate(customer: &Customer) -> Result<()> {
    if customer.name.trim().is_empty() {
        return Err(DomainError::Validation {
            field: "name",
            reason: "must not be empty".to_string(),
        });
    }
    if customer.email.trim().is_empty() {
        return Err(DomainError::Validation {
            field: "email",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Service for managing customer records.
pub struct CustomerService<S> {
    store: S,
    activity: ActivityLog<S>,
}

impl<S: DocumentStore + Clone> CustomerService<S> {
    /// Creates a new customer service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            activity: ActivityLog::new(store.clone()),
            store,
        }
    }

    /// Adds a customer and returns the new ID.
    #[tracing::instrument(skip(self, customer))]
    pub async fn add_customer(&self, customer: Customer) -> Result<CustomerId> {
        validate(&customer)?;
        let customer = customer.trimmed();
        let id = CustomerId::new();

        self.store
            .create(Customer::doc_ref(id), serde_json::to_value(&customer)?)
            .await?;

        self.activity
            .record("add_customer", format!("Added customer {}", customer.name))
            .await;
        Ok(id)
    }

    /// Replaces a customer's fields.
    #[tracing::instrument(skip(self, customer))]
    pub async fn update_customer(&self, id: CustomerId, customer: Customer) -> Result<()> {
        validate(&customer)?;
        let customer = customer.trimmed();

        match self
            .store
            .replace(Customer::doc_ref(id), serde_json::to_value(&customer)?)
            .await
        {
            Ok(_) => {}
            Err(DocStoreError::NotFound(_)) => {
                return Err(DomainError::NotFound {
                    kind: "customer",
                    id: id.document_id(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.activity
            .record(
                "update_customer",
                format!("Updated customer {}", customer.name),
            )
            .await;
        Ok(())
    }

    /// Removes a customer record.
    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        match self.store.delete(&Customer::doc_ref(id)).await {
            Ok(()) => {}
            Err(DocStoreError::NotFound(_)) => {
                return Err(DomainError::NotFound {
                    kind: "customer",
                    id: id.document_id(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.activity
            .record("delete_customer", format!("Deleted customer {id}"))
            .await;
        Ok(())
    }

    /// Loads a customer by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        match self.store.get(&Customer::doc_ref(id)).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Lists all customers, sorted by name.
    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<(CustomerId, Customer)>> {
        let docs = self.store.list(Customer::COLLECTION).await?;
        let mut customers: Vec<(CustomerId, Customer)> = docs
            .iter()
            .map(|doc| Ok((CustomerId::from(doc.doc.id), doc.decode()?)))
            .collect::<Result<_>>()?;
        customers.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(customers)
    }

    /// Finds the customer with the given email, if any.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<(CustomerId, Customer)>> {
        let found = self
            .store
            .find_by_field(
                Customer::COLLECTION,
                "email",
                &serde_json::Value::String(email.trim().to_string()),
            )
            .await?;

        match found {
            Some(doc) => Ok(Some((CustomerId::from(doc.doc.id), doc.decode()?))),
            None => Ok(None),
        }
    }
}
