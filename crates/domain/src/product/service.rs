//! Catalog CRUD service.

use doc_store::{DocStoreError, DocumentStore};

use crate::activity::ActivityLog;
use crate::error::{DomainError, Result};
use crate::value_objects::{Money, ProductId};

use super::{Product, ProductStatus};

/// Caller-supplied fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub price: Money,
    pub category: String,
    pub stock: u32,
    pub status: ProductStatus,
}

impl ProductInput {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "category",
                reason: "must not be empty".to_string(),
            });
        }
        if self.price.is_negative() {
            return Err(DomainError::Validation {
                field: "price",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }

    fn into_product(self) -> Product {
        Product {
            status: ProductStatus::normalize(self.stock, self.status),
            name: self.name.trim().to_string(),
            price: self.price,
            category: self.category.trim().to_string(),
            stock: self.stock,
        }
    }
}

/// Service for managing the product catalog.
pub struct CatalogService<S> {
    store: S,
    activity: ActivityLog<S>,
}

impl<S: DocumentStore + Clone> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            activity: ActivityLog::new(store.clone()),
            store,
        }
    }

    /// Adds a product to the catalog and returns its ID.
    #[tracing::instrument(skip(self, input))]
    pub async fn add_product(&self, input: ProductInput) -> Result<ProductId> {
        input.validate()?;
        let product = input.into_product();
        let id = ProductId::new();

        self.store
            .create(Product::doc_ref(id), serde_json::to_value(&product)?)
            .await?;

        self.activity
            .record("add_product", format!("Added product {}", product.name))
            .await;
        Ok(id)
    }

    /// Replaces a product's fields.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<()> {
        input.validate()?;
        let product = input.into_product();

        match self
            .store
            .replace(Product::doc_ref(id), serde_json::to_value(&product)?)
            .await
        {
            Ok(_) => {}
            Err(DocStoreError::NotFound(_)) => {
                return Err(DomainError::NotFound {
                    kind: "product",
                    id: id.document_id(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.activity
            .record("update_product", format!("Updated product {}", product.name))
            .await;
        Ok(())
    }

    /// Removes a product from the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        match self.store.delete(&Product::doc_ref(id)).await {
            Ok(()) => {}
            Err(DocStoreError::NotFound(_)) => {
                return Err(DomainError::NotFound {
                    kind: "product",
                    id: id.document_id(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.activity
            .record("delete_product", format!("Deleted product {id}"))
            .await;
        Ok(())
    }

    /// Loads a product by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        match self.store.get(&Product::doc_ref(id)).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Lists the whole catalog, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<(ProductId, Product)>> {
        let docs = self.store.list(Product::COLLECTION).await?;
        docs.iter()
            .map(|doc| Ok((ProductId::from(doc.doc.id), doc.decode()?)))
            .collect()
    }
}
