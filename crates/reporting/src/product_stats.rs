//! Catalog analytics summary.

use std::collections::BTreeMap;

use doc_store::DocumentStore;
use domain::{Product, ProductId, ProductStatus};
use serde::Serialize;

use crate::Result;

/// Per-category rollup of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub product_count: usize,
    pub stock_units: u64,
}

/// A product flagged as running low.
#[derive(Debug, Clone, Serialize)]
pub struct LowStockProduct {
    pub id: ProductId,
    pub name: String,
    pub stock: u32,
}

/// Aggregated catalog numbers for the analytics screen.
#[derive(Debug, Clone, Serialize)]
pub struct ProductStats {
    pub total_products: usize,
    pub total_stock_units: u64,
    pub available: usize,
    pub out_of_stock: usize,
    pub discontinued: usize,
    /// Sorted by product count, largest category first.
    pub categories: Vec<CategoryBreakdown>,
    /// Products at or below the threshold, emptiest first.
    pub low_stock: Vec<LowStockProduct>,
}

/// Read-side view over the product collection.
pub struct ProductStatsView<S> {
    store: S,
}

impl<S: DocumentStore> ProductStatsView<S> {
    /// Creates a view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Builds the catalog summary.
    #[tracing::instrument(skip(self))]
    pub async fn summarize(&self, low_stock_threshold: u32) -> Result<ProductStats> {
        let docs = self.store.list(Product::COLLECTION).await?;

        let mut stats = ProductStats {
            total_products: 0,
            total_stock_units: 0,
            available: 0,
            out_of_stock: 0,
            discontinued: 0,
            categories: vec![],
            low_stock: vec![],
        };
        let mut by_category: BTreeMap<String, (usize, u64)> = BTreeMap::new();

        for doc in &docs {
            let product: Product = doc.decode()?;

            stats.total_products += 1;
            stats.total_stock_units += u64::from(product.stock);
            match product.status {
                ProductStatus::Available => stats.available += 1,
                ProductStatus::OutOfStock => stats.out_of_stock += 1,
                ProductStatus::Discontinued => stats.discontinued += 1,
            }

            let entry = by_category.entry(product.category.clone()).or_default();
            entry.0 += 1;
            entry.1 += u64::from(product.stock);

            if product.stock <= low_stock_threshold {
                stats.low_stock.push(LowStockProduct {
                    id: ProductId::from(doc.doc.id),
                    name: product.name,
                    stock: product.stock,
                });
            }
        }

        stats.categories = by_category
            .into_iter()
            .map(|(category, (product_count, stock_units))| CategoryBreakdown {
                category,
                product_count,
                stock_units,
            })
            .collect();
        stats
            .categories
            .sort_by(|a, b| b.product_count.cmp(&a.product_count));
        stats.low_stock.sort_by_key(|p| p.stock);

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use doc_store::{DocumentStore, InMemoryDocumentStore};
    use domain::Money;

    use super::*;

    async fn seed_product(
        store: &InMemoryDocumentStore,
        name: &str,
        category: &str,
        stock: u32,
        status: ProductStatus,
    ) {
        let product = Product {
            name: name.to_string(),
            price: Money::from_cents(1000),
            category: category.to_string(),
            stock,
            status,
        };
        store
            .create(
                Product::doc_ref(ProductId::new()),
                serde_json::to_value(&product).unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn summarize_counts_and_groups() {
        let store = InMemoryDocumentStore::new();
        seed_product(&store, "Widget", "Tools", 10, ProductStatus::Available).await;
        seed_product(&store, "Gadget", "Tools", 0, ProductStatus::OutOfStock).await;
        seed_product(&store, "Gizmo", "Parts", 3, ProductStatus::Discontinued).await;

        let stats = ProductStatsView::new(store).summarize(5).await.unwrap();

        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.total_stock_units, 13);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.discontinued, 1);

        assert_eq!(stats.categories.len(), 2);
        assert_eq!(stats.categories[0].category, "Tools");
        assert_eq!(stats.categories[0].product_count, 2);
        assert_eq!(stats.categories[0].stock_units, 10);
    }

    #[tokio::test]
    async fn low_stock_sorted_emptiest_first() {
        let store = InMemoryDocumentStore::new();
        seed_product(&store, "Widget", "Tools", 4, ProductStatus::Available).await;
        seed_product(&store, "Gadget", "Tools", 0, ProductStatus::OutOfStock).await;
        seed_product(&store, "Gizmo", "Tools", 50, ProductStatus::Available).await;

        let stats = ProductStatsView::new(store).summarize(5).await.unwrap();

        assert_eq!(stats.low_stock.len(), 2);
        assert_eq!(stats.low_stock[0].name, "Gadget");
        assert_eq!(stats.low_stock[1].name, "Widget");
    }

    #[tokio::test]
    async fn summarize_empty_catalog() {
        let store = InMemoryDocumentStore::new();
        let stats = ProductStatsView::new(store).summarize(5).await.unwrap();
        assert_eq!(stats.total_products, 0);
        assert!(stats.categories.is_empty());
        assert!(stats.low_stock.is_empty());
    }
}
