//! Quote analytics summary.

use std::collections::BTreeMap;

use doc_store::DocumentStore;
use domain::{Money, Quote, QuoteId, QuoteStatus};
use serde::Serialize;

use crate::Result;
use crate::quote_list::QuoteRecord;

/// Aggregated quote numbers for the analytics screen.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteStats {
    pub total_quotes: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,

    /// Value of all quotes, whatever their status.
    pub total_value: Money,

    /// Value of accepted quotes only.
    pub accepted_value: Money,

    /// Quoted value per calendar month ("YYYY-MM"), oldest first.
    pub monthly_totals: BTreeMap<String, Money>,
}

/// Read-side view over the quote collection.
pub struct QuoteStatsView<S> {
    store: S,
}

impl<S: DocumentStore> QuoteStatsView<S> {
    /// Creates a view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Builds the quote summary.
    #[tracing::instrument(skip(self))]
    pub async fn summarize(&self) -> Result<QuoteStats> {
        let docs = self.store.list(Quote::COLLECTION).await?;

        let mut stats = QuoteStats {
            total_quotes: 0,
            pending: 0,
            accepted: 0,
            rejected: 0,
            total_value: Money::zero(),
            accepted_value: Money::zero(),
            monthly_totals: BTreeMap::new(),
        };

        for doc in &docs {
            let quote: Quote = doc.decode()?;

            stats.total_quotes += 1;
            stats.total_value += quote.total_amount;
            match quote.status {
                QuoteStatus::Pending => stats.pending += 1,
                QuoteStatus::Accepted => {
                    stats.accepted += 1;
                    stats.accepted_value += quote.total_amount;
                }
                QuoteStatus::Rejected => stats.rejected += 1,
            }

            let month = quote.created_at.format("%Y-%m").to_string();
            *stats.monthly_totals.entry(month).or_insert(Money::zero()) += quote.total_amount;
        }

        Ok(stats)
    }

    /// Returns the most recently created quotes, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn recent(&self, limit: usize) -> Result<Vec<QuoteRecord>> {
        let docs = self.store.list(Quote::COLLECTION).await?;

        let mut records = Vec::with_capacity(docs.len());
        for doc in &docs {
            records.push(QuoteRecord {
                id: QuoteId::from(doc.doc.id),
                quote: doc.decode()?,
            });
        }

        records.sort_by(|a, b| b.quote.created_at.cmp(&a.quote.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use doc_store::{DocumentStore, InMemoryDocumentStore};
    use domain::{Buyer, Customer, ProductId};

    use super::*;

    async fn seed_quote(
        store: &InMemoryDocumentStore,
        status: QuoteStatus,
        total_cents: i64,
        created_at: chrono::DateTime<Utc>,
    ) {
        let quote = Quote {
            buyer: Buyer {
                id: None,
                contact: Customer {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    phone: "555-0100".to_string(),
                    address: "12 Analytical Row".to_string(),
                },
            },
            items: vec![domain::LineItem {
                product_id: ProductId::new(),
                name: "Widget".to_string(),
                category: "Tools".to_string(),
                unit_price: Money::from_cents(total_cents),
                quantity: 1,
            }],
            total_amount: Money::from_cents(total_cents),
            status,
            created_at,
            accepted_at: None,
            rejected_at: None,
            rejection_reason: None,
        };
        store
            .create(
                Quote::doc_ref(QuoteId::new()),
                serde_json::to_value(&quote).unwrap(),
            )
            .await
            .unwrap();
    }

    fn at(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn summarize_counts_values_and_months() {
        let store = InMemoryDocumentStore::new();
        seed_quote(&store, QuoteStatus::Pending, 10_000, at(2024, 1, 5)).await;
        seed_quote(&store, QuoteStatus::Accepted, 20_000, at(2024, 1, 20)).await;
        seed_quote(&store, QuoteStatus::Rejected, 5_000, at(2024, 2, 1)).await;

        let stats = QuoteStatsView::new(store).summarize().await.unwrap();

        assert_eq!(stats.total_quotes, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.total_value.cents(), 35_000);
        assert_eq!(stats.accepted_value.cents(), 20_000);

        assert_eq!(stats.monthly_totals.len(), 2);
        assert_eq!(stats.monthly_totals["2024-01"].cents(), 30_000);
        assert_eq!(stats.monthly_totals["2024-02"].cents(), 5_000);
    }

    #[tokio::test]
    async fn recent_returns_newest_first_up_to_limit() {
        let store = InMemoryDocumentStore::new();
        seed_quote(&store, QuoteStatus::Pending, 100, at(2024, 1, 1)).await;
        seed_quote(&store, QuoteStatus::Pending, 200, at(2024, 3, 1)).await;
        seed_quote(&store, QuoteStatus::Pending, 300, at(2024, 2, 1)).await;

        let recent = QuoteStatsView::new(store).recent(2).await.unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].quote.total_amount.cents(), 200);
        assert_eq!(recent[1].quote.total_amount.cents(), 300);
    }

    #[tokio::test]
    async fn summarize_empty_collection() {
        let store = InMemoryDocumentStore::new();
        let stats = QuoteStatsView::new(store).summarize().await.unwrap();
        assert_eq!(stats.total_quotes, 0);
        assert!(stats.total_value.is_zero());
        assert!(stats.monthly_totals.is_empty());
    }
}
