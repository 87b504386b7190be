//! The quote committer: atomic validate-decrement-persist.

use std::collections::HashSet;

use chrono::Utc;
use doc_store::{DocRef, DocumentStore, TransactionOptions, TransactionRunner};
use domain::{Buyer, Product, Quote, QuoteId};

use crate::error::{QuotingError, Result};
use crate::plan::{LineItemRequest, plan_commit};

/// A successfully committed quote.
#[derive(Debug, Clone)]
pub struct CommittedQuote {
    pub id: QuoteId,
    pub quote: Quote,
}

/// Commits quotes as a single atomic transaction.
///
/// Each commit reads every referenced product in one batched read,
/// validates stock for every line, stages the decrements plus the new
/// quote document, and commits them together. Either all effects apply or
/// none do; a lost revision race against a concurrent committer is
/// retried by the transaction runner from a fresh read.
pub struct QuoteCommitter<S> {
    runner: TransactionRunner<S>,
}

impl<S: DocumentStore> QuoteCommitter<S> {
    /// Creates a committer with the default retry limit.
    pub fn new(store: S) -> Self {
        Self {
            runner: TransactionRunner::new(store),
        }
    }

    /// Creates a committer with explicit transaction options.
    pub fn with_options(store: S, options: TransactionOptions) -> Self {
        Self {
            runner: TransactionRunner::with_options(store, options),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        self.runner.store()
    }

    fn check_requests(requests: &[LineItemRequest]) -> Result<()> {
        if requests.is_empty() {
            return Err(QuotingError::EmptyQuote);
        }

        let mut seen = HashSet::new();
        for request in requests {
            if request.quantity == 0 {
                return Err(QuotingError::InvalidQuantity {
                    product: request.product_id,
                    quantity: request.quantity,
                });
            }
            if !seen.insert(request.product_id) {
                return Err(QuotingError::DuplicateLineItem(request.product_id));
            }
        }

        Ok(())
    }

    /// Commits a quote for the buyer.
    ///
    /// Guarantees: no quote is persisted referencing a line whose stock
    /// was insufficient at commit time, and partial application (some
    /// products decremented but no quote, or vice versa) is impossible.
    #[tracing::instrument(skip(self, buyer, requests), fields(lines = requests.len()))]
    pub async fn commit_quote(
        &self,
        buyer: Buyer,
        requests: &[LineItemRequest],
    ) -> Result<CommittedQuote> {
        Self::check_requests(requests)?;

        metrics::counter!("quote_commit_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let refs: Vec<DocRef> = requests
            .iter()
            .map(|r| Product::doc_ref(r.product_id))
            .collect();

        let result = self
            .runner
            .run(&refs, |snapshot| {
                let plan = plan_commit(snapshot, &buyer, requests, Utc::now())?;
                Ok((plan.writes, (plan.quote_id, plan.quote)))
            })
            .await;

        match result {
            Ok((id, quote)) => {
                metrics::histogram!("quote_commit_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                metrics::counter!("quote_commits_total").increment(1);
                tracing::info!(quote_id = %id, total = %quote.total_amount, "quote committed");
                Ok(CommittedQuote { id, quote })
            }
            Err(e) => {
                metrics::counter!("quote_commit_failures_total").increment(1);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use doc_store::InMemoryDocumentStore;
    use domain::{Customer, ProductId};

    use super::*;

    fn buyer() -> Buyer {
        Buyer {
            id: None,
            contact: Customer {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-0100".to_string(),
                address: "12 Analytical Row".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let committer = QuoteCommitter::new(InMemoryDocumentStore::new());
        let result = committer.commit_quote(buyer(), &[]).await;
        assert!(matches!(result, Err(QuotingError::EmptyQuote)));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let committer = QuoteCommitter::new(InMemoryDocumentStore::new());
        let result = committer
            .commit_quote(buyer(), &[LineItemRequest::new(ProductId::new(), 0)])
            .await;
        assert!(matches!(result, Err(QuotingError::InvalidQuantity { .. })));
    }

    #[tokio::test]
    async fn duplicate_product_lines_are_rejected() {
        let committer = QuoteCommitter::new(InMemoryDocumentStore::new());
        let id = ProductId::new();
        let result = committer
            .commit_quote(
                buyer(),
                &[LineItemRequest::new(id, 1), LineItemRequest::new(id, 2)],
            )
            .await;
        assert!(matches!(result, Err(QuotingError::DuplicateLineItem(p)) if p == id));
    }
}
