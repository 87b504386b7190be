//! Quote service: submission facade plus the approval workflow.

use chrono::Utc;
use doc_store::{DocStoreError, DocumentStore};
use domain::{ActivityLog, Buyer, Customer, CustomerId, DomainError, Quote, QuoteId, QuoteStatus};

use crate::committer::{CommittedQuote, QuoteCommitter};
use crate::directory::CustomerDirectory;
use crate::error::{QuotingError, Result};
use crate::plan::LineItemRequest;

fn validate_contact(contact: &Customer) -> Result<()> {
    for (field, value) in [
        ("name", &contact.name),
        ("email", &contact.email),
        ("phone", &contact.phone),
        ("address", &contact.address),
    ] {
        if value.trim().is_empty() {
            return Err(QuotingError::Domain(DomainError::Validation {
                field,
                reason: "must not be empty".to_string(),
            }));
        }
    }
    Ok(())
}

/// High-level API for creating quotes and driving the approval workflow.
pub struct QuoteService<S> {
    committer: QuoteCommitter<S>,
    directory: CustomerDirectory<S>,
    activity: ActivityLog<S>,
    store: S,
}

impl<S: DocumentStore + Clone> QuoteService<S> {
    /// Creates a quote service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            committer: QuoteCommitter::new(store.clone()),
            directory: CustomerDirectory::new(store.clone()),
            activity: ActivityLog::new(store.clone()),
            store,
        }
    }

    /// Returns the underlying committer.
    pub fn committer(&self) -> &QuoteCommitter<S> {
        &self.committer
    }

    /// Submits a quote: resolves the buyer, then commits atomically.
    ///
    /// When no customer ID is supplied the buyer is looked up (or created)
    /// by email first. A resolution failure is logged and the quote is
    /// committed without a buyer id rather than blocking the sale.
    #[tracing::instrument(skip(self, contact, requests))]
    pub async fn submit_quote(
        &self,
        customer_id: Option<CustomerId>,
        contact: Customer,
        requests: &[LineItemRequest],
    ) -> Result<CommittedQuote> {
        validate_contact(&contact)?;

        let buyer_id = match customer_id {
            Some(id) => Some(id),
            None => match self.directory.resolve(&contact).await {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "customer resolution failed; committing quote without a buyer id");
                    None
                }
            },
        };

        let buyer = Buyer {
            id: buyer_id,
            contact: contact.trimmed(),
        };

        let committed = self.committer.commit_quote(buyer, requests).await?;
        self.activity
            .record(
                "create_quote",
                format!("Created quote for {}", committed.quote.buyer.contact.name),
            )
            .await;
        Ok(committed)
    }

    /// Accepts a Pending quote, stamping `accepted_at`.
    ///
    /// Non-transactional field update, last write wins.
    #[tracing::instrument(skip(self))]
    pub async fn accept_quote(&self, id: QuoteId) -> Result<Quote> {
        let mut quote = self.load(id).await?;
        if !quote.status.can_accept() {
            return Err(QuotingError::InvalidStatusTransition {
                current: quote.status,
                attempted: QuoteStatus::Accepted,
            });
        }

        quote.status = QuoteStatus::Accepted;
        quote.accepted_at = Some(Utc::now());
        self.persist(id, &quote).await?;

        self.activity
            .record("accept_quote", format!("Accepted quote {id}"))
            .await;
        Ok(quote)
    }

    /// Rejects a Pending quote, stamping `rejected_at` and keeping the
    /// trimmed reason when one was given.
    ///
    /// Stock is not restored on rejection: decrement happens on request,
    /// not on acceptance.
    #[tracing::instrument(skip(self, reason))]
    pub async fn reject_quote(&self, id: QuoteId, reason: Option<String>) -> Result<Quote> {
        let mut quote = self.load(id).await?;
        if !quote.status.can_reject() {
            return Err(QuotingError::InvalidStatusTransition {
                current: quote.status,
                attempted: QuoteStatus::Rejected,
            });
        }

        quote.status = QuoteStatus::Rejected;
        quote.rejected_at = Some(Utc::now());
        quote.rejection_reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self.persist(id, &quote).await?;

        self.activity
            .record("reject_quote", format!("Rejected quote {id}"))
            .await;
        Ok(quote)
    }

    /// Loads a quote by ID, or None.
    #[tracing::instrument(skip(self))]
    pub async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>> {
        match self.store.get(&Quote::doc_ref(id)).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    async fn load(&self, id: QuoteId) -> Result<Quote> {
        self.get_quote(id)
            .await?
            .ok_or(QuotingError::QuoteNotFound(id))
    }

    async fn persist(&self, id: QuoteId, quote: &Quote) -> Result<()> {
        match self
            .store
            .replace(Quote::doc_ref(id), serde_json::to_value(quote)?)
            .await
        {
            Ok(_) => Ok(()),
            Err(DocStoreError::NotFound(_)) => Err(QuotingError::QuoteNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}
