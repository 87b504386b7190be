//! Quote listing with the filters the review screen offers.

use chrono::NaiveDate;
use doc_store::DocumentStore;
use domain::{Quote, QuoteId, QuoteStatus};
use serde::Serialize;

use crate::Result;

/// A quote together with its identifier.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteRecord {
    pub id: QuoteId,
    #[serde(flatten)]
    pub quote: Quote,
}

/// Filter over the quote collection.
///
/// All criteria are conjunctive; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Keep only quotes with this status.
    pub status: Option<QuoteStatus>,

    /// Case-insensitive substring match on the buyer's name.
    pub search: Option<String>,

    /// Keep only quotes created on this calendar day (UTC).
    pub date: Option<NaiveDate>,
}

impl QuoteFilter {
    /// Creates an empty filter matching all quotes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a status.
    pub fn status(mut self, status: QuoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to buyer names containing the term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restricts to quotes created on the given day.
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Returns true if the quote passes every criterion.
    pub fn matches(&self, quote: &Quote) -> bool {
        if let Some(status) = self.status
            && quote.status != status
        {
            return false;
        }
        if let Some(ref term) = self.search
            && !quote
                .buyer
                .contact
                .name
                .to_lowercase()
                .contains(&term.to_lowercase())
        {
            return false;
        }
        if let Some(date) = self.date
            && quote.created_at.date_naive() != date
        {
            return false;
        }
        true
    }
}

/// Read-side view over the quote collection.
pub struct QuoteListView<S> {
    store: S,
}

impl<S: DocumentStore> QuoteListView<S> {
    /// Creates a view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists quotes matching the filter, newest first.
    #[tracing::instrument(skip(self, filter))]
    pub async fn list(&self, filter: &QuoteFilter) -> Result<Vec<QuoteRecord>> {
        let docs = self.store.list(Quote::COLLECTION).await?;

        let mut records = Vec::with_capacity(docs.len());
        for doc in &docs {
            let quote: Quote = doc.decode()?;
            if filter.matches(&quote) {
                records.push(QuoteRecord {
                    id: QuoteId::from(doc.doc.id),
                    quote,
                });
            }
        }

        records.sort_by(|a, b| b.quote.created_at.cmp(&a.quote.created_at));
        Ok(records)
    }

    /// Loads a single quote record, or None.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: QuoteId) -> Result<Option<QuoteRecord>> {
        match self.store.get(&Quote::doc_ref(id)).await? {
            Some(doc) => Ok(Some(QuoteRecord {
                id,
                quote: doc.decode()?,
            })),
            None => Ok(None),
        }
    }
}
