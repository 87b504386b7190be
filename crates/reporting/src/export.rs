//! CSV export of the quote collection.

use doc_store::DocumentStore;
use domain::Quote;
use futures_util::StreamExt;

use crate::quote_list::QuoteFilter;
use crate::{ReportingError, Result};

const HEADERS: [&str; 8] = [
    "Quote ID",
    "Date",
    "Customer Name",
    "Email",
    "Phone",
    "Status",
    "Total Amount",
    "Items Count",
];

/// Renders the quotes matching the filter as CSV bytes.
///
/// The collection is streamed rather than loaded wholesale, so exports
/// stay cheap as the quote history grows.
#[tracing::instrument(skip(store, filter))]
pub async fn quotes_csv<S: DocumentStore>(store: &S, filter: &QuoteFilter) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(HEADERS)?;

    let mut stream = store.stream_collection(Quote::COLLECTION).await?;
    while let Some(doc) = stream.next().await {
        let doc = doc?;
        let quote: Quote = doc.decode()?;
        if !filter.matches(&quote) {
            continue;
        }

        writer.write_record(&[
            doc.doc.id.to_string(),
            quote.created_at.format("%Y-%m-%d").to_string(),
            quote.buyer.contact.name.clone(),
            quote.buyer.contact.email.clone(),
            quote.buyer.contact.phone.clone(),
            quote.status.to_string(),
            quote.total_amount.to_string(),
            quote.items.len().to_string(),
        ])?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ReportingError::Io(std::io::Error::other(e.to_string())))
}
