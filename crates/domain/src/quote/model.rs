use chrono::{DateTime, Utc};
use doc_store::DocRef;
use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::value_objects::{CustomerId, Money, ProductId, QuoteId};

use super::QuoteStatus;

/// Denormalized buyer details carried on a quote.
///
/// The contact fields are a snapshot taken at submission; later edits to
/// the customer record do not touch historical quotes. The id is absent
/// when customer resolution failed or was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,

    #[serde(flatten)]
    pub contact: Customer,
}

/// One line of a quote: a product snapshot plus the requested quantity.
///
/// Name, category, and unit price are frozen at the transaction's read
/// time and never re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl LineItem {
    /// Returns the total for this line (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A persisted quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub buyer: Buyer,
    pub items: Vec<LineItem>,

    /// Σ price × quantity, computed at creation time and frozen.
    pub total_amount: Money,

    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Quote {
    /// Collection the quotes live in.
    pub const COLLECTION: &'static str = "quotes";

    /// Returns the document reference for a quote ID.
    pub fn doc_ref(id: QuoteId) -> DocRef {
        DocRef::new(Self::COLLECTION, id.document_id())
    }

    /// Sums line totals.
    pub fn total_of(items: &[LineItem]) -> Money {
        items.iter().map(LineItem::line_total).sum()
    }

    /// Number of line items on the quote.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
