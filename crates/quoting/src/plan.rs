//! Pure two-phase planning for a quote commit.
//!
//! Operates on a point-in-time snapshot only: validate every line first,
//! then stage every write. Nothing here touches the store, so the
//! transaction runner can re-run the whole plan on a fresh snapshot after
//! a lost revision race.

use chrono::{DateTime, Utc};
use doc_store::{TxSnapshot, WriteOp};
use domain::{Buyer, LineItem, Product, ProductId, Quote, QuoteId, QuoteStatus};
use serde::Deserialize;

use crate::error::{QuotingError, Result};

/// One requested line: a product reference plus a quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineItemRequest {
    /// Creates a line item request.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Everything a successful plan stages: the writes and the quote value.
#[derive(Debug)]
pub(crate) struct CommitPlan {
    pub writes: Vec<WriteOp>,
    pub quote_id: QuoteId,
    pub quote: Quote,
}

/// Plans a quote commit against the snapshot.
///
/// Phase one validates every line, in the order supplied, without staging
/// anything. Phase two runs only once all lines pass: it stages the stock
/// decrement for every product and the creation of the quote, with the
/// line items snapshotting the product data as read — never re-fetched.
pub(crate) fn plan_commit(
    snapshot: &TxSnapshot,
    buyer: &Buyer,
    requests: &[LineItemRequest],
    now: DateTime<Utc>,
) -> Result<CommitPlan> {
    // Validate phase.
    let mut validated: Vec<(ProductId, Product, u32)> = Vec::with_capacity(requests.len());
    for request in requests {
        let doc = Product::doc_ref(request.product_id);
        let document = snapshot
            .get(&doc)
            .ok_or(QuotingError::ProductNotFound(request.product_id))?;
        let product: Product = document.decode()?;

        if product.stock < request.quantity {
            return Err(QuotingError::InsufficientStock {
                product: request.product_id,
                name: product.name,
                requested: request.quantity,
                available: product.stock,
            });
        }

        validated.push((request.product_id, product, request.quantity));
    }

    // Apply phase.
    let mut writes = Vec::with_capacity(validated.len() + 1);
    let mut items = Vec::with_capacity(validated.len());
    for (product_id, product, quantity) in &validated {
        let updated = product.decremented(*quantity);
        writes.push(WriteOp::Replace {
            doc: Product::doc_ref(*product_id),
            body: serde_json::to_value(&updated)?,
        });
        items.push(LineItem {
            product_id: *product_id,
            name: product.name.clone(),
            category: product.category.clone(),
            unit_price: product.price,
            quantity: *quantity,
        });
    }

    let quote = Quote {
        buyer: buyer.clone(),
        total_amount: Quote::total_of(&items),
        items,
        status: QuoteStatus::Pending,
        created_at: now,
        accepted_at: None,
        rejected_at: None,
        rejection_reason: None,
    };

    let quote_id = QuoteId::new();
    writes.push(WriteOp::Create {
        doc: Quote::doc_ref(quote_id),
        body: serde_json::to_value(&quote)?,
    });

    Ok(CommitPlan {
        writes,
        quote_id,
        quote,
    })
}
