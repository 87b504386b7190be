use doc_store::DocRef;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, ProductId};

/// Availability status of a catalog product.
///
/// Invariant: a product with zero stock is always `OutOfStock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    /// In stock and sellable.
    #[default]
    Available,

    /// No stock left.
    #[serde(rename = "Out of Stock")]
    OutOfStock,

    /// No longer sold, regardless of remaining stock.
    Discontinued,
}

impl ProductStatus {
    /// Status after a sale decrements stock.
    ///
    /// Zero stock forces `OutOfStock`; otherwise the existing status is
    /// left untouched. A Discontinued product with remaining stock stays
    /// Discontinued, it is never promoted back to Available here.
    pub fn after_decrement(stock: u32, current: ProductStatus) -> ProductStatus {
        if stock == 0 {
            ProductStatus::OutOfStock
        } else {
            current
        }
    }

    /// Status for a catalog edit.
    ///
    /// Zero stock forces `OutOfStock`. Restocking a product that was
    /// `OutOfStock` promotes it back to `Available`; any other requested
    /// status is kept as-is.
    pub fn normalize(stock: u32, requested: ProductStatus) -> ProductStatus {
        if stock == 0 {
            ProductStatus::OutOfStock
        } else if requested == ProductStatus::OutOfStock {
            ProductStatus::Available
        } else {
            requested
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "Available",
            ProductStatus::OutOfStock => "Out of Stock",
            ProductStatus::Discontinued => "Discontinued",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Human-readable product name.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Free-text category.
    pub category: String,

    /// Units on hand.
    pub stock: u32,

    /// Availability status; derived from stock on every mutation.
    pub status: ProductStatus,
}

impl Product {
    /// Collection the products live in.
    pub const COLLECTION: &'static str = "products";

    /// Returns the document reference for a product ID.
    pub fn doc_ref(id: ProductId) -> DocRef {
        DocRef::new(Self::COLLECTION, id.document_id())
    }

    /// Returns this product after selling `quantity` units.
    ///
    /// Callers must have validated `quantity <= self.stock`.
    pub fn decremented(&self, quantity: u32) -> Product {
        let stock = self.stock - quantity;
        Product {
            stock,
            status: ProductStatus::after_decrement(stock, self.status),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: u32, status: ProductStatus) -> Product {
        Product {
            name: "Widget".to_string(),
            price: Money::from_cents(10000),
            category: "Tools".to_string(),
            stock,
            status,
        }
    }

    #[test]
    fn after_decrement_forces_out_of_stock_at_zero() {
        assert_eq!(
            ProductStatus::after_decrement(0, ProductStatus::Available),
            ProductStatus::OutOfStock
        );
        assert_eq!(
            ProductStatus::after_decrement(0, ProductStatus::Discontinued),
            ProductStatus::OutOfStock
        );
    }

    #[test]
    fn after_decrement_keeps_existing_status_when_stocked() {
        assert_eq!(
            ProductStatus::after_decrement(3, ProductStatus::Available),
            ProductStatus::Available
        );
        // Discontinued is not promoted just because stock remains.
        assert_eq!(
            ProductStatus::after_decrement(3, ProductStatus::Discontinued),
            ProductStatus::Discontinued
        );
    }

    #[test]
    fn normalize_promotes_restocked_out_of_stock() {
        assert_eq!(
            ProductStatus::normalize(5, ProductStatus::OutOfStock),
            ProductStatus::Available
        );
        assert_eq!(
            ProductStatus::normalize(0, ProductStatus::Available),
            ProductStatus::OutOfStock
        );
        assert_eq!(
            ProductStatus::normalize(5, ProductStatus::Discontinued),
            ProductStatus::Discontinued
        );
    }

    #[test]
    fn decremented_updates_stock_and_status() {
        let sold_out = product(5, ProductStatus::Available).decremented(5);
        assert_eq!(sold_out.stock, 0);
        assert_eq!(sold_out.status, ProductStatus::OutOfStock);

        let remaining = product(5, ProductStatus::Available).decremented(2);
        assert_eq!(remaining.stock, 3);
        assert_eq!(remaining.status, ProductStatus::Available);

        let discontinued = product(5, ProductStatus::Discontinued).decremented(2);
        assert_eq!(discontinued.status, ProductStatus::Discontinued);
    }

    #[test]
    fn status_serializes_with_display_names() {
        let json = serde_json::to_string(&ProductStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
        let back: ProductStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProductStatus::OutOfStock);
    }

    #[test]
    fn product_serialization_roundtrip() {
        let p = product(5, ProductStatus::Available);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["name"], "Widget");
        assert_eq!(json["stock"], 5);
        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
