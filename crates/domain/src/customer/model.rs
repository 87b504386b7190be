use doc_store::DocRef;
use serde::{Deserialize, Serialize};

use crate::value_objects::CustomerId;

/// A customer record. Email is the natural dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl Customer {
    /// Collection the customers live in.
    pub const COLLECTION: &'static str = "customers";

    /// Returns the document reference for a customer ID.
    pub fn doc_ref(id: CustomerId) -> DocRef {
        DocRef::new(Self::COLLECTION, id.document_id())
    }

    /// Returns a copy with all fields whitespace-trimmed.
    pub fn trimmed(&self) -> Customer {
        Customer {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_strips_whitespace() {
        let customer = Customer {
            name: "  Ada Lovelace ".to_string(),
            email: " ada@example.com ".to_string(),
            phone: "".to_string(),
            address: " 12 Analytical Row ".to_string(),
        };

        let trimmed = customer.trimmed();
        assert_eq!(trimmed.name, "Ada Lovelace");
        assert_eq!(trimmed.email, "ada@example.com");
        assert_eq!(trimmed.address, "12 Analytical Row");
    }

    #[test]
    fn optional_fields_default_on_deserialize() {
        let customer: Customer =
            serde_json::from_value(serde_json::json!({"name": "Ada", "email": "ada@example.com"}))
                .unwrap();
        assert_eq!(customer.phone, "");
        assert_eq!(customer.address, "");
    }
}
