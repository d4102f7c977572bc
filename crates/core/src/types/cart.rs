//! Cart entries and reconciled line items.

use serde::{Deserialize, Serialize};

use super::product::ProductRecord;

/// The minimal unit the cart store persists: an item id and a quantity.
///
/// The store never keeps entries with quantity ≤ 0; submitting such a
/// quantity is the removal signal and the store answers with the entry gone.
/// Wire names follow the store API (`productId`, `qty`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Catalog id of the item in the cart.
    #[serde(rename = "productId")]
    pub item_id: String,
    /// Units of the item. Always ≥ 1 when read back from the store.
    #[serde(rename = "qty")]
    pub quantity: i64,
}

impl CartEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(item_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// A cart entry joined with its catalog record.
///
/// Line items are derived data: recomputed from entries and the current
/// catalog snapshot on every use, never persisted or cached on their own.
/// One exists only when the entry's item id resolves in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    /// The catalog record the entry resolved to.
    pub product: ProductRecord,
    /// Quantity carried over from the entry.
    pub quantity: i64,
}

impl CartLineItem {
    /// Catalog id of the underlying entry.
    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.product.id
    }

    /// Cost of this line: unit cost times quantity, saturating at the `i64`
    /// extremes.
    #[must_use]
    pub const fn line_total(&self) -> i64 {
        self.product.cost.saturating_mul(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_names() {
        let entry = CartEntry::new("p1", 2);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["qty"], 2);

        let back: CartEntry = serde_json::from_str(r#"{"productId":"p1","qty":2}"#).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_line_total() {
        let line = CartLineItem {
            product: ProductRecord {
                id: "p1".to_owned(),
                name: "Basketball".to_owned(),
                category: "Sports".to_owned(),
                cost: 20,
                rating: 4,
                image_url: String::new(),
            },
            quantity: 3,
        };
        assert_eq!(line.line_total(), 60);
        assert_eq!(line.item_id(), "p1");
    }

    #[test]
    fn test_line_total_saturates() {
        let line = CartLineItem {
            product: ProductRecord {
                id: "p1".to_owned(),
                name: String::new(),
                category: String::new(),
                cost: i64::MAX,
                rating: 0,
                image_url: String::new(),
            },
            quantity: 2,
        };
        assert_eq!(line.line_total(), i64::MAX);
    }
}
