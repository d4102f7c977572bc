//! Catalog product records.

use serde::{Deserialize, Serialize};

/// A product as published by the catalog provider.
///
/// Records are immutable from the client's point of view: the catalog owns
/// them and the client only ever holds a read-only snapshot. Field names on
/// the wire follow the store API (`_id`, `image`).
///
/// ## Examples
///
/// ```
/// use kirana_core::ProductRecord;
///
/// let json = r#"{
///     "_id": "KCRwjF7lN97xnzk4",
///     "name": "Basketball",
///     "category": "Sports",
///     "cost": 100,
///     "rating": 5,
///     "image": "http://example.com/basketball.png"
/// }"#;
/// let product: ProductRecord = serde_json::from_str(json)?;
/// assert_eq!(product.id, "KCRwjF7lN97xnzk4");
/// assert_eq!(product.cost, 100);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Stable catalog identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category label (e.g. "Fashion", "Electronics").
    pub category: String,
    /// Unit cost in whole currency units. No fractional currency exists in
    /// this store.
    pub cost: i64,
    /// Star rating, 0 to 5.
    pub rating: u8,
    /// URL of the product image.
    #[serde(rename = "image")]
    pub image_url: String,
}
