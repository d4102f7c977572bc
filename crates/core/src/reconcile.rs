//! Cart reconciliation: joining minimal cart entries against the catalog.
//!
//! The cart store persists only `(item id, quantity)` pairs. Everything the
//! user sees on a cart line (name, cost, image) comes from joining those
//! pairs against the current catalog snapshot. Both functions here are pure;
//! fetching the inputs is the client layer's job.

use crate::types::{CartEntry, CartLineItem, ProductRecord};

/// Join cart entries against a catalog snapshot.
///
/// Each entry is resolved to the first catalog record with a matching id
/// (catalog ids are unique, so first match is the only match). Entries whose
/// id is missing from the catalog produce no line: the catalog may lag the
/// cart and a stale entry is expected, not an error. The output preserves
/// the order of `entries`.
///
/// ## Examples
///
/// ```
/// use kirana_core::{CartEntry, ProductRecord, reconcile};
///
/// let catalog = vec![ProductRecord {
///     id: "p1".into(),
///     name: "Basketball".into(),
///     category: "Sports".into(),
///     cost: 20,
///     rating: 5,
///     image_url: String::new(),
/// }];
/// let entries = vec![CartEntry::new("p1", 2), CartEntry::new("gone", 1)];
///
/// let lines = reconcile(&entries, &catalog);
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].item_id(), "p1");
/// assert_eq!(lines[0].quantity, 2);
/// ```
#[must_use]
pub fn reconcile(entries: &[CartEntry], catalog: &[ProductRecord]) -> Vec<CartLineItem> {
    entries
        .iter()
        .filter_map(|entry| {
            catalog
                .iter()
                .find(|product| product.id == entry.item_id)
                .map(|product| CartLineItem {
                    product: product.clone(),
                    quantity: entry.quantity,
                })
        })
        .collect()
}

/// Total cost of a set of reconciled lines.
///
/// Sums `cost × quantity` over all lines with saturating `i64` arithmetic.
/// An empty slice totals 0.
#[must_use]
pub fn total_value(lines: &[CartLineItem]) -> i64 {
    lines
        .iter()
        .fold(0_i64, |total, line| total.saturating_add(line.line_total()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, cost: i64) -> ProductRecord {
        ProductRecord {
            id: id.to_owned(),
            name: format!("Product {id}"),
            category: "Sports".to_owned(),
            cost,
            rating: 4,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_reconcile_joins_by_id() {
        let catalog = vec![product("p1", 20), product("p2", 35)];
        let entries = vec![CartEntry::new("p1", 2)];

        let lines = reconcile(&entries, &catalog);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_id(), "p1");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].product.cost, 20);
    }

    #[test]
    fn test_reconcile_drops_unknown_ids_silently() {
        let catalog = vec![product("p1", 20)];
        let entries = vec![
            CartEntry::new("p1", 1),
            CartEntry::new("withdrawn", 3),
            CartEntry::new("also-gone", 1),
        ];

        let lines = reconcile(&entries, &catalog);
        assert_eq!(lines.len(), 1);
        assert!(lines.iter().all(|line| line.item_id() == "p1"));
    }

    #[test]
    fn test_reconcile_output_never_exceeds_input() {
        let catalog = vec![product("p1", 10), product("p2", 10)];
        let entries = vec![
            CartEntry::new("p2", 1),
            CartEntry::new("p1", 1),
            CartEntry::new("p3", 1),
        ];

        let lines = reconcile(&entries, &catalog);
        assert!(lines.len() <= entries.len());
        // Every surviving line resolves in the catalog.
        for line in &lines {
            assert!(catalog.iter().any(|p| p.id == line.item_id()));
        }
    }

    #[test]
    fn test_reconcile_preserves_entry_order() {
        let catalog = vec![product("p1", 10), product("p2", 20), product("p3", 30)];
        let entries = vec![
            CartEntry::new("p3", 1),
            CartEntry::new("p1", 1),
            CartEntry::new("p2", 1),
        ];

        let ids: Vec<String> = reconcile(&entries, &catalog)
            .into_iter()
            .map(|line| line.product.id)
            .collect();
        assert_eq!(ids, ["p3", "p1", "p2"]);
    }

    #[test]
    fn test_reconcile_empty_inputs() {
        assert!(reconcile(&[], &[product("p1", 10)]).is_empty());
        assert!(reconcile(&[CartEntry::new("p1", 1)], &[]).is_empty());
    }

    #[test]
    fn test_total_value_empty_is_zero() {
        assert_eq!(total_value(&[]), 0);
    }

    #[test]
    fn test_total_value_sums_lines() {
        let catalog = vec![product("p1", 20), product("p2", 35)];
        let entries = vec![CartEntry::new("p1", 2), CartEntry::new("p2", 1)];

        let lines = reconcile(&entries, &catalog);
        assert_eq!(total_value(&lines), 75);
    }

    #[test]
    fn test_total_value_invariant_under_reordering() {
        let catalog = vec![product("p1", 7), product("p2", 11), product("p3", 13)];
        let entries = vec![
            CartEntry::new("p1", 2),
            CartEntry::new("p2", 3),
            CartEntry::new("p3", 1),
        ];

        let mut lines = reconcile(&entries, &catalog);
        let forward = total_value(&lines);
        lines.reverse();
        assert_eq!(total_value(&lines), forward);
    }

    #[test]
    fn test_total_value_saturates_instead_of_wrapping() {
        let catalog = vec![product("p1", i64::MAX), product("p2", i64::MAX)];
        let entries = vec![CartEntry::new("p1", 1), CartEntry::new("p2", 1)];

        let lines = reconcile(&entries, &catalog);
        assert_eq!(total_value(&lines), i64::MAX);
    }

    #[test]
    fn test_end_to_end_two_units_at_twenty() {
        let catalog = vec![product("p1", 20)];
        let entries = vec![CartEntry::new("p1", 2)];

        let lines = reconcile(&entries, &catalog);
        assert_eq!(lines[0].item_id(), "p1");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].product.cost, 20);
        assert_eq!(total_value(&lines), 40);
    }
}
