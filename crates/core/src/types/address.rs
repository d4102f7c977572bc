//! Shipping addresses and the checkout selection.

use serde::{Deserialize, Serialize};

/// A shipping address as stored by the address book.
///
/// Wire names follow the store API (`_id`, `address`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Stable identifier assigned by the address book.
    #[serde(rename = "_id")]
    pub id: String,
    /// Free-form address text as entered by the user.
    #[serde(rename = "address")]
    pub text: String,
}

/// The full address list plus which address, if any, is chosen for checkout.
///
/// Selection is keyed by the address's stable id, so editing an address's
/// text cannot silently invalidate the choice. A selection, when present,
/// always resolves to exactly one element of `all`: [`AddressSelection::select`]
/// refuses ids that do not resolve, and [`AddressSelection::replace_all`]
/// clears a selection that no longer does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSelection {
    /// Every address on file, in the order the address book returned them.
    pub all: Vec<AddressRecord>,
    /// Id of the chosen address, or `None` when nothing is selected.
    pub selected: Option<String>,
}

impl AddressSelection {
    /// Selection over an address list with nothing chosen yet.
    #[must_use]
    pub const fn new(all: Vec<AddressRecord>) -> Self {
        Self {
            all,
            selected: None,
        }
    }

    /// The chosen address record, when the selection resolves.
    #[must_use]
    pub fn selected_record(&self) -> Option<&AddressRecord> {
        let id = self.selected.as_deref()?;
        self.all.iter().find(|record| record.id == id)
    }

    /// Choose the address with the given id. Returns `false` (and leaves the
    /// selection unchanged) when no address on file has that id.
    pub fn select(&mut self, id: &str) -> bool {
        if self.all.iter().any(|record| record.id == id) {
            self.selected = Some(id.to_owned());
            true
        } else {
            false
        }
    }

    /// Replace the whole list with an authoritative response, keeping the
    /// current selection only if its id still resolves.
    pub fn replace_all(&mut self, all: Vec<AddressRecord>) {
        self.all = all;
        if self.selected_record().is_none() {
            self.selected = None;
        }
    }

    /// Whether the given id is the current selection.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }
}
