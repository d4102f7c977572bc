//! Shipping address book.
//!
//! Wraps the address API with the same boundary rules as the cart gateway:
//! every successful mutation replaces the whole list from the store's
//! authoritative response, and failures terminate here as notices. The book
//! also owns the checkout selection, keyed by address id, and keeps it
//! consistent across list changes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use kirana_core::{AddressRecord, AddressSelection};

use crate::api::AddressApi;
use crate::notice::NoticeSink;
use crate::session::SessionStore;

/// Generic notice for a failed address fetch.
pub const ADDRESS_FETCH_FAILED: &str =
    "Could not fetch addresses. Check that the backend is running, reachable and returns valid JSON.";

/// Generic notice for a failed address creation.
pub const ADDRESS_ADD_FAILED: &str =
    "Could not add this address. Check that the backend is running, reachable and returns valid JSON.";

/// Generic notice for a failed address deletion.
pub const ADDRESS_DELETE_FAILED: &str =
    "Could not delete this address. Check that the backend is running, reachable and returns valid JSON.";

/// The user's address list plus the checkout selection.
pub struct AddressBook {
    api: Arc<dyn AddressApi>,
    session: Arc<dyn SessionStore>,
    notices: Arc<dyn NoticeSink>,
    selection: AddressSelection,
}

impl AddressBook {
    /// Create a book with an empty list and no selection.
    #[must_use]
    pub fn new(
        api: Arc<dyn AddressApi>,
        session: Arc<dyn SessionStore>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            api,
            session,
            notices,
            selection: AddressSelection::default(),
        }
    }

    /// The current list and selection.
    #[must_use]
    pub const fn selection(&self) -> &AddressSelection {
        &self.selection
    }

    /// Every address on file, as last confirmed by the store.
    #[must_use]
    pub fn records(&self) -> &[AddressRecord] {
        &self.selection.all
    }

    /// Fetch the address list, replacing the local copy.
    ///
    /// A selection that still resolves in the fresh list survives; one that
    /// does not is cleared.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> bool {
        let Some(token) = self.session.token() else {
            debug!("no session, addresses not fetched");
            return false;
        };

        match self.api.list(&token).await {
            Ok(records) => {
                debug!(count = records.len(), "addresses fetched");
                self.selection.replace_all(records);
                true
            }
            Err(e) => {
                warn!(error = %e, "address fetch failed");
                self.notices.error(e.notice_text(ADDRESS_FETCH_FAILED));
                false
            }
        }
    }

    /// Add an address and select it.
    ///
    /// The store responds with the full post-mutation list; the record whose
    /// id was not present before is the one just created and becomes the
    /// selection.
    #[instrument(skip(self, text))]
    pub async fn add(&mut self, text: &str) -> bool {
        let Some(token) = self.session.token() else {
            debug!("no session, address not added");
            return false;
        };

        let previous: HashSet<String> = self
            .selection
            .all
            .iter()
            .map(|record| record.id.clone())
            .collect();

        match self.api.add(&token, text).await {
            Ok(records) => {
                debug!(count = records.len(), "address added");
                self.selection.replace_all(records);
                let created = self
                    .selection
                    .all
                    .iter()
                    .find(|record| !previous.contains(&record.id))
                    .map(|record| record.id.clone());
                if let Some(id) = created {
                    self.selection.select(&id);
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "address add failed");
                self.notices.error(e.notice_text(ADDRESS_ADD_FAILED));
                false
            }
        }
    }

    /// Delete an address by id.
    ///
    /// Deleting the selected address clears the selection; deleting any
    /// other address leaves it alone.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&mut self, id: &str) -> bool {
        let Some(token) = self.session.token() else {
            debug!("no session, address not deleted");
            return false;
        };

        match self.api.remove(&token, id).await {
            Ok(records) => {
                debug!(count = records.len(), "address deleted");
                self.selection.replace_all(records);
                true
            }
            Err(e) => {
                warn!(error = %e, "address delete failed");
                self.notices.error(e.notice_text(ADDRESS_DELETE_FAILED));
                false
            }
        }
    }

    /// Choose an address for checkout. Ids that do not resolve are refused.
    pub fn select(&mut self, id: &str) -> bool {
        let selected = self.selection.select(id);
        if !selected {
            debug!(id, "selection refused, no such address");
        }
        selected
    }
}
