//! Cart mutation gateway.
//!
//! The one component allowed to change cart content. Every mutation goes to
//! the store and the local cache is replaced wholesale from the store's
//! authoritative response; the gateway never merges partial state, so the
//! client view cannot drift from the server view. On failure the cache is
//! left exactly as it was: no optimistic update survives an error.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use kirana_core::CartEntry;

use crate::api::CartApi;
use crate::notice::NoticeSink;
use crate::session::SessionStore;

/// Warning shown when a cart action is attempted without a session.
pub const LOGIN_TO_ADD: &str = "Login to add an item to the Cart";

/// Warning shown when the catalog "add" action hits an item already in the
/// cart.
pub const ALREADY_IN_CART: &str =
    "Item already in cart. Use the cart sidebar to update quantity or remove item.";

/// Generic notice for a failed cart mutation.
pub const CART_UPDATE_FAILED: &str =
    "Could not update cart. Check that the backend is running, reachable and returns valid JSON.";

/// Generic notice for a failed cart fetch.
pub const CART_FETCH_FAILED: &str =
    "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON.";

/// What to do when the submitted item already has a cart entry.
///
/// The catalog "add to cart" button uses [`DuplicatePolicy::Prevent`]: a
/// first add must not silently bump a quantity the user set elsewhere. The
/// cart view's quantity controls use [`DuplicatePolicy::Allow`], which also
/// covers driving a quantity to 0 to remove the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Refuse the mutation when the item already has an entry.
    Prevent,
    /// Always submit; the store upserts.
    Allow,
}

/// Gateway between user actions and the cart store.
pub struct CartGateway {
    api: Arc<dyn CartApi>,
    session: Arc<dyn SessionStore>,
    notices: Arc<dyn NoticeSink>,
    entries: Vec<CartEntry>,
}

impl CartGateway {
    /// Create a gateway with an empty local cache.
    #[must_use]
    pub fn new(
        api: Arc<dyn CartApi>,
        session: Arc<dyn SessionStore>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            api,
            session,
            notices,
            entries: Vec::new(),
        }
    }

    /// The cached cart entries, as last confirmed by the store.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Whether the item currently has an entry with a positive quantity.
    #[must_use]
    pub fn contains(&self, item_id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.item_id == item_id && entry.quantity > 0)
    }

    /// Fetch the cart from the store, replacing the cache.
    ///
    /// Returns whether the cache was refreshed. Without a token this is a
    /// quiet no-op; the cart is simply not available logged out.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> bool {
        let Some(token) = self.session.token() else {
            debug!("no session, cart not fetched");
            return false;
        };

        match self.api.entries(&token).await {
            Ok(entries) => {
                debug!(count = entries.len(), "cart fetched");
                self.entries = entries;
                true
            }
            Err(e) => {
                warn!(error = %e, "cart fetch failed");
                self.notices.error(CART_FETCH_FAILED);
                false
            }
        }
    }

    /// Submit an item/quantity pair to the store.
    ///
    /// Preconditions short-circuit before any network call: a missing token
    /// emits a login warning, and [`DuplicatePolicy::Prevent`] with the item
    /// already in the cart emits the duplicate warning. On success the cache
    /// becomes the store's full post-mutation response and `true` is
    /// returned. Any remote failure emits the generic update notice and
    /// leaves the cache untouched; unlike every other surface, the cart
    /// never relays server text.
    #[instrument(skip(self), fields(item_id = %item_id, quantity))]
    pub async fn add_or_update(
        &mut self,
        item_id: &str,
        quantity: i64,
        policy: DuplicatePolicy,
    ) -> bool {
        let Some(token) = self.session.token() else {
            debug!("no session, cart mutation refused");
            self.notices.warning(LOGIN_TO_ADD);
            return false;
        };

        if policy == DuplicatePolicy::Prevent && self.contains(item_id) {
            debug!("duplicate add refused");
            self.notices.warning(ALREADY_IN_CART);
            return false;
        }

        match self.api.upsert(&token, item_id, quantity).await {
            Ok(entries) => {
                debug!(count = entries.len(), "cart updated");
                self.entries = entries;
                true
            }
            Err(e) => {
                warn!(error = %e, "cart mutation failed");
                self.notices.error(CART_UPDATE_FAILED);
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use crate::api::ApiError;
    use crate::notice::{RecordingNoticeSink, Severity};
    use crate::session::MemorySessionStore;

    use super::*;

    /// Cart API double: scripted responses, call counting.
    #[derive(Default)]
    struct FakeCartApi {
        upsert_calls: AtomicUsize,
        responses: Mutex<VecDeque<Result<Vec<CartEntry>, ApiError>>>,
    }

    impl FakeCartApi {
        fn scripted(responses: Vec<Result<Vec<CartEntry>, ApiError>>) -> Self {
            Self {
                upsert_calls: AtomicUsize::new(0),
                responses: Mutex::new(responses.into_iter().collect()),
            }
        }

        fn next_response(&self) -> Result<Vec<CartEntry>, ApiError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("fake cart api called more times than scripted")
        }

        fn rejected() -> ApiError {
            ApiError::Rejected {
                status: 400,
                message: "Product doesn't exist in database".to_owned(),
            }
        }
    }

    #[async_trait]
    impl CartApi for FakeCartApi {
        async fn entries(&self, _token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
            self.next_response()
        }

        async fn upsert(
            &self,
            _token: &SecretString,
            _item_id: &str,
            _quantity: i64,
        ) -> Result<Vec<CartEntry>, ApiError> {
            self.upsert_calls.fetch_add(1, Ordering::SeqCst);
            self.next_response()
        }

        async fn checkout(&self, _token: &SecretString, _address_id: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn gateway_with(
        api: FakeCartApi,
        session: MemorySessionStore,
    ) -> (CartGateway, Arc<FakeCartApi>, Arc<RecordingNoticeSink>) {
        let api = Arc::new(api);
        let notices = Arc::new(RecordingNoticeSink::new());
        let gateway = CartGateway::new(api.clone(), Arc::new(session), notices.clone());
        (gateway, api, notices)
    }

    #[tokio::test]
    async fn test_add_without_token_emits_warning_and_skips_network() {
        let (mut gateway, api, notices) =
            gateway_with(FakeCartApi::default(), MemorySessionStore::new());

        let applied = gateway.add_or_update("p1", 1, DuplicatePolicy::Prevent).await;

        assert!(!applied);
        assert_eq!(api.upsert_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            notices.notices(),
            vec![(Severity::Warning, LOGIN_TO_ADD.to_owned())]
        );
    }

    #[tokio::test]
    async fn test_prevent_duplicate_skips_network_and_keeps_cart() {
        let api = FakeCartApi::scripted(vec![Ok(vec![CartEntry::new("p1", 2)])]);
        let session = MemorySessionStore::logged_in("testtoken", "crio-user", 5000);
        let (mut gateway, api, notices) = gateway_with(api, session);

        assert!(gateway.refresh().await);
        let before = gateway.entries().to_vec();

        let applied = gateway.add_or_update("p1", 1, DuplicatePolicy::Prevent).await;

        assert!(!applied);
        assert_eq!(api.upsert_calls.load(Ordering::SeqCst), 0);
        assert_eq!(gateway.entries(), before.as_slice());
        assert_eq!(
            notices.notices(),
            vec![(Severity::Warning, ALREADY_IN_CART.to_owned())]
        );
    }

    #[tokio::test]
    async fn test_allow_policy_submits_even_when_present() {
        let api = FakeCartApi::scripted(vec![
            Ok(vec![CartEntry::new("p1", 2)]),
            Ok(vec![CartEntry::new("p1", 3)]),
        ]);
        let session = MemorySessionStore::logged_in("testtoken", "crio-user", 5000);
        let (mut gateway, api, _notices) = gateway_with(api, session);

        gateway.refresh().await;
        let applied = gateway.add_or_update("p1", 3, DuplicatePolicy::Allow).await;

        assert!(applied);
        assert_eq!(api.upsert_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.entries(), [CartEntry::new("p1", 3)]);
    }

    #[tokio::test]
    async fn test_cache_is_replaced_by_authoritative_response() {
        // The store echoes more than the touched entry; the whole response
        // becomes the cache.
        let api = FakeCartApi::scripted(vec![Ok(vec![
            CartEntry::new("p9", 7),
            CartEntry::new("p1", 1),
        ])]);
        let session = MemorySessionStore::logged_in("testtoken", "crio-user", 5000);
        let (mut gateway, _api, _notices) = gateway_with(api, session);

        let applied = gateway.add_or_update("p1", 1, DuplicatePolicy::Prevent).await;

        assert!(applied);
        assert_eq!(
            gateway.entries(),
            [CartEntry::new("p9", 7), CartEntry::new("p1", 1)]
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_cache_and_reports_generically() {
        let api = FakeCartApi::scripted(vec![
            Ok(vec![CartEntry::new("p1", 2)]),
            Err(FakeCartApi::rejected()),
        ]);
        let session = MemorySessionStore::logged_in("testtoken", "crio-user", 5000);
        let (mut gateway, _api, notices) = gateway_with(api, session);

        gateway.refresh().await;
        let before = gateway.entries().to_vec();

        let applied = gateway.add_or_update("p2", 1, DuplicatePolicy::Prevent).await;

        assert!(!applied);
        assert_eq!(gateway.entries(), before.as_slice());
        // Even a structured server rejection surfaces as the generic update
        // notice; the cart never relays server text.
        assert_eq!(
            notices.notices(),
            vec![(Severity::Error, CART_UPDATE_FAILED.to_owned())]
        );
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cache_and_notices() {
        let api = FakeCartApi::scripted(vec![
            Ok(vec![CartEntry::new("p1", 2)]),
            Err(FakeCartApi::rejected()),
        ]);
        let session = MemorySessionStore::logged_in("testtoken", "crio-user", 5000);
        let (mut gateway, _api, notices) = gateway_with(api, session);

        assert!(gateway.refresh().await);
        assert!(!gateway.refresh().await);

        assert_eq!(gateway.entries(), [CartEntry::new("p1", 2)]);
        assert_eq!(
            notices.notices(),
            vec![(Severity::Error, CART_FETCH_FAILED.to_owned())]
        );
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_quiet() {
        let (mut gateway, _api, notices) =
            gateway_with(FakeCartApi::default(), MemorySessionStore::new());

        assert!(!gateway.refresh().await);
        assert!(notices.notices().is_empty());
    }

    #[test]
    fn test_contains_ignores_nonpositive_quantities() {
        let session = MemorySessionStore::new();
        let (mut gateway, _api, _notices) = gateway_with(FakeCartApi::default(), session);
        gateway.entries = vec![CartEntry::new("p1", 0), CartEntry::new("p2", 1)];

        assert!(!gateway.contains("p1"));
        assert!(gateway.contains("p2"));
        assert!(!gateway.contains("p3"));
    }
}
