//! Checkout flow: the one component that places orders.
//!
//! A [`CheckoutFlow`] runs a single attempt through a small state machine:
//!
//! ```text
//! Idle -> Validating -> Submitting -> Succeeded
//!                  \             \
//!                   +-> Failed    +-> Failed
//! ```
//!
//! The flow is terminal per invocation: once it reaches `Succeeded` or
//! `Failed` it refuses to run again, and there is no automatic retry. On
//! success the wallet is debited by the client-computed cart total and
//! persisted immediately. The store is the source of truth for the amount
//! actually charged; if it ever starts reporting one, reconciling the
//! balance from that response belongs here.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use kirana_core::{AddressSelection, CartLineItem, total_value, validate};

use crate::api::CartApi;
use crate::notice::NoticeSink;
use crate::session::SessionStore;

/// Success notice once the order is placed.
pub const ORDER_PLACED: &str = "Order placed successfully";

/// Generic notice when order placement fails without a server message.
pub const CHECKOUT_FAILED: &str =
    "Could not place order. Check that the backend is running, reachable and returns valid JSON.";

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing attempted yet.
    Idle,
    /// Running the gating checks.
    Validating,
    /// Order submitted, waiting for the store's verdict.
    Submitting,
    /// Order placed; the caller should navigate to the confirmation view.
    Succeeded,
    /// Attempt over without an order.
    Failed,
}

/// Everything one checkout attempt looks at, captured once at the start and
/// discarded with the attempt.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutContext<'a> {
    /// Reconciled cart lines being purchased.
    pub lines: &'a [CartLineItem],
    /// Address list and chosen address.
    pub selection: &'a AddressSelection,
    /// Wallet balance at attempt start.
    pub wallet_balance: i64,
}

impl CheckoutContext<'_> {
    /// Client-computed total for the attempt.
    #[must_use]
    pub fn cart_total(&self) -> i64 {
        total_value(self.lines)
    }

    /// Id of the chosen address, if any.
    #[must_use]
    pub fn chosen_address(&self) -> Option<&str> {
        self.selection.selected.as_deref()
    }
}

/// One checkout attempt.
pub struct CheckoutFlow {
    api: Arc<dyn CartApi>,
    session: Arc<dyn SessionStore>,
    notices: Arc<dyn NoticeSink>,
    state: CheckoutState,
}

impl CheckoutFlow {
    /// Create a flow in the `Idle` state.
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
            state: CheckoutState::Idle,
        }
    }

    /// Current state of the attempt.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// Run the attempt: validate, submit, debit.
    ///
    /// Returns `true` only when the order was placed; the caller should then
    /// navigate to its confirmation view. Every failure mode has already
    /// produced its notice (or deliberately stayed silent, for the missing
    /// token) by the time this returns `false`. Wallet balance is untouched
    /// on every failure path.
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub async fn place_order(
        &mut self,
        lines: &[CartLineItem],
        selection: &AddressSelection,
    ) -> bool {
        if self.state != CheckoutState::Idle {
            warn!(state = ?self.state, "checkout flow is terminal, refusing rerun");
            return false;
        }

        let context = CheckoutContext {
            lines,
            selection,
            wallet_balance: self.session.balance(),
        };
        let cart_total = context.cart_total();

        self.transition(CheckoutState::Validating);
        if let Err(blocker) = validate(cart_total, context.wallet_balance, selection) {
            debug!(%blocker, "checkout blocked");
            self.notices.warning(&blocker.to_string());
            self.transition(CheckoutState::Failed);
            return false;
        }

        // Upstream flows guard against reaching checkout logged out, so this
        // branch should be unreachable; it still must not crash, and it makes
        // no call.
        let Some(token) = self.session.token() else {
            debug!("no session at submission, checkout abandoned");
            self.transition(CheckoutState::Failed);
            return false;
        };

        // validate() passed, so a chosen address exists.
        let Some(address_id) = context.chosen_address() else {
            self.transition(CheckoutState::Failed);
            return false;
        };

        self.transition(CheckoutState::Submitting);
        match self.api.checkout(&token, address_id).await {
            Ok(()) => {
                let remaining = context.wallet_balance.saturating_sub(cart_total);
                self.session.set_balance(remaining);
                debug!(cart_total, remaining, "order placed, wallet debited");
                self.notices.success(ORDER_PLACED);
                self.transition(CheckoutState::Succeeded);
                true
            }
            Err(e) => {
                warn!(error = %e, "order placement failed");
                self.notices.error(e.notice_text(CHECKOUT_FAILED));
                self.transition(CheckoutState::Failed);
                false
            }
        }
    }

    fn transition(&mut self, next: CheckoutState) {
        debug!(from = ?self.state, to = ?next, "checkout transition");
        self.state = next;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use kirana_core::{AddressRecord, CartEntry, ProductRecord};

    use crate::api::ApiError;
    use crate::notice::{RecordingNoticeSink, Severity};
    use crate::session::MemorySessionStore;

    use super::*;

    struct FakeCheckoutApi {
        calls: AtomicUsize,
        response: Mutex<Option<Result<(), ApiError>>>,
    }

    impl FakeCheckoutApi {
        fn answering(response: Result<(), ApiError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Mutex::new(Some(response)),
            }
        }
    }

    #[async_trait]
    impl CartApi for FakeCheckoutApi {
        async fn entries(&self, _token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
            Ok(Vec::new())
        }

        async fn upsert(
            &self,
            _token: &SecretString,
            _item_id: &str,
            _quantity: i64,
        ) -> Result<Vec<CartEntry>, ApiError> {
            Ok(Vec::new())
        }

        async fn checkout(&self, _token: &SecretString, _address_id: &str) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("fake checkout called more times than scripted")
        }
    }

    fn lines(cost: i64, quantity: i64) -> Vec<CartLineItem> {
        vec![CartLineItem {
            product: ProductRecord {
                id: "p1".to_owned(),
                name: "Basketball".to_owned(),
                category: "Sports".to_owned(),
                cost,
                rating: 5,
                image_url: String::new(),
            },
            quantity,
        }]
    }

    fn selection_with(id: &str) -> AddressSelection {
        AddressSelection {
            all: vec![AddressRecord {
                id: id.to_owned(),
                text: "12 Main St".to_owned(),
            }],
            selected: Some(id.to_owned()),
        }
    }

    fn flow_with(
        api: FakeCheckoutApi,
        session: MemorySessionStore,
    ) -> (
        CheckoutFlow,
        Arc<FakeCheckoutApi>,
        Arc<MemorySessionStore>,
        Arc<RecordingNoticeSink>,
    ) {
        let api = Arc::new(api);
        let session = Arc::new(session);
        let notices = Arc::new(RecordingNoticeSink::new());
        let flow = CheckoutFlow::new(api.clone(), session.clone(), notices.clone());
        (flow, api, session, notices)
    }

    #[tokio::test]
    async fn test_success_debits_wallet_and_signals_navigation() {
        let (mut flow, _api, session, notices) = flow_with(
            FakeCheckoutApi::answering(Ok(())),
            MemorySessionStore::logged_in("testtoken", "crio-user", 5000),
        );

        let placed = flow.place_order(&lines(20, 2), &selection_with("a1")).await;

        assert!(placed);
        assert_eq!(flow.state(), CheckoutState::Succeeded);
        assert_eq!(session.balance(), 4960);
        assert_eq!(
            notices.notices(),
            vec![(Severity::Success, ORDER_PLACED.to_owned())]
        );
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_call() {
        let (mut flow, api, session, notices) = flow_with(
            FakeCheckoutApi::answering(Ok(())),
            MemorySessionStore::logged_in("testtoken", "crio-user", 50),
        );

        let placed = flow.place_order(&lines(100, 1), &selection_with("a1")).await;

        assert!(!placed);
        assert_eq!(flow.state(), CheckoutState::Failed);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.balance(), 50);
        assert_eq!(
            notices.notices(),
            vec![(
                Severity::Warning,
                "You do not have enough balance in your wallet for this purchase".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn test_rejection_leaves_wallet_untouched_and_relays_message() {
        let (mut flow, _api, session, notices) = flow_with(
            FakeCheckoutApi::answering(Err(ApiError::Rejected {
                status: 400,
                message: "Wallet balance not sufficient to place order".to_owned(),
            })),
            MemorySessionStore::logged_in("testtoken", "crio-user", 5000),
        );

        let placed = flow.place_order(&lines(20, 2), &selection_with("a1")).await;

        assert!(!placed);
        assert_eq!(flow.state(), CheckoutState::Failed);
        assert_eq!(session.balance(), 5000);
        assert_eq!(
            notices.notices(),
            vec![(
                Severity::Error,
                "Wallet balance not sufficient to place order".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_uses_generic_notice() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let (mut flow, _api, session, notices) = flow_with(
            FakeCheckoutApi::answering(Err(ApiError::from(parse_err))),
            MemorySessionStore::logged_in("testtoken", "crio-user", 5000),
        );

        let placed = flow.place_order(&lines(20, 2), &selection_with("a1")).await;

        assert!(!placed);
        assert_eq!(session.balance(), 5000);
        assert_eq!(
            notices.notices(),
            vec![(Severity::Error, CHECKOUT_FAILED.to_owned())]
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_silently_after_validation() {
        let session = MemorySessionStore::new();
        session.set_balance(5000);
        let (mut flow, api, _session, notices) =
            flow_with(FakeCheckoutApi::answering(Ok(())), session);

        let placed = flow.place_order(&lines(20, 2), &selection_with("a1")).await;

        assert!(!placed);
        assert_eq!(flow.state(), CheckoutState::Failed);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert!(notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_flow_is_terminal_per_invocation() {
        let (mut flow, api, _session, _notices) = flow_with(
            FakeCheckoutApi::answering(Ok(())),
            MemorySessionStore::logged_in("testtoken", "crio-user", 5000),
        );

        assert!(flow.place_order(&lines(20, 2), &selection_with("a1")).await);
        // A second run on the same flow is refused outright.
        assert!(!flow.place_order(&lines(20, 2), &selection_with("a1")).await);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_address_precedence_after_balance() {
        let (mut flow, api, _session, notices) = flow_with(
            FakeCheckoutApi::answering(Ok(())),
            MemorySessionStore::logged_in("testtoken", "crio-user", 5000),
        );

        let placed = flow
            .place_order(&lines(20, 2), &AddressSelection::default())
            .await;

        assert!(!placed);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            notices.notices(),
            vec![(
                Severity::Warning,
                "Please select one shipping address to proceed.".to_owned()
            )]
        );
    }
}
