//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! kirana checkout --address <ADDRESS_ID>
//! ```
//!
//! Assembles everything one attempt needs: the cart joined against the
//! catalog, the address book with the chosen address, and the checkout flow
//! itself. The flow reports every outcome through the notice sink; on
//! success the remaining wallet balance is shown.

use tracing::info;

use kirana_client::addresses::AddressBook;
use kirana_client::cart::CartGateway;
use kirana_client::checkout::CheckoutFlow;
use kirana_client::notice::NoticeSink;
use kirana_client::session::SessionStore;
use kirana_core::reconcile;

use super::{Store, catalog};

/// Route-guard notice for checkout without a session.
const LOGIN_TO_CHECKOUT: &str = "You must be logged in to access checkout page";

/// Place the order for the current cart.
///
/// # Errors
///
/// Returns an error when the cart, catalog or addresses cannot be loaded,
/// the address id does not resolve, or the order was not placed.
pub async fn place_order(address_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;

    // Guard the whole command rather than erroring: logged out, checkout is
    // not reachable at all.
    if store.session.token().is_none() {
        store.notices.warning(LOGIN_TO_CHECKOUT);
        return Ok(());
    }

    let mut cart = CartGateway::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    );
    if !cart.refresh().await {
        return Err("could not load the cart".into());
    }

    let products = catalog::fetch(&store, None).await?;
    let lines = reconcile(cart.entries(), &products);

    let mut book = AddressBook::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    );
    if !book.refresh().await {
        return Err("could not load addresses".into());
    }
    if !book.select(address_id) {
        return Err(format!(
            "no address with id {address_id}. Run `kirana address list` to see what is on file"
        )
        .into());
    }

    let mut flow = CheckoutFlow::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    );
    if flow.place_order(&lines, book.selection()).await {
        info!("Remaining wallet balance: ₹{}", store.session.balance());
        Ok(())
    } else {
        Err("order was not placed".into())
    }
}
