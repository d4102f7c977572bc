//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! kirana cart show
//! kirana cart add <PRODUCT_ID>
//! kirana cart set-qty <PRODUCT_ID> 3
//! kirana cart set-qty <PRODUCT_ID> 0   # removes the item
//! ```

use tracing::info;

use kirana_client::cart::{CartGateway, DuplicatePolicy};
use kirana_client::session::SessionStore;
use kirana_core::{reconcile, total_value};

use super::{Store, catalog};

/// Show cart lines and the order total.
///
/// # Errors
///
/// Returns an error when not logged in or the cart or catalog cannot be
/// loaded.
pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    store.require_session()?;

    let mut cart = gateway(&store);
    if !cart.refresh().await {
        return Err("could not load the cart".into());
    }

    if cart.entries().is_empty() {
        info!("Cart is empty");
        return Ok(());
    }

    let products = catalog::fetch(&store, None).await?;
    let lines = reconcile(cart.entries(), &products);

    info!("Cart has {} lines:", lines.len());
    for line in &lines {
        info!(
            "  {} x {} @ ₹{} = ₹{}",
            line.quantity,
            line.product.name,
            line.product.cost,
            line.line_total()
        );
    }
    info!("Order total: ₹{}", total_value(&lines));
    Ok(())
}

/// Add one unit of a product, refusing when it is already in the cart.
///
/// # Errors
///
/// Returns an error when the cart was not updated; the reason has already
/// been reported through the notice sink.
pub async fn add(product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;

    let mut cart = gateway(&store);
    // Duplicate prevention compares against the store's cart, so load it
    // first when a session exists. Logged out, add_or_update warns itself.
    if store.session.token().is_some() && !cart.refresh().await {
        return Err("could not load the cart".into());
    }

    if cart
        .add_or_update(product_id, 1, DuplicatePolicy::Prevent)
        .await
    {
        info!("Added to cart ({} lines now)", cart.entries().len());
        Ok(())
    } else {
        Err("cart was not updated".into())
    }
}

/// Set the quantity of a product; 0 removes it.
///
/// # Errors
///
/// Returns an error when the cart was not updated; the reason has already
/// been reported through the notice sink.
pub async fn set_qty(product_id: &str, qty: i64) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;

    let mut cart = gateway(&store);
    if cart
        .add_or_update(product_id, qty, DuplicatePolicy::Allow)
        .await
    {
        if qty == 0 {
            info!("Removed from cart ({} lines now)", cart.entries().len());
        } else {
            info!("Quantity set to {qty}");
        }
        Ok(())
    } else {
        Err("cart was not updated".into())
    }
}

fn gateway(store: &Store) -> CartGateway {
    CartGateway::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    )
}
