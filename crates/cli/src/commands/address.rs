//! Shipping address commands.
//!
//! # Usage
//!
//! ```bash
//! kirana address list
//! kirana address add "221B Baker Street, London"
//! kirana address remove <ADDRESS_ID>
//! ```

use tracing::info;

use kirana_client::addresses::AddressBook;

use super::Store;

/// List addresses on file.
///
/// # Errors
///
/// Returns an error when not logged in or the addresses cannot be loaded.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    store.require_session()?;

    let mut book = address_book(&store);
    if !book.refresh().await {
        return Err("could not load addresses".into());
    }

    if book.records().is_empty() {
        info!("No addresses on file");
        return Ok(());
    }

    info!("{} addresses on file:", book.records().len());
    for record in book.records() {
        info!("  {} | {}", record.id, record.text);
    }
    Ok(())
}

/// Add a new address.
///
/// # Errors
///
/// Returns an error when not logged in or the address was not added; the
/// reason has already been reported through the notice sink.
pub async fn add(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    store.require_session()?;

    let mut book = address_book(&store);
    // The new record is spotted as the id absent from the previous list, so
    // the previous list has to be loaded first.
    if !book.refresh().await {
        return Err("could not load addresses".into());
    }
    if book.add(text).await {
        match book.selection().selected.as_deref() {
            Some(id) => info!("Address added with id {id}"),
            None => info!("Address added"),
        }
        Ok(())
    } else {
        Err("address was not added".into())
    }
}

/// Delete an address.
///
/// # Errors
///
/// Returns an error when not logged in or the address was not deleted; the
/// reason has already been reported through the notice sink.
pub async fn remove(address_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    store.require_session()?;

    let mut book = address_book(&store);
    if book.remove(address_id).await {
        info!("Address removed ({} left on file)", book.records().len());
        Ok(())
    } else {
        Err("address was not deleted".into())
    }
}

fn address_book(store: &Store) -> AddressBook {
    AddressBook::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    )
}
