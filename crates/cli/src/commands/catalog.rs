//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! kirana products
//! kirana products --search sneaker
//! ```

use tracing::info;

use kirana_client::api::CatalogApi;
use kirana_client::notice::NoticeSink;
use kirana_client::search::PRODUCTS_FETCH_FAILED;
use kirana_core::ProductRecord;

use super::Store;

/// List the catalog, optionally filtered by a search term.
///
/// # Errors
///
/// Returns an error when wiring fails or the catalog cannot be loaded.
pub async fn products(search: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    let products = fetch(&store, search).await?;

    if products.is_empty() {
        info!("No products found");
        return Ok(());
    }

    info!("Found {} products", products.len());
    for product in &products {
        info!(
            "  {} | {} ({}) ₹{} rated {}/5",
            product.id, product.name, product.category, product.cost, product.rating
        );
    }
    Ok(())
}

/// Fetch the catalog, or the search results for `search`.
///
/// A no-match search is a successful empty list. On failure the connectivity
/// notice has already been emitted when this returns.
pub(crate) async fn fetch(
    store: &Store,
    search: Option<&str>,
) -> Result<Vec<ProductRecord>, Box<dyn std::error::Error>> {
    let result = match search {
        Some(term) => store.api.search(term).await,
        None => store.api.products().await,
    };

    match result {
        Ok(products) => Ok(products),
        Err(e) => {
            store.notices.error(e.notice_text(PRODUCTS_FETCH_FAILED));
            Err("could not load the catalog".into())
        }
    }
}
