//! Catalog listing, caching and search against the stub store.

use std::time::Duration;

use kirana_client::api::CatalogApi;
use kirana_client::search::LiveSearch;
use kirana_integration_tests::TestContext;

#[tokio::test]
async fn test_full_catalog_is_listed() {
    let ctx = TestContext::start().await;

    let products = ctx.api.products().await.expect("catalog");

    assert_eq!(products.len(), 5);
    let shoes = products
        .iter()
        .find(|p| p.id == "TwMM4OAhmK0VQ93S")
        .expect("seeded product");
    assert_eq!(shoes.name, "UNIFACTOR Mens Running Shoes");
    assert_eq!(shoes.category, "Sports");
    assert_eq!(shoes.cost, 50);
    assert_eq!(shoes.rating, 5);
}

#[tokio::test]
async fn test_catalog_is_served_from_cache_on_repeat_reads() {
    let ctx = TestContext::start().await;

    let first = ctx.api.products().await.expect("catalog");
    let second = ctx.api.products().await.expect("catalog");

    assert_eq!(first, second);
    assert_eq!(ctx.store.catalog_requests(), 1);
}

#[tokio::test]
async fn test_search_matches_names_case_insensitively() {
    let ctx = TestContext::start().await;

    let products = ctx.api.search("running").await.expect("search");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "UNIFACTOR Mens Running Shoes");
}

#[tokio::test]
async fn test_search_matches_categories() {
    let ctx = TestContext::start().await;

    let mut products = ctx.api.search("sports").await.expect("search");
    products.sort_by(|a, b| a.id.cmp(&b.id));

    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "UNIFACTOR Mens Running Shoes",
            "YONEX Smash Badminton Racquet",
        ]
    );
}

#[tokio::test]
async fn test_search_miss_is_an_empty_list_not_an_error() {
    let ctx = TestContext::start().await;

    let products = ctx.api.search("no such thing").await.expect("search");

    assert!(products.is_empty());
}

#[tokio::test]
async fn test_search_bypasses_the_catalog_cache() {
    let ctx = TestContext::start().await;

    ctx.api.products().await.expect("catalog");
    let products = ctx.api.search("duffle").await.expect("search");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "KCRwjF7lN97HnEaY");
}

#[tokio::test]
async fn test_live_search_delivers_results_over_the_wire() {
    let ctx = TestContext::start().await;

    let mut search = LiveSearch::new(
        ctx.api.clone(),
        ctx.notices.clone(),
        Duration::from_millis(50),
    );
    let mut results = search.results();

    // Rapid keystrokes; only the last survives the debounce window.
    search.keystroke("run");
    search.keystroke("running");

    tokio::time::timeout(Duration::from_secs(5), results.changed())
        .await
        .expect("a search result within the timeout")
        .expect("results channel open");

    let products = results.borrow().clone();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "UNIFACTOR Mens Running Shoes");
}
