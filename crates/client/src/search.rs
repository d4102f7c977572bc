//! Debounced catalog search.
//!
//! Every keystroke restarts a single cooperative timer; only the last
//! keystroke inside the window issues a network call. Once the timer fires
//! the lookup is detached into its own task, so a later keystroke can abort
//! an armed timer but never an in-flight request. Superseded responses are
//! tolerated rather than cancelled: results land in a watch channel and
//! whichever response arrives last overwrites.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use kirana_core::ProductRecord;

use crate::api::CatalogApi;
use crate::notice::NoticeSink;

/// Generic notice when a catalog lookup fails.
pub const PRODUCTS_FETCH_FAILED: &str =
    "Could not fetch products. Check that the backend is running, reachable and returns valid JSON.";

/// Keystroke-driven product search with a restartable debounce window.
pub struct LiveSearch {
    api: Arc<dyn CatalogApi>,
    notices: Arc<dyn NoticeSink>,
    delay: Duration,
    results_tx: Arc<watch::Sender<Vec<ProductRecord>>>,
    results_rx: watch::Receiver<Vec<ProductRecord>>,
    pending: Option<JoinHandle<()>>,
}

impl LiveSearch {
    /// Create a search with the given debounce window.
    #[must_use]
    pub fn new(api: Arc<dyn CatalogApi>, notices: Arc<dyn NoticeSink>, delay: Duration) -> Self {
        let (results_tx, results_rx) = watch::channel(Vec::new());
        Self {
            api,
            notices,
            delay,
            results_tx: Arc::new(results_tx),
            results_rx,
            pending: None,
        }
    }

    /// Subscribe to search results. Each fired lookup that succeeds replaces
    /// the current value.
    #[must_use]
    pub fn results(&self) -> watch::Receiver<Vec<ProductRecord>> {
        self.results_rx.clone()
    }

    /// The most recently landed result set.
    #[must_use]
    pub fn latest(&self) -> Vec<ProductRecord> {
        self.results_rx.borrow().clone()
    }

    /// Record a keystroke: restart the debounce window around the new text.
    ///
    /// The text is passed to the store as typed, empty input included; the
    /// store decides what an empty search means.
    pub fn keystroke(&mut self, text: &str) {
        if let Some(pending) = self.pending.take() {
            // Only an armed timer can be stopped. A fired timer has already
            // detached its lookup and this abort is a no-op.
            pending.abort();
        }

        let api = self.api.clone();
        let notices = self.notices.clone();
        let results = self.results_tx.clone();
        let query = text.to_owned();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The window elapsed without another keystroke. From here the
            // lookup runs detached so nothing can cancel it mid-flight.
            tokio::spawn(async move {
                debug!(query, "debounce window elapsed, searching");
                match api.search(&query).await {
                    Ok(products) => {
                        // Last response wins; no receivers means nobody is
                        // looking at results any more.
                        let _ = results.send(products);
                    }
                    Err(e) => {
                        warn!(error = %e, query, "product search failed");
                        notices.error(e.notice_text(PRODUCTS_FETCH_FAILED));
                    }
                }
            });
        }));
    }
}

impl Drop for LiveSearch {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
