//! reqwest-backed implementation of the store API traits.
//!
//! One shared HTTP client behind an `Arc`, JSON in and out via `serde`.
//! Responses are read as text first so a failure body can be inspected for a
//! structured message before being declared unreachable-class. The full
//! catalog is cached with `moka` (5-minute TTL); search and every
//! authenticated call go to the network each time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use async_trait::async_trait;

use kirana_core::{AddressRecord, CartEntry, ProductRecord};

use crate::config::ClientConfig;

use super::{AddressApi, ApiError, AuthApi, CartApi, CatalogApi, LoginSession};

/// Cache key for the one cacheable read, the full catalog.
const CATALOG_CACHE_KEY: &str = "catalog";

/// How long a cached catalog stays fresh.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Client for the Kirana store REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool and the catalog
/// cache.
#[derive(Clone)]
pub struct HttpStoreClient {
    inner: Arc<HttpStoreClientInner>,
}

struct HttpStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog_cache: Cache<String, Arc<Vec<ProductRecord>>>,
}

impl HttpStoreClient {
    /// Create a new store API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(HttpStoreClientInner {
                client,
                base_url: config.api_url.clone(),
                catalog_cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        read_json(request.send().await?).await
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Shape of a structured failure body.
#[derive(Debug, Deserialize)]
struct FailureBody {
    message: String,
}

/// Decode a success response, or classify a failure one.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(rejection(status, &text));
    }

    Ok(serde_json::from_str(&text)?)
}

/// Check a response where only success matters, discarding any body.
async fn read_empty(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let text = response.text().await?;
    Err(rejection(status, &text))
}

/// Classify a non-success response.
///
/// A body that parses to `{message}` is a structured rejection and its
/// message travels verbatim to the caller. Anything else (an HTML error
/// page, an empty body) is connectivity-class: the caller will show a
/// generic notice, so the raw body only goes to the log.
fn rejection(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<FailureBody>(body) {
        Ok(failure) => ApiError::Rejected {
            status: status.as_u16(),
            message: failure.message,
        },
        Err(e) => {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Store API returned non-success status without a structured message"
            );
            ApiError::Parse(e)
        }
    }
}

// =============================================================================
// Trait implementations
// =============================================================================

#[async_trait]
impl CatalogApi for HttpStoreClient {
    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<ProductRecord>, ApiError> {
        if let Some(cached) = self.inner.catalog_cache.get(CATALOG_CACHE_KEY).await {
            debug!("catalog cache hit");
            return Ok(cached.as_ref().clone());
        }

        let url = self.endpoint("products")?;
        let products: Vec<ProductRecord> = self.get_json(url, None).await?;

        self.inner
            .catalog_cache
            .insert(CATALOG_CACHE_KEY.to_owned(), Arc::new(products.clone()))
            .await;
        debug!(count = products.len(), "catalog fetched and cached");

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn search(&self, value: &str) -> Result<Vec<ProductRecord>, ApiError> {
        let mut url = self.endpoint("products/search")?;
        url.query_pairs_mut().append_pair("value", value);

        let response = self.inner.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            // The store answers not-found for a query with no matches; that
            // is a successful empty result, not an error.
            debug!("search matched nothing");
            return Ok(Vec::new());
        }

        read_json(response).await
    }
}

#[async_trait]
impl CartApi for HttpStoreClient {
    #[instrument(skip(self, token))]
    async fn entries(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.endpoint("cart")?;
        self.get_json(url, Some(token)).await
    }

    #[instrument(skip(self, token), fields(item_id = %item_id, quantity))]
    async fn upsert(
        &self,
        token: &SecretString,
        item_id: &str,
        quantity: i64,
    ) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.endpoint("cart")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&serde_json::json!({ "productId": item_id, "qty": quantity }))
            .send()
            .await?;

        read_json(response).await
    }

    #[instrument(skip(self, token), fields(address_id = %address_id))]
    async fn checkout(&self, token: &SecretString, address_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint("cart/checkout")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&serde_json::json!({ "addressId": address_id }))
            .send()
            .await?;

        read_empty(response).await
    }
}

#[async_trait]
impl AddressApi for HttpStoreClient {
    #[instrument(skip(self, token))]
    async fn list(&self, token: &SecretString) -> Result<Vec<AddressRecord>, ApiError> {
        let url = self.endpoint("user/addresses")?;
        self.get_json(url, Some(token)).await
    }

    #[instrument(skip(self, token, text))]
    async fn add(&self, token: &SecretString, text: &str) -> Result<Vec<AddressRecord>, ApiError> {
        let url = self.endpoint("user/addresses")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&serde_json::json!({ "address": text }))
            .send()
            .await?;

        read_json(response).await
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn remove(
        &self,
        token: &SecretString,
        id: &str,
    ) -> Result<Vec<AddressRecord>, ApiError> {
        let url = self.endpoint(&format!("user/addresses/{id}"))?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        read_json(response).await
    }
}

#[async_trait]
impl AuthApi for HttpStoreClient {
    #[instrument(skip(self, password), fields(username = %username))]
    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self.endpoint("auth/register")?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        read_empty(response).await
    }

    #[instrument(skip(self, password), fields(username = %username))]
    async fn login(&self, username: &str, password: &str) -> Result<LoginSession, ApiError> {
        let url = self.endpoint("auth/login")?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        read_json(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_with_structured_body() {
        let err = rejection(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Username is already taken"}"#,
        );
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Username is already taken");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_rejection_with_unstructured_body_is_parse_class() {
        let err = rejection(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ApiError::Parse(_)));
        assert!(err.server_message().is_none());
    }

    #[test]
    fn test_endpoint_joins_under_base() {
        let config = ClientConfig {
            api_url: Url::parse("http://localhost:8082/api/v1/").unwrap(),
            session_file: "kirana-session.json".into(),
            search_debounce: Duration::from_millis(500),
            http_timeout: Duration::from_secs(30),
        };
        let client = HttpStoreClient::new(&config).unwrap();

        let url = client.endpoint("products/search").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8082/api/v1/products/search");
    }
}
