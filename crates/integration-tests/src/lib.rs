//! Integration tests for Kirana.
//!
//! [`StubStore`] hosts the store API in process on an ephemeral port, so the
//! tests under `tests/` drive the real HTTP client end to end without any
//! external service. Each stub owns its own in-memory state; every test
//! starts a fresh one. [`TestContext`] bundles a stub with a wired client
//! stack (HTTP client, in-memory session, recording notice sink).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kirana-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration and login against the stub
//! - `catalog_search` - Catalog listing, caching and search
//! - `cart_flow` - Cart mutations and reconciliation
//! - `checkout_flow` - Order placement and wallet movements

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

use kirana_client::addresses::AddressBook;
use kirana_client::api::HttpStoreClient;
use kirana_client::auth::AuthFlow;
use kirana_client::cart::CartGateway;
use kirana_client::checkout::CheckoutFlow;
use kirana_client::config::{
    ClientConfig, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SEARCH_DEBOUNCE_MS,
};
use kirana_client::notice::RecordingNoticeSink;
use kirana_client::session::MemorySessionStore;

/// Wallet balance a freshly registered user starts with.
pub const STARTING_BALANCE: i64 = 500;

// =============================================================================
// Stub state
// =============================================================================

#[derive(Clone)]
struct StubUser {
    password: String,
    balance: i64,
}

struct StubState {
    products: Vec<Value>,
    catalog_requests: AtomicUsize,
    users: Mutex<HashMap<String, StubUser>>,
    sessions: Mutex<HashMap<String, String>>,
    carts: Mutex<HashMap<String, Vec<(String, i64)>>>,
    addresses: Mutex<HashMap<String, Vec<(String, String)>>>,
    checkout_rejection: Mutex<Option<String>>,
}

/// The catalog every stub starts with.
fn default_catalog() -> Vec<Value> {
    vec![
        json!({
            "_id": "KCRwjF7lN97HnEaY",
            "name": "Tan Leatherette Weekender Duffle",
            "category": "Fashion",
            "cost": 150,
            "rating": 4,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/duffle.png",
        }),
        json!({
            "_id": "BW0jAAeDJmlZCF8i",
            "name": "The Minimalist Slim Leather Watch",
            "category": "Electronics",
            "cost": 60,
            "rating": 5,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/watch.png",
        }),
        json!({
            "_id": "PmInA797xJhMIPti",
            "name": "Borosil Glass Paper Cup Set",
            "category": "Essentials",
            "cost": 20,
            "rating": 4,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/cups.png",
        }),
        json!({
            "_id": "TwMM4OAhmK0VQ93S",
            "name": "UNIFACTOR Mens Running Shoes",
            "category": "Sports",
            "cost": 50,
            "rating": 5,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/shoes.png",
        }),
        json!({
            "_id": "upLK9JbQ4rMhTwt4",
            "name": "YONEX Smash Badminton Racquet",
            "category": "Sports",
            "cost": 100,
            "rating": 5,
            "image": "https://crio-directus-assets.s3.ap-south-1.amazonaws.com/racquet.png",
        }),
    ]
}

// =============================================================================
// The stub server
// =============================================================================

/// An in-process store speaking the wire protocol the client expects.
pub struct StubStore {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubStore {
    /// Bind the stub to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics when no loopback port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            products: default_catalog(),
            catalog_requests: AtomicUsize::new(0),
            users: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            carts: Mutex::new(HashMap::new()),
            addresses: Mutex::new(HashMap::new()),
            checkout_rejection: Mutex::new(None),
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener address");
        let app = router(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub store");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL including the API version prefix.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Client configuration pointed at this stub.
    ///
    /// # Panics
    ///
    /// Panics when the stub address does not form a valid URL, which cannot
    /// happen for a bound listener.
    #[must_use]
    pub fn client_config(&self, session_file: PathBuf) -> ClientConfig {
        let api_url =
            Url::parse(&format!("{}/", self.api_url())).expect("stub url is always parseable");
        ClientConfig {
            api_url,
            session_file,
            search_debounce: std::time::Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            http_timeout: std::time::Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Create a user directly in stub state, skipping registration.
    pub fn seed_user(&self, username: &str, password: &str, balance: i64) {
        self.state
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                username.to_owned(),
                StubUser {
                    password: password.to_owned(),
                    balance,
                },
            );
    }

    /// Script the next checkout call to fail with `message`.
    pub fn reject_next_checkout(&self, message: &str) {
        *self
            .state
            .checkout_rejection
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_owned());
    }

    /// The user's wallet balance as the stub sees it.
    #[must_use]
    pub fn wallet(&self, username: &str) -> Option<i64> {
        self.state
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .map(|user| user.balance)
    }

    /// The user's cart as the stub sees it, in insertion order.
    #[must_use]
    pub fn cart_entries(&self, username: &str) -> Vec<(String, i64)> {
        self.state
            .carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times the full catalog was requested.
    #[must_use]
    pub fn catalog_requests(&self) -> usize {
        self.state.catalog_requests.load(Ordering::SeqCst)
    }
}

impl Drop for StubStore {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Wired test stack
// =============================================================================

/// A stub plus the client stack the flows run on.
pub struct TestContext {
    pub store: StubStore,
    pub api: Arc<HttpStoreClient>,
    pub session: Arc<MemorySessionStore>,
    pub notices: Arc<RecordingNoticeSink>,
}

impl TestContext {
    /// Start a stub and wire a client stack against it.
    ///
    /// # Panics
    ///
    /// Panics when the stub cannot be started or the client cannot be built.
    pub async fn start() -> Self {
        let store = StubStore::start().await;
        let config = store.client_config(PathBuf::from("kirana-session.json"));
        let api = Arc::new(HttpStoreClient::new(&config).expect("stub client"));
        Self {
            store,
            api,
            session: Arc::new(MemorySessionStore::new()),
            notices: Arc::new(RecordingNoticeSink::new()),
        }
    }

    /// Seed a user with `balance` and sign them in through the real login
    /// endpoint. Discards the login notice so tests start clean.
    ///
    /// # Panics
    ///
    /// Panics when the seeded login is refused.
    pub async fn login_seeded(&self, username: &str, balance: i64) {
        self.store.seed_user(username, "password1", balance);
        let flow = self.auth();
        assert!(flow.login(username, "password1").await, "seeded login failed");
        self.notices.take();
    }

    /// An auth flow on this context's stack.
    #[must_use]
    pub fn auth(&self) -> AuthFlow {
        AuthFlow::new(self.api.clone(), self.session.clone(), self.notices.clone())
    }

    /// A cart gateway on this context's stack.
    #[must_use]
    pub fn cart(&self) -> CartGateway {
        CartGateway::new(self.api.clone(), self.session.clone(), self.notices.clone())
    }

    /// An address book on this context's stack.
    #[must_use]
    pub fn addresses(&self) -> AddressBook {
        AddressBook::new(self.api.clone(), self.session.clone(), self.notices.clone())
    }

    /// A checkout flow on this context's stack.
    #[must_use]
    pub fn checkout(&self) -> CheckoutFlow {
        CheckoutFlow::new(self.api.clone(), self.session.clone(), self.notices.clone())
    }
}

// =============================================================================
// Router and handlers
// =============================================================================

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/search", get(search_products))
        .route("/api/v1/cart", get(get_cart).post(post_cart))
        .route("/api/v1/cart/checkout", post(post_checkout))
        .route(
            "/api/v1/user/addresses",
            get(list_addresses).post(post_address),
        )
        .route("/api/v1/user/addresses/{id}", delete(delete_address))
        .route("/api/v1/auth/register", post(post_register))
        .route("/api/v1/auth/login", post(post_login))
        .with_state(state)
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

/// Resolve the bearer token to a username, or produce the 401 the real
/// store sends.
fn bearer_user(state: &StubState, headers: &HeaderMap) -> Result<String, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let Some(token) = token else {
        return Err(failure(
            StatusCode::UNAUTHORIZED,
            "Protected route, Oauth2 Bearer token not found in header",
        ));
    };
    state
        .sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(token)
        .cloned()
        .ok_or_else(|| {
            failure(
                StatusCode::UNAUTHORIZED,
                "Protected route, Oauth2 Bearer token invalid",
            )
        })
}

async fn list_products(State(state): State<Arc<StubState>>) -> Json<Value> {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    Json(Value::Array(state.products.clone()))
}

async fn search_products(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let needle = params
        .get("value")
        .cloned()
        .unwrap_or_default()
        .to_lowercase();
    let matches: Vec<Value> = state
        .products
        .iter()
        .filter(|product| {
            ["name", "category"].iter().any(|field| {
                product
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect();

    if matches.is_empty() {
        return failure(StatusCode::NOT_FOUND, "No products found");
    }
    Json(Value::Array(matches)).into_response()
}

fn credentials(body: &Value) -> Option<(String, String)> {
    let username = body.get("username")?.as_str()?.to_owned();
    let password = body.get("password")?.as_str()?.to_owned();
    Some((username, password))
}

async fn post_register(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    let Some((username, password)) = credentials(&body) else {
        return failure(StatusCode::BAD_REQUEST, "\"username\" is required");
    };

    let mut users = state.users.lock().unwrap_or_else(PoisonError::into_inner);
    if users.contains_key(&username) {
        return failure(StatusCode::BAD_REQUEST, "Username is already taken");
    }
    users.insert(
        username,
        StubUser {
            password,
            balance: STARTING_BALANCE,
        },
    );
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

async fn post_login(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    let Some((username, password)) = credentials(&body) else {
        return failure(StatusCode::BAD_REQUEST, "\"username\" is required");
    };

    let balance = {
        let users = state.users.lock().unwrap_or_else(PoisonError::into_inner);
        match users.get(&username) {
            Some(user) if user.password == password => user.balance,
            Some(_) => return failure(StatusCode::BAD_REQUEST, "Password is incorrect"),
            None => return failure(StatusCode::BAD_REQUEST, "Username does not exist"),
        }
    };

    let token = Uuid::new_v4().simple().to_string();
    state
        .sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(token.clone(), username.clone());

    Json(json!({
        "success": true,
        "token": token,
        "username": username,
        "balance": balance,
    }))
    .into_response()
}

fn cart_json(state: &StubState, username: &str) -> Value {
    let carts = state.carts.lock().unwrap_or_else(PoisonError::into_inner);
    let entries = carts.get(username).cloned().unwrap_or_default();
    Value::Array(
        entries
            .iter()
            .map(|(id, qty)| json!({ "productId": id, "qty": qty }))
            .collect(),
    )
}

async fn get_cart(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let username = match bearer_user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    Json(cart_json(&state, &username)).into_response()
}

async fn post_cart(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let username = match bearer_user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let Some(product_id) = body.get("productId").and_then(Value::as_str) else {
        return failure(StatusCode::BAD_REQUEST, "\"productId\" is required");
    };
    let qty = body.get("qty").and_then(Value::as_i64).unwrap_or(0);

    let known = state
        .products
        .iter()
        .any(|product| product.get("_id").and_then(Value::as_str) == Some(product_id));
    if !known {
        return failure(StatusCode::BAD_REQUEST, "Product doesn't exist in database");
    }

    {
        let mut carts = state.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = carts.entry(username.clone()).or_default();
        if let Some(entry) = entries.iter_mut().find(|(id, _)| id == product_id) {
            entry.1 = qty;
        } else if qty > 0 {
            entries.push((product_id.to_owned(), qty));
        }
        entries.retain(|(_, quantity)| *quantity > 0);
    }
    Json(cart_json(&state, &username)).into_response()
}

fn order_total(state: &StubState, username: &str) -> i64 {
    let carts = state.carts.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(entries) = carts.get(username) else {
        return 0;
    };
    entries
        .iter()
        .map(|(id, qty)| {
            let cost = state
                .products
                .iter()
                .find(|product| product.get("_id").and_then(Value::as_str) == Some(id.as_str()))
                .and_then(|product| product.get("cost"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            cost.saturating_mul(*qty)
        })
        .sum()
}

async fn post_checkout(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let username = match bearer_user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };

    let scripted = state
        .checkout_rejection
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(message) = scripted {
        return failure(StatusCode::BAD_REQUEST, &message);
    }

    let Some(address_id) = body.get("addressId").and_then(Value::as_str) else {
        return failure(StatusCode::BAD_REQUEST, "\"addressId\" is required");
    };
    let has_address = state
        .addresses
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&username)
        .is_some_and(|list| list.iter().any(|(id, _)| id == address_id));
    if !has_address {
        return failure(StatusCode::BAD_REQUEST, "Address not found");
    }

    let total = order_total(&state, &username);
    if total == 0 {
        return failure(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    {
        let mut users = state.users.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(user) = users.get_mut(&username) else {
            return failure(StatusCode::BAD_REQUEST, "User not found");
        };
        if total > user.balance {
            return failure(
                StatusCode::BAD_REQUEST,
                "Wallet balance not sufficient to place order",
            );
        }
        user.balance -= total;
    }
    state
        .carts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&username);

    Json(json!({ "success": true })).into_response()
}

fn addresses_json(state: &StubState, username: &str) -> Value {
    let addresses = state
        .addresses
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let list = addresses.get(username).cloned().unwrap_or_default();
    Value::Array(
        list.iter()
            .map(|(id, text)| json!({ "_id": id, "address": text }))
            .collect(),
    )
}

async fn list_addresses(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let username = match bearer_user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    Json(addresses_json(&state, &username)).into_response()
}

async fn post_address(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let username = match bearer_user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let Some(text) = body.get("address").and_then(Value::as_str) else {
        return failure(StatusCode::BAD_REQUEST, "\"address\" is required");
    };
    if text.chars().count() < 20 {
        return failure(
            StatusCode::BAD_REQUEST,
            "Address should be greater than 20 characters",
        );
    }

    let id = Uuid::new_v4().simple().to_string();
    state
        .addresses
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(username.clone())
        .or_default()
        .push((id, text.to_owned()));

    Json(addresses_json(&state, &username)).into_response()
}

async fn delete_address(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let username = match bearer_user(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };

    {
        let mut addresses = state
            .addresses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let list = addresses.entry(username.clone()).or_default();
        let before = list.len();
        list.retain(|(record_id, _)| record_id != &id);
        if list.len() == before {
            return failure(StatusCode::NOT_FOUND, "Address not found");
        }
    }
    Json(addresses_json(&state, &username)).into_response()
}
