//! Store API surface.
//!
//! Each external collaborator is a narrow async trait so the flows in this
//! crate can be driven against in-memory doubles. [`HttpStoreClient`]
//! implements all of them over the real REST API.
//!
//! Authenticated calls take the bearer token explicitly; deciding whether a
//! token exists (and refusing without one) is the calling component's job,
//! never the transport's.

mod http;

pub use http::HttpStoreClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use kirana_core::{AddressRecord, CartEntry, ProductRecord};

/// Errors that can occur when talking to the store API.
///
/// `Transport` and `Parse` are connectivity-class failures: callers show a
/// generic notice and never the raw error. `Rejected` carries the server's
/// own message, which is shown verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON the contract promises.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a structured failure.
    #[error("{message}")]
    Rejected {
        /// HTTP status of the failure response.
        status: u16,
        /// Human-readable message from the response body.
        message: String,
    },
}

impl ApiError {
    /// The server-provided message for rejections; `None` for
    /// connectivity-class failures.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            Self::Transport(_) | Self::Parse(_) | Self::Url(_) => None,
        }
    }

    /// The notice text for this failure: the server's message verbatim for
    /// rejections, the caller's generic connectivity text for everything
    /// else.
    #[must_use]
    pub fn notice_text<'a>(&'a self, generic: &'a str) -> &'a str {
        self.server_message().unwrap_or(generic)
    }
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSession {
    /// Bearer token for authenticated calls.
    pub token: String,
    /// Canonical username as the server stores it.
    pub username: String,
    /// Wallet balance at login time.
    pub balance: i64,
}

/// Read-only product catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch the full catalog.
    async fn products(&self) -> Result<Vec<ProductRecord>, ApiError>;

    /// Search the catalog. A no-match answer is an empty list, not an error.
    async fn search(&self, value: &str) -> Result<Vec<ProductRecord>, ApiError>;
}

/// The per-user cart held by the store.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch the current cart entries.
    async fn entries(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError>;

    /// Submit an item/quantity pair. The response is the full post-mutation
    /// cart; the store alone decides whether a quantity ≤ 0 removes the entry.
    async fn upsert(
        &self,
        token: &SecretString,
        item_id: &str,
        quantity: i64,
    ) -> Result<Vec<CartEntry>, ApiError>;

    /// Place the order against the chosen address.
    async fn checkout(&self, token: &SecretString, address_id: &str) -> Result<(), ApiError>;
}

/// The user's shipping address book.
#[async_trait]
pub trait AddressApi: Send + Sync {
    /// Fetch every address on file.
    async fn list(&self, token: &SecretString) -> Result<Vec<AddressRecord>, ApiError>;

    /// Add an address. The response is the full post-mutation list.
    async fn add(&self, token: &SecretString, text: &str) -> Result<Vec<AddressRecord>, ApiError>;

    /// Delete an address by id. The response is the full post-mutation list.
    async fn remove(&self, token: &SecretString, id: &str)
    -> Result<Vec<AddressRecord>, ApiError>;
}

/// Account registration and login.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Create an account.
    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError>;

    /// Exchange credentials for a session.
    async fn login(&self, username: &str, password: &str) -> Result<LoginSession, ApiError>;
}
