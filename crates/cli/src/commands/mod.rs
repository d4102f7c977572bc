//! Command implementations for the Kirana CLI.
//!
//! Every command wires the same three collaborators from environment
//! configuration: the HTTP store client, the file-backed session and the
//! tracing notice sink. [`Store`] does that wiring once per invocation.

use std::sync::Arc;

use thiserror::Error;

use kirana_client::api::HttpStoreClient;
use kirana_client::config::ClientConfig;
use kirana_client::notice::LogNoticeSink;
use kirana_client::session::{FileSessionStore, SessionStore};

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command needs a signed-in session.
    #[error("not logged in. Run `kirana login` first")]
    NotLoggedIn,
}

/// The wired-up store context a command runs against.
pub struct Store {
    pub api: Arc<HttpStoreClient>,
    pub session: Arc<FileSessionStore>,
    pub notices: Arc<LogNoticeSink>,
}

impl Store {
    /// Build the context from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration is missing or invalid, or the
    /// HTTP client cannot be constructed.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = ClientConfig::from_env()?;
        let api = Arc::new(HttpStoreClient::new(&config)?);
        let session = Arc::new(FileSessionStore::open(config.session_file.clone()));
        let notices = Arc::new(LogNoticeSink);
        Ok(Self {
            api,
            session,
            notices,
        })
    }

    /// Fail fast when no session exists.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotLoggedIn`] when no token is stored.
    pub fn require_session(&self) -> Result<(), CommandError> {
        if self.session.token().is_none() {
            return Err(CommandError::NotLoggedIn);
        }
        Ok(())
    }
}
