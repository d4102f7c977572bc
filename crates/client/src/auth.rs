//! Registration, login and logout.
//!
//! Credentials are validated client-side before any call goes out, with the
//! exact messages the store's own forms use. A successful login persists
//! token, username and wallet balance into the session store as whole
//! values; logout wipes them all at once.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use kirana_core::{CredentialError, RegistrationForm};

use crate::api::AuthApi;
use crate::notice::NoticeSink;
use crate::session::SessionStore;

/// Success notice after account creation.
pub const REGISTERED: &str = "Registered successfully";

/// Success notice after signing in.
pub const LOGGED_IN: &str = "Logged in successfully";

/// Generic notice when an auth call fails without a server message.
pub const AUTH_FAILED: &str = "Something Went Wrong";

/// Account registration and session lifecycle.
pub struct AuthFlow {
    api: Arc<dyn AuthApi>,
    session: Arc<dyn SessionStore>,
    notices: Arc<dyn NoticeSink>,
}

impl AuthFlow {
    /// Create a flow over the given store and session.
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: Arc<dyn SessionStore>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            api,
            session,
            notices,
        }
    }

    /// Validate the sign-up form and create the account.
    ///
    /// Returns `true` when the account exists afterwards; the caller then
    /// moves on to login. Invalid input is reported with the first failing
    /// rule's message and never reaches the network.
    #[instrument(skip(self, password, confirm))]
    pub async fn register(&self, username: &str, password: &str, confirm: &str) -> bool {
        let form = match RegistrationForm::parse(username, password, confirm) {
            Ok(form) => form,
            Err(e) => {
                debug!(error = %e, "registration input rejected");
                self.notices.error(&e.to_string());
                return false;
            }
        };

        match self
            .api
            .register(form.username.as_str(), form.password.as_str())
            .await
        {
            Ok(()) => {
                self.notices.success(REGISTERED);
                true
            }
            Err(e) => {
                warn!(error = %e, "registration failed");
                self.notices.error(e.notice_text(AUTH_FAILED));
                false
            }
        }
    }

    /// Exchange credentials for a session and persist it.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> bool {
        if let Err(e) = validate_login(username, password) {
            debug!(error = %e, "login input rejected");
            self.notices.error(&e.to_string());
            return false;
        }

        match self.api.login(username, password).await {
            Ok(login) => {
                self.session.set_token(SecretString::from(login.token));
                self.session.set_username(&login.username);
                self.session.set_balance(login.balance);
                debug!(balance = login.balance, "session established");
                self.notices.success(LOGGED_IN);
                true
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.notices.error(e.notice_text(AUTH_FAILED));
                false
            }
        }
    }

    /// Drop the whole session at once.
    pub fn logout(&self) {
        self.session.clear();
        debug!("session cleared");
    }
}

// Login only checks presence. Length rules bind at registration time, so an
// account predating a rule change can still sign in.
fn validate_login(username: &str, password: &str) -> Result<(), CredentialError> {
    if username.is_empty() {
        return Err(CredentialError::UsernameRequired);
    }
    if password.is_empty() {
        return Err(CredentialError::PasswordRequired);
    }
    Ok(())
}
