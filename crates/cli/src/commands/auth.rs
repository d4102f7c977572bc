//! Account and session commands.
//!
//! # Usage
//!
//! ```bash
//! kirana register -u crio-user -p password1
//! kirana login -u crio-user -p password1
//! kirana balance
//! kirana logout
//! ```
//!
//! The flows behind these commands report their outcome through the notice
//! sink; a failed flow additionally fails the command so the process exits
//! nonzero.

use tracing::info;

use kirana_client::auth::AuthFlow;
use kirana_client::session::SessionStore;

use super::Store;

/// Create an account.
///
/// # Errors
///
/// Returns an error when wiring fails or registration did not go through.
pub async fn register(
    username: &str,
    password: &str,
    confirm: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    let flow = AuthFlow::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    );

    let confirm = confirm.unwrap_or(password);
    if flow.register(username, password, confirm).await {
        info!("Run `kirana login` to sign in");
        Ok(())
    } else {
        Err("registration failed".into())
    }
}

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns an error when wiring fails or the credentials were not accepted.
pub async fn login(username: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    let flow = AuthFlow::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    );

    if flow.login(username, password).await {
        info!("Wallet balance: ₹{}", store.session.balance());
        Ok(())
    } else {
        Err("login failed".into())
    }
}

/// Drop the persisted session.
///
/// # Errors
///
/// Returns an error when wiring fails.
pub fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;
    let flow = AuthFlow::new(
        store.api.clone(),
        store.session.clone(),
        store.notices.clone(),
    );

    flow.logout();
    info!("Logged out");
    Ok(())
}

/// Show the signed-in user and wallet balance from the local session.
///
/// # Errors
///
/// Returns an error when wiring fails.
pub fn balance() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::from_env()?;

    match store.session.username() {
        Some(username) => {
            info!("Logged in as {username}");
            info!("Wallet balance: ₹{}", store.session.balance());
        }
        None => info!("Not logged in"),
    }
    Ok(())
}
