//! Username and password validation for registration and login.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced while validating credentials.
///
/// The `Display` text of each variant is the exact message shown to the
/// user, so callers can hand these straight to the notice sink.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// No username was entered.
    #[error("Username is a required field")]
    UsernameRequired,
    /// The username is shorter than the minimum.
    #[error("Username must be at least {min} characters")]
    UsernameTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// No password was entered.
    #[error("Password is a required field")]
    PasswordRequired,
    /// The password is shorter than the minimum.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The confirmation does not match the password.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// A validated username.
///
/// ## Constraints
///
/// - Must not be empty
/// - At least 6 characters
///
/// ## Examples
///
/// ```
/// use kirana_core::Username;
///
/// assert!(Username::parse("crio-user").is_ok());
/// assert!(Username::parse("").is_err());      // empty
/// assert!(Username::parse("short").is_err()); // under 6 characters
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or shorter than
    /// [`Self::MIN_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        if s.is_empty() {
            return Err(CredentialError::UsernameRequired);
        }
        if s.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::UsernameTooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated password.
///
/// Same length rules as [`Username`]. The inner string is deliberately not
/// printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum length of a password.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a `Password` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or shorter than
    /// [`Self::MIN_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        if s.is_empty() {
            return Err(CredentialError::PasswordRequired);
        }
        if s.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::PasswordTooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// A fully validated registration submission.
///
/// Validation order matches the sign-up form: username rules first, then
/// password rules, then the confirmation match. The first failure is the
/// one reported.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    /// The validated username.
    pub username: Username,
    /// The validated password.
    pub password: Password,
}

impl RegistrationForm {
    /// Validate a registration submission.
    ///
    /// # Errors
    ///
    /// Returns the first [`CredentialError`] in form order: username
    /// required/length, password required/length, confirmation mismatch.
    pub fn parse(username: &str, password: &str, confirm: &str) -> Result<Self, CredentialError> {
        let username = Username::parse(username)?;
        let password = Password::parse(password)?;
        if confirm != password.as_str() {
            return Err(CredentialError::PasswordMismatch);
        }
        Ok(Self { username, password })
    }
}
