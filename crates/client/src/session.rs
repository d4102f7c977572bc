//! Persisted session state: token, username, wallet balance.
//!
//! The session mirrors browser local storage: three whole values that are
//! read and written atomically, never patched field by field. The balance is
//! string-encoded on disk per the store contract and parsed leniently (an
//! absent or mangled value reads as 0).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Access to the persisted session.
///
/// All methods are infallible by design: implementations own their error
/// handling (a file store logs I/O failures and keeps its in-memory view
/// authoritative), so components never branch on storage errors.
pub trait SessionStore: Send + Sync {
    /// The auth token, when logged in.
    fn token(&self) -> Option<SecretString>;

    /// Store the auth token.
    fn set_token(&self, token: SecretString);

    /// The logged-in username, if any.
    fn username(&self) -> Option<String>;

    /// Store the username.
    fn set_username(&self, username: &str);

    /// The wallet balance. Absent or unparseable stored values read as 0.
    fn balance(&self) -> i64;

    /// Store the wallet balance.
    fn set_balance(&self, balance: i64);

    /// Wipe the whole session (logout).
    fn clear(&self);
}

/// On-disk session shape. The balance stays a string on the wire and on
/// disk; only the [`SessionStore`] surface exposes it as an integer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<String>,
}

impl SessionData {
    fn parse_balance(&self) -> i64 {
        self.balance
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }
}

/// Session store backed by a single JSON file.
///
/// Every mutation rewrites the file through a temp-file rename so a crash
/// mid-write cannot leave a half-written session behind. Write failures are
/// logged at warn and the in-memory view stays authoritative for the rest of
/// the process.
pub struct FileSessionStore {
    path: PathBuf,
    state: Mutex<SessionData>,
}

impl FileSessionStore {
    /// Open the session file, treating a missing or unreadable file as a
    /// logged-out session.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load_session(&path);
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut SessionData)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
        persist_session(&self.path, &state);
    }

    fn snapshot(&self) -> SessionData {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for FileSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.snapshot();
        f.debug_struct("FileSessionStore")
            .field("path", &self.path)
            .field("token", &state.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &state.username)
            .field("balance", &state.balance)
            .finish()
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<SecretString> {
        self.snapshot().token.map(SecretString::from)
    }

    fn set_token(&self, token: SecretString) {
        self.mutate(|state| state.token = Some(token.expose_secret().to_owned()));
    }

    fn username(&self) -> Option<String> {
        self.snapshot().username
    }

    fn set_username(&self, username: &str) {
        self.mutate(|state| state.username = Some(username.to_owned()));
    }

    fn balance(&self) -> i64 {
        self.snapshot().parse_balance()
    }

    fn set_balance(&self, balance: i64) {
        self.mutate(|state| state.balance = Some(balance.to_string()));
    }

    fn clear(&self) {
        self.mutate(|state| *state = SessionData::default());
    }
}

fn load_session(path: &Path) -> SessionData {
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Session file unparseable, starting logged out");
                SessionData::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionData::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Session file unreadable, starting logged out");
            SessionData::default()
        }
    }
}

fn persist_session(path: &Path, state: &SessionData) {
    let serialized = match serde_json::to_string_pretty(state) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Session not persisted: serialization failed");
            return;
        }
    };

    let tmp = path.with_extension("json.tmp");
    if let Err(e) = fs::write(&tmp, serialized).and_then(|()| fs::rename(&tmp, path)) {
        tracing::warn!(path = %path.display(), error = %e, "Session not persisted");
    }
}

/// In-memory session store for tests and short-lived embedders.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<SessionData>,
}

impl MemorySessionStore {
    /// An empty (logged-out) session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session already holding a token, username, and balance.
    #[must_use]
    pub fn logged_in(token: &str, username: &str, balance: i64) -> Self {
        Self {
            state: Mutex::new(SessionData {
                token: Some(token.to_owned()),
                username: Some(username.to_owned()),
                balance: Some(balance.to_string()),
            }),
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut SessionData)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
    }

    fn snapshot(&self) -> SessionData {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<SecretString> {
        self.snapshot().token.map(SecretString::from)
    }

    fn set_token(&self, token: SecretString) {
        self.mutate(|state| state.token = Some(token.expose_secret().to_owned()));
    }

    fn username(&self) -> Option<String> {
        self.snapshot().username
    }

    fn set_username(&self, username: &str) {
        self.mutate(|state| state.username = Some(username.to_owned()));
    }

    fn balance(&self) -> i64 {
        self.snapshot().parse_balance()
    }

    fn set_balance(&self, balance: i64) {
        self.mutate(|state| state.balance = Some(balance.to_string()));
    }

    fn clear(&self) {
        self.mutate(|state| *state = SessionData::default());
    }
}
