//! Token storage abstraction for Crustline.
//!
//! Provides the [`TokenStore`] trait: a tiny string key/value store that
//! outlives the process, the way browser local storage does for the web
//! client. The session monitor only ever removes the access token from
//! it; identity providers write rotated tokens into it.
//!
//! # Feature Flags
//!
//! - `file` (default): [`FileTokenStore`], a JSON file on disk

mod error;
#[cfg(feature = "file")]
mod file;

pub use error::StoreError;
#[cfg(feature = "file")]
pub use file::FileTokenStore;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crustline_types::{CodecError, Session};

/// Key the access token is stored under unless configured otherwise.
pub const DEFAULT_TOKEN_KEY: &str = "access_token";

/// Durable client-side key/value storage for credentials.
///
/// Implementations are synchronous: writes are small and local, and the
/// monitor calls them between provider round-trips, never while holding
/// a lock across an `.await`.
///
/// There's no locking discipline between the monitor and the rest of the
/// application. The last writer wins.
pub trait TokenStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Returns `true` if a value was actually removed.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// Whether a value is stored under `key`.
    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: TokenStore> TokenStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key)
    }
}

/// Writes the session's access token under `key`.
///
/// Identity providers call this after issuing or rotating a session so
/// the rest of the application can find the current token.
///
/// # Errors
///
/// Returns `StoreError::Codec` with `CodecError::InvalidData` if the
/// access token is blank. The stored value is left untouched.
pub fn persist_session(
    store: &impl TokenStore,
    key: &str,
    session: &Session,
) -> Result<(), StoreError> {
    if session.access_token.trim().is_empty() {
        return Err(CodecError::InvalidData(format!(
            "session for {} has an empty access token",
            session.user
        ))
        .into());
    }
    store.set(key, &session.access_token)?;
    tracing::debug!(key, user = %session.user, "access token persisted");
    Ok(())
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// An in-process [`TokenStore`]. Nothing survives a restart.
///
/// Cloning is cheap and every clone sees the same data, which makes it
/// handy for tests: hand one clone to the monitor and keep another to
/// assert on.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries =
            self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries =
            self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use crustline_types::User;

    use super::*;

    #[test]
    fn test_memory_store_set_then_get_returns_value() {
        let store = MemoryTokenStore::new();

        store.set("access_token", "abc").unwrap();

        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("abc"));
        assert!(store.contains("access_token").unwrap());
    }

    #[test]
    fn test_memory_store_remove_reports_whether_removed() {
        let store = MemoryTokenStore::new();
        store.set("access_token", "abc").unwrap();

        assert!(store.remove("access_token").unwrap());
        assert!(!store.remove("access_token").unwrap());
        assert!(store.get("access_token").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryTokenStore::new();
        let observer = store.clone();

        store.set("k", "v").unwrap();

        assert_eq!(observer.len(), 1);
        assert_eq!(observer.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_store_last_writer_wins() {
        let store = MemoryTokenStore::new();

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_persist_session_writes_access_token() {
        let store = MemoryTokenStore::new();
        let session = Session {
            user: User::customer("u-1", "ada@example.com"),
            access_token: "fresh-token".into(),
            refresh_token: None,
            expires_at: Some(10),
        };

        persist_session(&store, DEFAULT_TOKEN_KEY, &session).unwrap();

        assert_eq!(
            store.get(DEFAULT_TOKEN_KEY).unwrap().as_deref(),
            Some("fresh-token")
        );
    }

    #[test]
    fn test_persist_session_blank_token_is_rejected() {
        let store = MemoryTokenStore::new();
        store.set(DEFAULT_TOKEN_KEY, "current").unwrap();
        let session = Session {
            user: User::customer("u-1", "ada@example.com"),
            access_token: "  ".into(),
            refresh_token: None,
            expires_at: Some(10),
        };

        let result = persist_session(&store, DEFAULT_TOKEN_KEY, &session);

        assert!(matches!(
            result,
            Err(StoreError::Codec(CodecError::InvalidData(_)))
        ));
        assert_eq!(
            store.get(DEFAULT_TOKEN_KEY).unwrap().as_deref(),
            Some("current")
        );
    }

    #[test]
    fn test_arc_store_delegates() {
        let store = Arc::new(MemoryTokenStore::new());

        store.set("k", "v").unwrap();

        assert!(TokenStore::contains(&store, "k").unwrap());
        assert!(TokenStore::remove(&store, "k").unwrap());
    }
}
