//! Client-held session: the bearer token and the signed-in user.
//!
//! The session store is the single source of truth for "is the caller
//! authenticated". It is an explicit handle passed to the API client and to
//! every service, not ambient global state; clones share the same session.
//!
//! # Persistence
//!
//! Every mutation is written to the [`Storage`] backend before it becomes
//! visible, so restoring a store from the same storage reproduces exactly the
//! last committed `{token, user}` pair. Token and user are always set and
//! cleared together.

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use royal_florist_core::User;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::error::{Result, StorefrontError};

/// Storage keys for session data.
pub mod keys {
    /// Key for the bearer token.
    pub const TOKEN: &str = "token";

    /// Key for the JSON-encoded signed-in user.
    pub const USER: &str = "user";
}

/// Shared handle to the current session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    storage: Arc<dyn Storage>,
    state: RwLock<SessionState>,
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user: Option<User>,
}

impl SessionStore {
    /// Rebuild the session from persisted storage.
    ///
    /// The literal strings `"null"` and `"undefined"` and blank values are
    /// treated as absent. A token without a user (or the reverse) breaks the
    /// pair invariant; storage is purged and the session starts signed out.
    /// An unreadable storage file is handled the same way.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read and cannot be purged
    /// either.
    #[instrument(skip(storage))]
    pub fn restore(storage: Arc<dyn Storage>) -> std::result::Result<Self, StorageError> {
        let state = match read_persisted(storage.as_ref()) {
            Ok((Some(token), Some(user))) => {
                debug!(user_id = %user.id, "Restored session");
                SessionState {
                    token: Some(token),
                    user: Some(user),
                }
            }
            Ok((None, None)) => SessionState::default(),
            Ok((token, user)) => {
                warn!(
                    has_token = token.is_some(),
                    has_user = user.is_some(),
                    "Persisted session is incomplete, discarding it"
                );
                storage.clear()?;
                SessionState::default()
            }
            Err(e) => {
                warn!(error = %e, "Persisted session is unreadable, discarding it");
                storage.clear()?;
                SessionState::default()
            }
        };

        Ok(Self {
            inner: Arc::new(SessionInner {
                storage,
                state: RwLock::new(state),
            }),
        })
    }

    /// A signed-out session backed by fresh in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                storage: Arc::new(MemoryStorage::new()),
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    /// Sign in: persist and publish the user and token together.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails; the session is then left
    /// signed out.
    #[instrument(skip(self, user, token), fields(user_id = %user.id))]
    pub fn establish(&self, user: User, token: SecretString) -> std::result::Result<(), StorageError> {
        let mut state = self.write_state();

        if let Err(e) = persist_pair(self.inner.storage.as_ref(), &user, &token) {
            *state = SessionState::default();
            if let Err(purge) = self.inner.storage.clear() {
                warn!(error = %purge, "Failed to purge half-written session");
            }
            return Err(e);
        }

        state.user = Some(user);
        state.token = Some(token);
        debug!("Session established");
        Ok(())
    }

    /// Replace the signed-in user (after a profile edit).
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if nobody is signed in, or `Storage` if the
    /// user cannot be persisted.
    pub fn update_user(&self, user: User) -> Result<()> {
        let mut state = self.write_state();
        if state.token.is_none() {
            return Err(StorefrontError::Unauthenticated);
        }

        let json = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.inner.storage.set(keys::USER, &json)?;
        state.user = Some(user);
        Ok(())
    }

    /// Sign out and purge everything the client has persisted, not only the
    /// session keys.
    ///
    /// The in-memory session is cleared even if purging storage fails.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be cleared.
    #[instrument(skip(self))]
    pub fn clear(&self) -> std::result::Result<(), StorageError> {
        *self.write_state() = SessionState::default();
        self.inner.storage.clear()?;
        debug!("Session cleared");
        Ok(())
    }

    /// The current bearer token, if signed in.
    #[must_use]
    pub fn current_token(&self) -> Option<SecretString> {
        self.read_state()
            .token
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().token.is_some()
    }

    /// The current token, or `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Unauthenticated` when signed out.
    pub fn require_token(&self) -> Result<SecretString> {
        self.current_token().ok_or(StorefrontError::Unauthenticated)
    }

    /// Raw header value for the transport. Never log the result.
    pub(crate) fn bearer(&self) -> Option<String> {
        self.read_state()
            .token
            .as_ref()
            .map(|t| t.expose_secret().to_owned())
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("SessionStore")
            .field("token", &state.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &state.user.as_ref().map(|u| u.id.as_str()))
            .finish_non_exhaustive()
    }
}

fn persist_pair(
    storage: &dyn Storage,
    user: &User,
    token: &SecretString,
) -> std::result::Result<(), StorageError> {
    let json = serde_json::to_string(user)?;
    storage.set(keys::USER, &json)?;
    storage.set(keys::TOKEN, token.expose_secret())
}

type Persisted = (Option<SecretString>, Option<User>);

fn read_persisted(storage: &dyn Storage) -> std::result::Result<Persisted, StorageError> {
    let token = present(storage.get(keys::TOKEN)?).map(SecretString::from);
    let user = match present(storage.get(keys::USER)?) {
        Some(json) => match serde_json::from_str::<User>(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable persisted user");
                None
            }
        },
        None => None,
    };
    Ok((token, user))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != "null" && v != "undefined"
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        serde_json::from_str(
            r#"{"_id":"u1","name":"Ada","email":"ada@royal.com","phone":"99","address":null}"#,
        )
        .unwrap()
    }

    fn restore(storage: &MemoryStorage) -> SessionStore {
        SessionStore::restore(Arc::new(storage.clone())).unwrap()
    }

    #[test]
    fn test_establish_then_reload_yields_identical_pair() {
        let storage = MemoryStorage::new();
        let session = restore(&storage);

        session
            .establish(user(), SecretString::from("jwt-123".to_string()))
            .unwrap();

        let reloaded = restore(&storage);
        assert_eq!(reloaded.current_user(), Some(user()));
        assert_eq!(reloaded.bearer().as_deref(), Some("jwt-123"));
        assert!(reloaded.is_authenticated());
    }

    #[test]
    fn test_clear_then_reload_yields_absence() {
        let storage = MemoryStorage::new();
        storage.set("theme", "royal").unwrap();
        let session = restore(&storage);
        session
            .establish(user(), SecretString::from("jwt-123".to_string()))
            .unwrap();

        session.clear().unwrap();

        assert!(storage.is_empty());
        let reloaded = restore(&storage);
        assert!(reloaded.current_token().is_none());
        assert!(reloaded.current_user().is_none());
    }

    #[test]
    fn test_placeholder_strings_count_as_absent() {
        let storage = MemoryStorage::new();
        storage.set(keys::TOKEN, "undefined").unwrap();
        storage.set(keys::USER, "null").unwrap();

        let session = restore(&storage);

        assert!(!session.is_authenticated());
        assert!(matches!(
            session.require_token(),
            Err(StorefrontError::Unauthenticated)
        ));
    }

    #[test]
    fn test_token_without_user_is_discarded() {
        let storage = MemoryStorage::new();
        storage.set(keys::TOKEN, "jwt-orphan").unwrap();

        let session = restore(&storage);

        assert!(!session.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_update_user_requires_session() {
        let session = SessionStore::in_memory();
        assert!(matches!(
            session.update_user(user()),
            Err(StorefrontError::Unauthenticated)
        ));
    }

    #[test]
    fn test_update_user_is_persisted() {
        let storage = MemoryStorage::new();
        let session = restore(&storage);
        session
            .establish(user(), SecretString::from("jwt-123".to_string()))
            .unwrap();

        let mut edited = user();
        edited.phone = Some("12345".to_string());
        session.update_user(edited.clone()).unwrap();

        assert_eq!(restore(&storage).current_user(), Some(edited));
    }

    /// Memory storage that refuses to store a token and optionally to clear.
    #[derive(Debug, Default)]
    struct TokenRefusingStorage {
        entries: MemoryStorage,
        refuse_clear: bool,
    }

    fn refused(reason: &str) -> StorageError {
        StorageError::Io {
            path: "session.json".into(),
            source: std::io::Error::other(reason.to_string()),
        }
    }

    impl Storage for TokenRefusingStorage {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.entries.get(key)
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if key == keys::TOKEN {
                return Err(refused("disk full"));
            }
            self.entries.set(key, value)
        }

        fn remove(&self, key: &str) -> std::result::Result<(), StorageError> {
            self.entries.remove(key)
        }

        fn clear(&self) -> std::result::Result<(), StorageError> {
            if self.refuse_clear {
                return Err(refused("read-only"));
            }
            self.entries.clear()
        }
    }

    #[test]
    fn test_failed_establish_purges_partial_write() {
        let storage = Arc::new(TokenRefusingStorage::default());
        let session = SessionStore::restore(storage.clone()).unwrap();

        let err = session
            .establish(user(), SecretString::from("jwt-123".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("disk full"));
        assert!(!session.is_authenticated());
        assert!(storage.entries.is_empty());
    }

    #[test]
    fn test_failed_purge_keeps_original_error() {
        let storage = Arc::new(TokenRefusingStorage {
            refuse_clear: true,
            ..TokenRefusingStorage::default()
        });
        let session = SessionStore::restore(storage.clone()).unwrap();

        let err = session
            .establish(user(), SecretString::from("jwt-123".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("disk full"));
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = SessionStore::in_memory();
        session
            .establish(user(), SecretString::from("super-secret".to_string()))
            .unwrap();
        assert!(!format!("{session:?}").contains("super-secret"));
    }
}
