//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Shared by the auth service, the interceptor and the router. Cloning a
//! `Session` clones a handle; all clones see the same store and the same
//! current-user channel.
//!
//! DESIGN
//! ======
//! The token is always read back from storage, so `is_logged_in` reflects
//! exactly what is persisted. The current user lives in a `watch` channel
//! seeded from storage at startup; every write publishes to the channel
//! first and then persists, republishing the previous user if the store
//! write fails.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::rc::Rc;

use tokio::sync::watch;

use crate::net::types::User;
use crate::router::{Navigator, paths};
use crate::storage::{self, KeyValueStore, StorageError, TOKEN_KEY, USER_KEY};

#[derive(Clone)]
pub struct Session {
    store: Rc<dyn KeyValueStore>,
    user: Rc<watch::Sender<Option<User>>>,
}

impl Session {
    /// Build a session from whatever the store currently holds.
    #[must_use]
    pub fn restore(store: Rc<dyn KeyValueStore>) -> Self {
        let cached = storage::load_json::<User>(store.as_ref(), USER_KEY);
        let (user, _) = watch::channel(cached);
        Self { store, user: Rc::new(user) }
    }

    #[must_use]
    pub fn store(&self) -> Rc<dyn KeyValueStore> {
        Rc::clone(&self.store)
    }

    /// The stored token, if a non-empty one is present.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    /// True iff a token is stored. Expiry and signature are not checked.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    /// Lowercased role of the cached user.
    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.user.borrow().as_ref().map(User::normalized_role)
    }

    /// Observe current-user changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    /// Record a fresh login. Token and user are persisted in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be serialized or the store write fails.
    pub fn establish(&self, token: &str, user: User) -> Result<(), StorageError> {
        let raw_user = serde_json::to_string(&user)?;
        let previous = self.user.send_replace(Some(user));
        let written = self.store.set_many(&[(TOKEN_KEY, token), (USER_KEY, raw_user.as_str())]);
        self.rollback_on_err(previous, written)
    }

    /// Overwrite the cached user, keeping the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn replace_user(&self, user: User) -> Result<(), StorageError> {
        let raw_user = serde_json::to_string(&user)?;
        let previous = self.user.send_replace(Some(user));
        let written = self.store.set(USER_KEY, &raw_user);
        self.rollback_on_err(previous, written)
    }

    /// Drop token and user from the channel and from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the store removal fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let previous = self.user.send_replace(None);
        let written = self.store.remove_many(&[TOKEN_KEY, USER_KEY]);
        self.rollback_on_err(previous, written)
    }

    /// Republish `previous` when the store rejected the write, so the
    /// observed user keeps matching what is persisted.
    fn rollback_on_err(&self, previous: Option<User>, written: Result<(), StorageError>) -> Result<(), StorageError> {
        if written.is_err() {
            self.user.send_replace(previous);
        }
        written
    }
}

/// Clear the session and send the user to the login route.
///
/// The redirect happens even when clearing storage fails.
///
/// # Errors
///
/// Returns the storage error after navigating.
pub fn end_session(session: &Session, navigator: &dyn Navigator) -> Result<(), StorageError> {
    let cleared = session.clear();
    navigator.navigate(paths::LOGIN);
    cleared
}
