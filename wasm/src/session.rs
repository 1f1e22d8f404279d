//! Browser session: who is logged in, persisted across reloads

use std::cell::RefCell;

use crate::api::WarehouseApi;
use crate::error::{ApiResult, ClientError};
use shared::{LoginInput, Session};

/// Storage key holding the session JSON
pub const SESSION_KEY: &str = "user";

/// Raw key/value persistence for the session
pub trait SessionStore {
    fn load(&self) -> Option<String>;
    fn save(&self, value: &str);
    fn clear(&self);
}

/// In-process store for native builds and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: RefCell::new(Some(value.into())),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    fn save(&self, value: &str) {
        *self.value.borrow_mut() = Some(value.to_string());
    }

    fn clear(&self) {
        *self.value.borrow_mut() = None;
    }
}

/// `window.localStorage`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStore for LocalStorageStore {
    fn load(&self) -> Option<String> {
        Self::storage()?.get_item(SESSION_KEY).ok().flatten()
    }

    fn save(&self, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(SESSION_KEY, value).is_err() {
                tracing::warn!("Could not persist session to localStorage");
            }
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            if storage.remove_item(SESSION_KEY).is_err() {
                tracing::warn!("Could not clear session from localStorage");
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing restored yet
    Uninitialized,
    Authenticated(Session),
    /// Logged out, or the stored session was unreadable
    Cleared,
}

/// Owns the session state and keeps it in sync with a `SessionStore`
pub struct SessionHolder<S: SessionStore> {
    store: S,
    state: SessionState,
}

impl<S: SessionStore> SessionHolder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Uninitialized,
        }
    }

    /// Load the persisted session. A corrupt entry is discarded.
    pub fn restore(&mut self) -> Option<&Session> {
        self.state = match self.store.load() {
            Some(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => SessionState::Authenticated(session),
                Err(e) => {
                    tracing::warn!("Discarding unreadable stored session: {}", e);
                    self.store.clear();
                    SessionState::Cleared
                }
            },
            None => SessionState::Cleared,
        };
        self.current()
    }

    /// Authenticate against the API and persist the resulting session
    pub async fn login<A: WarehouseApi>(
        &mut self,
        api: &A,
        username: &str,
        password: &str,
    ) -> ApiResult<&Session> {
        let response = api
            .login(&LoginInput {
                username: username.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        let session = Session::from(response);
        let raw = serde_json::to_string(&session)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.store.save(&raw);

        tracing::info!(username = %session.username, role = %session.role, "Logged in");
        self.state = SessionState::Authenticated(session);
        self.current()
            .ok_or_else(|| ClientError::Decode("session not stored".to_string()))
    }

    pub fn logout(&mut self) {
        self.store.clear();
        self.state = SessionState::Cleared;
    }

    pub fn current(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_local_storage_round_trip() {
        let store = LocalStorageStore;
        store.save(r#"{"username":"ravi","role":"staff"}"#);
        assert_eq!(
            store.load().as_deref(),
            Some(r#"{"username":"ravi","role":"staff"}"#)
        );

        store.clear();
        assert!(store.load().is_none());
    }

    #[wasm_bindgen_test]
    fn test_restore_from_local_storage() {
        LocalStorageStore.save(r#"{"username":"ravi","role":"manager"}"#);
        let mut holder = SessionHolder::new(LocalStorageStore);
        assert_eq!(holder.restore().map(|s| s.username.clone()), Some("ravi".to_string()));

        holder.logout();
        assert!(LocalStorageStore.load().is_none());
    }
}
