use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::models::UserProfile;

use super::store::{SessionStore, StoreError, AUTH_TOKEN_KEY, AUTH_USER_KEY};

/// In-memory authentication state. The invariant maintained by
/// [`SessionHandle`] is that `user` is present iff `token` is present and was
/// last validated successfully.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

/// Shared handle to the session, cloned into the API client and the session
/// guard. Mutations happen at synchronous points only; the lock is never held
/// across an await.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    store: Arc<dyn SessionStore>,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Session::default())),
            store,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Hydrate from the persisted store. Returns true when a complete session
    /// (token and profile) was restored; partial or unreadable state is
    /// treated as absent.
    pub fn hydrate(&self) -> Result<bool, StoreError> {
        let token = match self.store.load(AUTH_TOKEN_KEY)? {
            Some(raw) => match serde_json::from_str::<String>(&raw) {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!(error = %e, "persisted token is not valid JSON, ignoring");
                    None
                }
            },
            None => None,
        };
        let user = match self.store.load(AUTH_USER_KEY)? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "persisted profile is not valid JSON, ignoring");
                    None
                }
            },
            None => None,
        };

        match (token, user) {
            (Some(token), Some(user)) => {
                debug!(username = %user.username, "session restored from storage");
                let mut session = self.write();
                session.token = Some(token);
                session.user = Some(user);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    /// Fast local check with no network call: token and profile both present.
    pub fn is_authenticated(&self) -> bool {
        let session = self.read();
        session.token.is_some() && session.user.is_some()
    }

    /// Store a freshly issued token and profile, in memory and persisted.
    pub fn establish(&self, token: &str, user: &UserProfile) -> Result<(), StoreError> {
        {
            let mut session = self.write();
            session.token = Some(token.to_string());
            session.user = Some(user.clone());
        }
        let encoded_token = serde_json::to_string(token).unwrap_or_default();
        let encoded_user = serde_json::to_string(user).unwrap_or_default();
        self.store.save(AUTH_TOKEN_KEY, &encoded_token)?;
        self.store.save(AUTH_USER_KEY, &encoded_user)?;
        Ok(())
    }

    /// Refresh the cached profile after revalidation. Concurrent refreshes
    /// race benignly; both write the same authoritative value.
    pub fn update_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        self.write().user = Some(user.clone());
        let encoded = serde_json::to_string(user).unwrap_or_default();
        self.store.save(AUTH_USER_KEY, &encoded)?;
        Ok(())
    }

    /// Drop the session from memory and storage. Idempotent.
    pub fn clear(&self) -> Result<(), StoreError> {
        {
            let mut session = self.write();
            session.token = None;
            session.user = None;
        }
        self.store.remove(AUTH_TOKEN_KEY)?;
        self.store.remove(AUTH_USER_KEY)?;
        Ok(())
    }
}
