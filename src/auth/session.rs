//! Session management
//!
//! `SessionManager` is the only component that touches persisted session
//! state. Everything else asks it whether the session is valid and which role
//! it carries.

use crate::auth::jwt::decode_claims;
use crate::auth::models::{self, Theme, User, UserRole};
use crate::auth::store::{MemoryStore, StorageKeys, TokenStore};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Session validity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    /// A guarded request got a 401 and a token refresh is in progress
    Refreshing,
}

/// Decoded view of the persisted tokens
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub role: Option<UserRole>,
    pub user_id: Option<String>,
    /// Expiration time (epoch seconds)
    pub expires_at: i64,
}

impl Session {
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

/// Session manager over a durable token store
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    keys: StorageKeys,
    state: RwLock<SessionState>,
    refresh_lock: Mutex<()>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn TokenStore>, keys: StorageKeys) -> Self {
        Self {
            store,
            keys,
            state: RwLock::new(SessionState::Unauthenticated),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Session manager backed by memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), StorageKeys::default())
    }

    /// Derive the initial state from whatever tokens are already persisted
    pub async fn init(&self) -> SessionState {
        self.is_authenticated().await;
        let state = self.state().await;
        tracing::debug!("Session initialized as {:?}", state);
        state
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.store.get(&self.keys.access_token).await
    }

    /// Stored refresh token; an empty value reads as absent
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        let token = self.store.get(&self.keys.refresh_token).await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    /// Current session if the access token decodes and has not expired
    pub async fn session(&self) -> Option<Session> {
        self.session_at(chrono::Utc::now().timestamp()).await
    }

    pub async fn session_at(&self, now: i64) -> Option<Session> {
        let access_token = self.access_token().await.ok().flatten()?;
        let claims = decode_claims(&access_token).ok()?;
        if !claims.is_valid_at(now) {
            return None;
        }
        let refresh_token = self.refresh_token().await.ok().flatten();
        let user_id = claims.subject().map(str::to_string);
        Some(Session {
            access_token,
            refresh_token,
            role: claims.role,
            user_id,
            expires_at: claims.exp,
        })
    }

    /// Fails closed: a missing, malformed or expired token is simply `false`
    pub async fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(chrono::Utc::now().timestamp()).await
    }

    pub async fn is_authenticated_at(&self, now: i64) -> bool {
        let valid = self.session_at(now).await.is_some();

        let mut state = self.state.write().await;
        match (valid, *state) {
            (true, SessionState::Unauthenticated) => *state = SessionState::Authenticated,
            (false, SessionState::Authenticated) => {
                tracing::debug!("Access token expired or unreadable");
                *state = SessionState::Unauthenticated;
            }
            _ => {}
        }

        valid
    }

    /// Role from the access token, `None` without a valid session
    pub async fn user_role(&self) -> Option<UserRole> {
        self.session().await.and_then(|s| s.role)
    }

    pub async fn has_role(&self, required: &UserRole) -> bool {
        models::has_role(self.user_role().await.as_ref(), required)
    }

    pub async fn can_access(&self, required: &[UserRole]) -> bool {
        models::can_access(self.user_role().await.as_ref(), required)
    }

    /// Persist a new token pair; an empty refresh token drops the stored one
    pub async fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.store.set(&self.keys.access_token, access_token).await?;
        if refresh_token.is_empty() {
            self.store.remove(&self.keys.refresh_token).await?;
        } else {
            self.store.set(&self.keys.refresh_token, refresh_token).await?;
        }
        *self.state.write().await = SessionState::Authenticated;
        Ok(())
    }

    /// Remove every piece of session state; safe to call repeatedly
    pub async fn clear_tokens(&self) -> Result<()> {
        self.store.remove(&self.keys.access_token).await?;
        self.store.remove(&self.keys.refresh_token).await?;
        self.store.remove(&self.keys.user).await?;
        *self.state.write().await = SessionState::Unauthenticated;
        Ok(())
    }

    pub async fn set_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.store.set(&self.keys.user, &json).await
    }

    /// Cached user record; an unreadable record reads as absent
    pub async fn current_user(&self) -> Option<User> {
        let raw = self.store.get(&self.keys.user).await.ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    pub(crate) async fn mark_refreshing(&self) {
        *self.state.write().await = SessionState::Refreshing;
    }

    /// Serializes token refreshes across concurrent requests
    pub(crate) async fn refresh_lock(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }

    pub async fn theme(&self) -> Theme {
        self.store
            .get(&self.keys.theme)
            .await
            .ok()
            .flatten()
            .and_then(|t| t.parse().ok())
            .unwrap_or_default()
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(&self.keys.theme, &theme.to_string()).await
    }

    pub async fn sidebar_collapsed(&self) -> bool {
        matches!(
            self.store.get(&self.keys.sidebar_collapsed).await,
            Ok(Some(v)) if v == "true"
        )
    }

    pub async fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<()> {
        self.store
            .set(&self.keys.sidebar_collapsed, if collapsed { "true" } else { "false" })
            .await
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::in_memory()
    }
}
