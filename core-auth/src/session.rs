//! # Session State
//!
//! In-memory view of the signed-in identity and its tokens.
//!
//! `SessionState` is the only writer of the session. It keeps three things
//! in step: the in-memory [`Session`], the persisted [`TokenPair`] and the
//! API client's default `Authorization` header.
//!
//! The session counts as authenticated exactly when an access token is
//! present, whatever the refresh token or user look like.
//!
//! Changes are published on the [`EventBus`]; subscribe with
//! [`SessionState::subscribe`].

use crate::token_store::TokenStore;
use crate::types::{TokenPair, User};
use core_api::DefaultHeaders;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus, Receiver};
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Snapshot of the current session.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.as_ref().map(|user| user.id.to_string()))
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// Owner of the session; shared by the interceptor and the Session API.
pub struct SessionState {
    session: RwLock<Session>,
    token_store: TokenStore,
    headers: DefaultHeaders,
    event_bus: EventBus,
}

impl SessionState {
    /// Creates an empty session. Call [`initialize`](Self::initialize)
    /// before the first request.
    pub fn new(token_store: TokenStore, headers: DefaultHeaders, event_bus: EventBus) -> Self {
        Self {
            session: RwLock::new(Session::default()),
            token_store,
            headers,
            event_bus,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Loads the persisted pair, if any, and installs the default bearer
    /// header. Returns whether a session was restored.
    pub async fn initialize(&self) -> bool {
        let Some(tokens) = self.token_store.read().await else {
            debug!("No stored session to restore");
            return false;
        };

        self.headers.set_bearer(&tokens.access_token);
        {
            let mut session = self.write();
            session.access_token = Some(tokens.access_token);
            session.refresh_token = Some(tokens.refresh_token);
        }

        info!("Session restored from storage");
        self.emit(AuthEvent::SessionRestored);
        true
    }

    /// Replaces user and tokens, persists the pair and updates the default
    /// header. Used by login, registration and token refresh alike.
    ///
    /// A storage failure is logged; the in-memory session stays valid.
    pub async fn set_auth_data(&self, user: Option<User>, tokens: TokenPair) {
        self.headers.set_bearer(&tokens.access_token);
        {
            let mut session = self.write();
            session.user = user;
            session.access_token = Some(tokens.access_token.clone());
            session.refresh_token = Some(tokens.refresh_token.clone());
        }

        if let Err(e) = self.token_store.write(&tokens).await {
            warn!(error = %e, "Session updated but tokens were not persisted");
        }
    }

    /// Drops user and tokens, clears storage and the default header.
    pub async fn clear(&self) {
        *self.write() = Session::default();
        self.headers.clear_bearer();

        if let Err(e) = self.token_store.clear().await {
            warn!(error = %e, "Session cleared but stored tokens could not be removed");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Updates the user without touching tokens.
    pub fn set_user(&self, user: Option<User>) {
        self.write().user = user;
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    /// Receiver for session events published from now on.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("session", &*self.read())
            .finish()
    }
}
