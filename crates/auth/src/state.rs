//! Authorization state: the current session, its lifecycle and the
//! permission checks that gate UI actions.
//!
//! Lifecycle: `Uninitialized -> Loading -> {Authenticated | Unauthenticated}`.
//! Once [`AuthState::initialize`] has run the state never returns to
//! `Loading`. Stored tokens and the in-memory session are always changed
//! together under the same lock, so they can never disagree about whether a
//! session exists.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use easyway_core::{DomainError, UserId};

use crate::Session;
use crate::storage::{
    ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_STORE_KEY, StorageError, TokenStorage,
};

/// Sign-in entry point the application is sent to after a forced logout.
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/sign-in";

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Constructed, `initialize` not called yet.
    Uninitialized,
    /// `initialize` is resolving persisted tokens.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn {
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    SignedOut {
        occurred_at: DateTime<Utc>,
    },
    TokenRefreshed {
        occurred_at: DateTime<Utc>,
    },
    /// Unrecoverable authentication failure. The UI must navigate to `redirect_to`.
    ForcedLogout {
        reason: String,
        redirect_to: String,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid session: {0}")]
    InvalidSession(#[from] DomainError),

    #[error("no active session")]
    NoSession,

    #[error("session was replaced")]
    Superseded,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Snapshot persisted under [`SESSION_STORE_KEY`].
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSnapshot {
    state: PersistedAuth,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAuth {
    user: Option<Session>,
    #[serde(default)]
    is_authenticated: bool,
}

#[derive(Debug)]
struct Inner {
    status: AuthStatus,
    session: Option<Session>,
}

/// Owned authorization state with an injected persistence boundary.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct AuthState {
    storage: Arc<dyn TokenStorage>,
    inner: Mutex<Inner>,
    events: broadcast::Sender<AuthEvent>,
    sign_in_path: String,
}

impl core::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.lock();
        f.debug_struct("AuthState")
            .field("status", &inner.status)
            .field("user_id", &inner.session.as_ref().map(|s| s.user_id))
            .field("sign_in_path", &self.sign_in_path)
            .finish()
    }
}

impl AuthState {
    /// Build the state and rehydrate the persisted session snapshot, if any.
    ///
    /// A corrupt snapshot, or one whose access token is gone, is discarded.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let session = rehydrate(storage.as_ref());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            storage,
            inner: Mutex::new(Inner {
                status: AuthStatus::Uninitialized,
                session,
            }),
            events,
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
        }
    }

    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn status(&self) -> AuthStatus {
        self.lock().status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.status(),
            AuthStatus::Uninitialized | AuthStatus::Loading
        )
    }

    pub fn session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    /// Access token currently in storage.
    pub fn access_token(&self) -> Option<String> {
        self.read_token(ACCESS_TOKEN_KEY)
    }

    /// Refresh token currently in storage.
    pub fn refresh_token(&self) -> Option<String> {
        self.read_token(REFRESH_TOKEN_KEY)
    }

    /// Resolve persisted tokens into a definite state. Runs once at startup.
    ///
    /// Both tokens plus a rehydrated session -> authenticated. Anything else
    /// clears whatever is left over and ends unauthenticated.
    pub fn initialize(&self) -> AuthStatus {
        let mut inner = self.lock();
        if inner.status == AuthStatus::Uninitialized {
            inner.status = AuthStatus::Loading;
        }

        let tokens_present = self.read_token(ACCESS_TOKEN_KEY).is_some()
            && self.read_token(REFRESH_TOKEN_KEY).is_some();

        let status = if tokens_present && inner.session.is_some() {
            AuthStatus::Authenticated
        } else {
            if tokens_present {
                tracing::warn!("tokens present without a session snapshot; clearing");
            }
            self.clear_persisted();
            inner.session = None;
            AuthStatus::Unauthenticated
        };

        inner.status = status;
        tracing::debug!(?status, "authorization state initialized");
        status
    }

    /// Store `session`, replacing any prior one wholesale.
    pub fn login(&self, session: Session) -> Result<(), AuthError> {
        session.validate()?;
        let session = session.normalized();
        let user_id = session.user_id;

        let mut inner = self.lock();
        if let Err(err) = self.persist(&session) {
            self.clear_persisted();
            inner.session = None;
            inner.status = AuthStatus::Unauthenticated;
            return Err(err.into());
        }

        inner.session = Some(session);
        inner.status = AuthStatus::Authenticated;
        drop(inner);

        tracing::info!(%user_id, "signed in");
        self.emit(AuthEvent::SignedIn {
            user_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Clear tokens and session. Never fails; storage errors are logged.
    pub fn logout(&self) {
        let mut inner = self.lock();
        self.clear_persisted();
        inner.session = None;
        inner.status = AuthStatus::Unauthenticated;
        drop(inner);

        tracing::info!("signed out");
        self.emit(AuthEvent::SignedOut {
            occurred_at: Utc::now(),
        });
    }

    /// Programmatic logout after an unrecoverable authentication failure.
    ///
    /// Emits [`AuthEvent::ForcedLogout`] when a session or tokens were present,
    /// or when startup has not yet settled the state (the caller still has to
    /// be sent to sign-in). Once unauthenticated, further calls stay silent,
    /// so concurrent failures signal once. Returns whether the signal was
    /// emitted.
    pub fn force_logout(&self, reason: &str) -> bool {
        let inner = self.lock();
        self.terminate(inner, reason)
    }

    /// [`force_logout`](Self::force_logout), but only if the current session
    /// still holds `refresh_token`. A session that replaced it is left alone.
    pub fn force_logout_session(&self, refresh_token: &str, reason: &str) -> bool {
        let inner = self.lock();
        let current = match inner.session.as_ref() {
            Some(session) => Some(session.refresh_token.clone()),
            None => self.read_token(REFRESH_TOKEN_KEY),
        };

        if current.as_deref() != Some(refresh_token) {
            tracing::debug!(reason, "forced logout skipped; session was replaced");
            return false;
        }
        self.terminate(inner, reason)
    }

    fn terminate(&self, mut inner: MutexGuard<'_, Inner>, reason: &str) -> bool {
        let had_session = inner.session.is_some()
            || self.read_token(ACCESS_TOKEN_KEY).is_some()
            || self.read_token(REFRESH_TOKEN_KEY).is_some();
        let unsettled = inner.status != AuthStatus::Unauthenticated;

        self.clear_persisted();
        inner.session = None;
        inner.status = AuthStatus::Unauthenticated;
        drop(inner);

        if !had_session && !unsettled {
            tracing::debug!(reason, "forced logout skipped; already signed out");
            return false;
        }

        tracing::warn!(reason, redirect_to = %self.sign_in_path, "session terminated");
        self.emit(AuthEvent::ForcedLogout {
            reason: reason.to_string(),
            redirect_to: self.sign_in_path.clone(),
            occurred_at: Utc::now(),
        });
        true
    }

    /// Swap in an access token obtained with `issued_for` (a refresh token).
    ///
    /// The refresh token is untouched. If the session no longer holds
    /// `issued_for` (signed out and in again meanwhile) the token is dropped
    /// with [`AuthError::Superseded`].
    pub fn replace_access_token(&self, issued_for: &str, access_token: &str) -> Result<(), AuthError> {
        if access_token.trim().is_empty() {
            return Err(DomainError::invariant("refreshed access token is empty").into());
        }

        let mut inner = self.lock();
        let Some(current) = inner.session.as_ref() else {
            return Err(AuthError::NoSession);
        };
        if current.refresh_token != issued_for {
            tracing::debug!("refreshed token belongs to a replaced session; dropped");
            return Err(AuthError::Superseded);
        }

        let mut updated = current.clone();
        updated.access_token = access_token.to_string();

        self.storage.set(ACCESS_TOKEN_KEY, access_token)?;
        self.write_snapshot(Some(&updated))?;
        inner.session = Some(updated);
        drop(inner);

        tracing::debug!("access token replaced");
        self.emit(AuthEvent::TokenRefreshed {
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Permission check used to gate actions.
    ///
    /// False without a session; true for `SUPER_ADMIN`; otherwise the module
    /// must match case-insensitively and, when given, carry `sub_permission`.
    pub fn has_permission(&self, module: &str, sub_permission: Option<&str>) -> bool {
        self.lock()
            .session
            .as_ref()
            .is_some_and(|session| session.role.grants(module, sub_permission))
    }

    pub fn is_super_admin(&self) -> bool {
        self.lock()
            .session
            .as_ref()
            .is_some_and(|session| session.role.is_super_admin())
    }

    /// Render guard: no required permission always renders.
    pub fn can_render(&self, permission: Option<&str>, sub_permission: Option<&str>) -> bool {
        match permission {
            None => true,
            Some(module) => self.is_super_admin() || self.has_permission(module, sub_permission),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_token(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read token from storage");
                None
            }
        }
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        self.write_snapshot(Some(session))
    }

    fn write_snapshot(&self, session: Option<&Session>) -> Result<(), StorageError> {
        let snapshot = PersistedSnapshot {
            state: PersistedAuth {
                user: session.cloned(),
                is_authenticated: session.is_some(),
            },
            version: 0,
        };
        let raw = serde_json::to_string(&snapshot)?;
        self.storage.set(SESSION_STORE_KEY, &raw)
    }

    fn clear_persisted(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_STORE_KEY] {
            if let Err(err) = self.storage.remove(key) {
                tracing::warn!(key, error = %err, "failed to clear storage entry");
            }
        }
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn rehydrate(storage: &dyn TokenStorage) -> Option<Session> {
    let raw = match storage.get(SESSION_STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read session snapshot");
            return None;
        }
    };

    let snapshot = match serde_json::from_str::<PersistedSnapshot>(&raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(error = %err, "discarding corrupt session snapshot");
            discard_snapshot(storage);
            return None;
        }
    };

    if !snapshot.state.is_authenticated {
        return None;
    }
    let session = snapshot.state.user?.normalized();
    if let Err(err) = session.validate() {
        tracing::warn!(error = %err, "discarding invalid session snapshot");
        discard_snapshot(storage);
        return None;
    }

    let has_access_token =
        matches!(storage.get(ACCESS_TOKEN_KEY), Ok(Some(token)) if !token.trim().is_empty());
    if !has_access_token {
        tracing::debug!("session snapshot without access token; discarding");
        discard_snapshot(storage);
        return None;
    }

    tracing::debug!(version = snapshot.version, user_id = %session.user_id, "session snapshot rehydrated");
    Some(session)
}

fn discard_snapshot(storage: &dyn TokenStorage) {
    if let Err(err) = storage.remove(SESSION_STORE_KEY) {
        tracing::warn!(error = %err, "failed to discard session snapshot");
    }
}
