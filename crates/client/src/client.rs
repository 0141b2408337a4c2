//! Authenticated API client with a single coordinated token refresh.
//!
//! Every request carries the stored access token. On the first 401 for a
//! request the client refreshes the access token and replays the request
//! once. At most one refresh call is in flight at any time: requests that
//! hit a 401 while a refresh is running park in a FIFO wait queue and are
//! resumed with the new token (or the failure) when it resolves.
//!
//! Lock order is always refresh state -> auth state. The refresh lock is never
//! held across an await.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tracing::Instrument;
use uuid::Uuid;

use easyway_auth::{AuthError, AuthState};
use easyway_catalog::ResultsEnvelope;

use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

pub const REFRESH_TOKEN_PATH: &str = "/v1/auth/refresh-token";

/// Why a refresh produced no usable token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RefreshFailure {
    /// The session was terminated.
    Expired(String),
    /// A different session signed in while the refresh was in flight.
    Superseded,
}

impl From<RefreshFailure> for ClientError {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::Expired(reason) => Self::SessionExpired(reason),
            RefreshFailure::Superseded => Self::SessionChanged,
        }
    }
}

/// Outcome handed to queued requests.
type RefreshOutcome = Result<String, RefreshFailure>;

#[derive(Debug, Default)]
struct RefreshState {
    in_progress: bool,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedToken {
    access_token: String,
}

/// Cheap to clone; clones share the transport, auth state and refresh queue.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    auth: Arc<AuthState>,
    refresh: Arc<Mutex<RefreshState>>,
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("auth", &self.auth)
            .field("refresh", &self.lock_refresh())
            .finish()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<AuthState>) -> Self {
        Self {
            transport,
            auth,
            refresh: Arc::new(Mutex::new(RefreshState::default())),
        }
    }

    /// Client over `reqwest` using `config` (base URL and fixed timeout).
    pub fn from_config(config: &ClientConfig, auth: Arc<AuthState>) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), auth))
    }

    pub fn auth(&self) -> &Arc<AuthState> {
        &self.auth
    }

    /// Send `request`, recovering from one access-token expiry.
    ///
    /// Any response other than 401 is returned unchanged, error statuses
    /// included. Transport failures propagate without touching the session.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let request_id = Uuid::now_v7();
        let span = tracing::debug_span!(
            "api_request",
            %request_id,
            method = %request.method,
            path = %request.path,
        );
        self.execute(request).instrument(span).await
    }

    /// Send `request`, require a success status and decode `results[0]`.
    pub async fn fetch_first<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.request(request).await?.error_for_status()?;
        response
            .json::<ResultsEnvelope<T>>()?
            .into_first()
            .ok_or_else(|| ClientError::Decode("response carried no results".to_string()))
    }

    /// Send `request`, require a success status and decode every `results` entry.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Vec<T>, ClientError> {
        let response = self.request(request).await?.error_for_status()?;
        Ok(response.json::<ResultsEnvelope<T>>()?.results)
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        if request.anonymous {
            return Ok(self.transport.send(&request, None).await?);
        }

        let mut token = self.auth.access_token();
        let mut retried = false;

        loop {
            let response = self.transport.send(&request, token.as_deref()).await?;

            if response.status != StatusCode::UNAUTHORIZED {
                tracing::debug!(status = %response.status, retried, "response received");
                return Ok(response);
            }

            if retried {
                tracing::warn!("request rejected again after token refresh");
                return Err(ClientError::Unauthorized);
            }

            token = Some(self.recover(token.as_deref()).await?);
            retried = true;
        }
    }

    /// Obtain a usable access token after `rejected` drew a 401.
    async fn recover(&self, rejected: Option<&str>) -> Result<String, ClientError> {
        let (waiter, refresh_token) = {
            let mut state = self.lock_refresh();

            // A refresh finished while this request was in flight.
            if !state.in_progress {
                if let Some(current) = self.auth.access_token() {
                    if rejected != Some(current.as_str()) {
                        tracing::debug!("access token already rotated; replaying");
                        return Ok(current);
                    }
                }
            }

            let Some(refresh_token) = self.auth.refresh_token() else {
                let reason = "no refresh token available";
                self.auth.force_logout(reason);
                return Err(ClientError::SessionExpired(reason.to_string()));
            };

            if state.in_progress {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                tracing::debug!(queued = state.waiters.len(), "refresh in flight; request queued");
                (Some(rx), refresh_token)
            } else {
                state.in_progress = true;
                (None, refresh_token)
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(outcome) => outcome.map_err(ClientError::from),
                Err(_) => Err(ClientError::RefreshAborted),
            };
        }

        let guard = RefreshGuard::new(&self.refresh);
        let outcome = self.call_refresh(&refresh_token).await;
        guard.disarm();

        self.finish_refresh(&refresh_token, outcome)
    }

    async fn call_refresh(&self, refresh_token: &str) -> Result<String, String> {
        tracing::info!("refreshing access token");

        let request = ApiRequest::post(REFRESH_TOKEN_PATH)
            .json(serde_json::json!({ "refreshToken": refresh_token }));

        let response = self
            .transport
            .send(&request, None)
            .await
            .map_err(|err| format!("refresh request failed: {err}"))?;

        if !response.is_success() {
            return Err(format!("refresh rejected with status {}", response.status));
        }

        response
            .json::<ResultsEnvelope<RefreshedToken>>()
            .map_err(|err| err.to_string())?
            .into_first()
            .map(|refreshed| refreshed.access_token)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| "refresh response carried no access token".to_string())
    }

    /// Publish the refresh outcome: store or terminate, clear the flag, drain the queue.
    ///
    /// Both the new token and a failure apply only to the session that owns
    /// `issued_for`; a session signed in meanwhile is left untouched.
    fn finish_refresh(
        &self,
        issued_for: &str,
        outcome: Result<String, String>,
    ) -> Result<String, ClientError> {
        let mut state = self.lock_refresh();

        let outcome = match outcome {
            Ok(token) => match self.auth.replace_access_token(issued_for, &token) {
                Ok(()) => Ok(token),
                Err(AuthError::Superseded) => Err(RefreshFailure::Superseded),
                Err(err) => Err(self.expire(
                    issued_for,
                    format!("refreshed token could not be stored: {err}"),
                )),
            },
            Err(reason) => Err(self.expire(issued_for, reason)),
        };

        state.in_progress = false;
        let waiters = std::mem::take(&mut state.waiters);
        drop(state);

        match &outcome {
            Ok(_) => tracing::info!(replayed = waiters.len(), "access token refreshed"),
            Err(RefreshFailure::Superseded) => {
                tracing::info!(dropped = waiters.len(), "refresh outlived its session")
            }
            Err(RefreshFailure::Expired(reason)) => {
                tracing::warn!(failed = waiters.len(), reason = %reason, "token refresh failed")
            }
        }

        for waiter in waiters {
            // A waiter whose request was dropped is simply skipped.
            let _ = waiter.send(outcome.clone());
        }

        outcome.map_err(ClientError::from)
    }

    fn expire(&self, issued_for: &str, reason: String) -> RefreshFailure {
        let terminated = self.auth.force_logout_session(issued_for, &reason);
        if !terminated && self.auth.refresh_token().is_some() {
            return RefreshFailure::Superseded;
        }
        RefreshFailure::Expired(reason)
    }

    fn lock_refresh(&self) -> MutexGuard<'_, RefreshState> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn refresh_snapshot(&self) -> (bool, usize) {
        let state = self.lock_refresh();
        (state.in_progress, state.waiters.len())
    }
}

/// Resets the refresh state if the refreshing future is dropped mid-flight.
///
/// Dropping the queued senders wakes every waiter with `RefreshAborted`.
struct RefreshGuard<'a> {
    state: &'a Mutex<RefreshState>,
    armed: bool,
}

impl<'a> RefreshGuard<'a> {
    fn new(state: &'a Mutex<RefreshState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_progress = false;
        let abandoned = state.waiters.len();
        state.waiters.clear();
        tracing::warn!(abandoned, "token refresh abandoned");
    }
}
