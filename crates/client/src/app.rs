//! Application wiring: one auth state, one client, every endpoint binding.

use std::sync::Arc;

use easyway_auth::{AuthState, TokenStorage};

use crate::api::{AuthApi, CategoriesApi, ProductsApi, SubcategoriesApi};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::transport::Transport;

/// Shared application state handed to whatever drives the dashboard.
///
/// All bindings share a single [`ApiClient`], so they also share its refresh
/// queue.
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: Arc<AuthState>,
    pub client: ApiClient,
    pub sessions: AuthApi,
    pub categories: CategoriesApi,
    pub subcategories: SubcategoriesApi,
    pub products: ProductsApi,
}

impl AppState {
    /// Build over `reqwest` and rehydrate any persisted session.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn TokenStorage>,
    ) -> Result<Self, TransportError> {
        let auth = auth_state(config, storage);
        let client = ApiClient::from_config(config, auth.clone())?;
        Ok(Self::assemble(auth, client))
    }

    /// Build over a caller-supplied transport.
    ///
    /// Only the sign-in path is taken from `config`; base URL and timeout
    /// belong to `transport`.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        let auth = auth_state(config, storage);
        let client = ApiClient::new(transport, auth.clone());
        Self::assemble(auth, client)
    }

    fn assemble(auth: Arc<AuthState>, client: ApiClient) -> Self {
        auth.initialize();

        Self {
            sessions: AuthApi::new(client.clone()),
            categories: CategoriesApi::new(client.clone()),
            subcategories: SubcategoriesApi::new(client.clone()),
            products: ProductsApi::new(client.clone()),
            auth,
            client,
        }
    }
}

fn auth_state(config: &ClientConfig, storage: Arc<dyn TokenStorage>) -> Arc<AuthState> {
    Arc::new(AuthState::new(storage).with_sign_in_path(&config.sign_in_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    use easyway_auth::{AuthEvent, AuthStatus, MemoryStorage, Role, Session};
    use easyway_core::{RoleId, UserId};
    use reqwest::StatusCode;

    use crate::api::testing::Recorder;
    use crate::error::ClientError;
    use crate::transport::ApiRequest;

    #[test]
    fn fresh_state_is_signed_out() {
        let config = ClientConfig::default();
        let state = AppState::new(&config, Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(state.auth.status(), AuthStatus::Unauthenticated);
        assert_eq!(state.auth.sign_in_path(), "/auth/sign-in");
    }

    #[test]
    fn custom_sign_in_path_is_used() {
        let mut config = ClientConfig::default();
        config.sign_in_path = "/login".to_string();
        let state = AppState::new(&config, Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(state.auth.sign_in_path(), "/login");
    }

    #[tokio::test]
    async fn custom_transport_redirects_to_configured_sign_in() {
        let mut config = ClientConfig::default();
        config.sign_in_path = "/login".to_string();

        // 401 for the request; the refresh then answers without a token.
        let recorder = Arc::new(Recorder::default());
        recorder.reply(StatusCode::UNAUTHORIZED, "");
        let state = AppState::with_transport(&config, recorder, Arc::new(MemoryStorage::new()));
        assert_eq!(state.auth.sign_in_path(), "/login");

        state
            .auth
            .login(Session {
                user_id: UserId::new(1),
                first_name: "Ada".to_string(),
                last_name: "Admin".to_string(),
                email: "ada@example.com".to_string(),
                role: Role::new(RoleId::new(2), "EDITOR", Vec::new()),
                access_token: "access-1".to_string(),
                refresh_token: "refresh-1".to_string(),
                password_changed_for_first_time: true,
            })
            .unwrap();
        let mut events = state.auth.subscribe();

        let err = state
            .client
            .request(ApiRequest::get("/v1/categories/get-all"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired(_)), "got {err:?}");

        match events.try_recv() {
            Ok(AuthEvent::ForcedLogout { redirect_to, .. }) => assert_eq!(redirect_to, "/login"),
            other => panic!("Expected ForcedLogout, got {other:?}"),
        }
    }
}
