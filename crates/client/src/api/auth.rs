use reqwest::StatusCode;
use serde_json::Value;

use easyway_auth::{Session, SignInCredentials, SignUpForm};
use easyway_catalog::ResultsEnvelope;

use crate::api::ensure_success;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

const SIGN_IN_PATH: &str = "/v1/auth/sign-in";
const SIGN_UP_PATH: &str = "/v1/auth/sign-up";

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session and install it.
    ///
    /// Sent without a bearer token; a 401 here means bad credentials, not an
    /// expired session.
    pub async fn sign_in(&self, credentials: &SignInCredentials) -> Result<Session, ClientError> {
        credentials.validate()?;

        let request = ApiRequest::post(SIGN_IN_PATH)
            .json(serde_json::to_value(credentials)?)
            .anonymous();
        let response = self.client.request(request).await?;

        if !response.is_success() {
            let status = response.status;
            let message = response
                .backend_message()
                .unwrap_or_else(|| sign_in_failure(status).to_string());
            tracing::warn!(%status, "sign-in rejected");
            return Err(ClientError::Api { status, message });
        }

        let session = response
            .json::<ResultsEnvelope<Session>>()?
            .into_first()
            .ok_or_else(|| ClientError::Decode("sign-in response carried no session".to_string()))?;

        self.client.auth().login(session)?;

        self.client
            .auth()
            .session()
            .ok_or_else(|| ClientError::Decode("session was not retained".to_string()))
    }

    /// Register a new account. The caller signs in separately.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Value, ClientError> {
        form.validate()?;

        let request = ApiRequest::post(SIGN_UP_PATH)
            .json(serde_json::to_value(form)?)
            .anonymous();
        let response = ensure_success(self.client.request(request).await?, |_| None)?;

        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        response.json()
    }

    pub fn sign_out(&self) {
        self.client.auth().logout();
    }
}

fn sign_in_failure(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "Invalid credentials. Please check your email and password.",
        StatusCode::INTERNAL_SERVER_ERROR => "Server error. Please try again later.",
        _ => "Invalid email or password. Please try again.",
    }
}
