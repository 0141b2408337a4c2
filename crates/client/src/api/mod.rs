//! Typed bindings for the `/v1` endpoints the dashboard consumes.

mod auth;
mod categories;
mod products;
mod subcategories;

pub use auth::AuthApi;
pub use categories::CategoriesApi;
pub use products::{ProductCreated, ProductsApi};
pub use subcategories::SubcategoriesApi;

use reqwest::StatusCode;

use crate::error::ClientError;
use crate::transport::ApiResponse;

/// Require a success status, translating failures into a user-facing message.
///
/// `message_for` picks the message for a status; `None` keeps the backend's
/// own message (or the canonical reason).
pub(crate) fn ensure_success(
    response: ApiResponse,
    message_for: impl Fn(StatusCode) -> Option<&'static str>,
) -> Result<ApiResponse, ClientError> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status;
    match message_for(status) {
        Some(message) => {
            tracing::debug!(%status, message, "request failed");
            Err(ClientError::Api {
                status,
                message: message.to_string(),
            })
        }
        None => response.error_for_status(),
    }
}
