//! `easyway-client`
//!
//! **Responsibility:** authenticated access to the EasyWay admin REST API.
//!
//! This crate provides:
//! - A [`Transport`] seam with a `reqwest` implementation
//! - [`ApiClient`]: bearer attachment, one coordinated token refresh, a
//!   refresh-wait queue and forced logout on unrecoverable 401s
//! - Typed bindings for auth, categories, sub-categories and products
//!
//! Session state lives in `easyway-auth`; this crate only reads tokens from it
//! and reports refresh outcomes back to it.

pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use api::{AuthApi, CategoriesApi, ProductCreated, ProductsApi, SubcategoriesApi};
pub use app::AppState;
pub use client::{ApiClient, REFRESH_TOKEN_PATH};
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
