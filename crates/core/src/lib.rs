//! `easyway-core`: shared building blocks for the admin client.
//!
//! Identifiers and the domain error model. No IO lives here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, PermissionId, ProductId, RoleId, SubcategoryId, UserId};
