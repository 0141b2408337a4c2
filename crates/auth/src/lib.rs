//! `easyway-auth`: session and authorization state for the admin client.
//!
//! Holds the signed-in principal, answers permission checks used to gate UI
//! actions, and persists tokens through an injected [`TokenStorage`].
//! This crate never talks to the network.

pub mod credentials;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod state;
pub mod storage;

pub use credentials::{SignInCredentials, SignUpForm};
pub use permissions::Permission;
pub use roles::{Role, SUPER_ADMIN};
pub use session::Session;
pub use state::{AuthError, AuthEvent, AuthState, AuthStatus, DEFAULT_SIGN_IN_PATH};
pub use storage::{
    ACCESS_TOKEN_KEY, FileStorage, MemoryStorage, REFRESH_TOKEN_KEY, SESSION_STORE_KEY,
    StorageError, TokenStorage,
};
