use serde::{Deserialize, Serialize};

use easyway_core::{DomainError, UserId};

use crate::Role;

/// The authenticated principal: identity, role and token pair.
///
/// A session is either complete (both tokens non-empty) or it does not
/// exist; [`Session::validate`] enforces this before the session is stored.
/// Wire names follow the sign-in payload (`results[0]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "roleResponseDto")]
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "isPasswordChangedForTheFirstTime", default)]
    pub password_changed_for_first_time: bool,
}

impl Session {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the user still has to replace the initial password.
    pub fn requires_password_change(&self) -> bool {
        !self.password_changed_for_first_time
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.access_token.trim().is_empty() {
            return Err(DomainError::invariant("session access token is empty"));
        }
        if self.refresh_token.trim().is_empty() {
            return Err(DomainError::invariant("session refresh token is empty"));
        }
        if self.role.name.trim().is_empty() {
            return Err(DomainError::invariant("session role has no name"));
        }
        Ok(())
    }

    /// Lower-case sub-permission tokens. Applied once whenever a session is loaded.
    pub fn normalized(mut self) -> Self {
        self.role.normalize();
        self
    }
}
