//! Sign-in / sign-up form payloads and their client-side validation rules.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use easyway_core::{DomainError, DomainResult};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;

/// Body of `POST /v1/auth/sign-in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInCredentials {
    pub email: String,
    pub password: String,
}

impl SignInCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Body of `POST /v1/auth/sign-up`. The confirmation never leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(DomainError::validation(
                "name",
                "Name must be at least 2 characters",
            ));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(DomainError::validation(
                "confirmPassword",
                "Passwords don't match",
            ));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email.trim()) {
        return Err(DomainError::validation("email", "Invalid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_accepts_valid_credentials() {
        assert!(SignInCredentials::new("ops@example.com", "secret1").validate().is_ok());
    }

    #[test]
    fn sign_in_rejects_bad_email_then_short_password() {
        let err = SignInCredentials::new("not-an-email", "secret1").validate().unwrap_err();
        assert_eq!(err.field(), Some("email"));

        let err = SignInCredentials::new("ops@example.com", "123").validate().unwrap_err();
        assert_eq!(err.field(), Some("password"));
    }

    #[test]
    fn sign_up_requires_matching_confirmation() {
        let form = SignUpForm {
            name: "Ops".to_string(),
            email: "ops@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field(), Some("confirmPassword"));
    }

    #[test]
    fn sign_up_body_omits_confirmation() {
        let form = SignUpForm {
            name: "Ops".to_string(),
            email: "ops@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        let body = serde_json::to_value(&form).unwrap();
        assert!(body.get("confirmPassword").is_none());
        assert_eq!(body["name"], "Ops");
    }
}
