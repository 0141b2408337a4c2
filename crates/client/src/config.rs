//! Client configuration.

use std::time::Duration;

use anyhow::Context;

use easyway_auth::DEFAULT_SIGN_IN_PATH;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash.
    pub base_url: String,
    /// Applied to every request. Expiry is reported as a transport failure.
    pub timeout: Duration,
    /// Where the application goes after a forced logout.
    pub sign_in_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read overrides from `EASYWAY_API_URL`, `EASYWAY_API_TIMEOUT_MS` and
    /// `EASYWAY_SIGN_IN_PATH`. Unset variables keep their defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("EASYWAY_API_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(raw) = std::env::var("EASYWAY_API_TIMEOUT_MS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("EASYWAY_API_TIMEOUT_MS is not a number: {raw:?}"))?;
            config.timeout = Duration::from_millis(millis);
        }

        if let Ok(path) = std::env::var("EASYWAY_SIGN_IN_PATH") {
            config.sign_in_path = path;
        }

        anyhow::ensure!(
            config.base_url.starts_with("http://") || config.base_url.starts_with("https://"),
            "EASYWAY_API_URL must be an http(s) URL, got {:?}",
            config.base_url
        );

        Ok(config)
    }
}
