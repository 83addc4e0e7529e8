//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_REFRESH_BUFFER_SECS};
use crate::errors::{FolioError, Result};

/// Everything needed to open a session against one FOLIO tenant
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Gateway base URL, e.g. `https://folio.example.edu/okapi`
    pub base_url: String,
    /// Tenant id.
    pub tenant: String,
    /// Login username.
    pub username: String,
    /// Login password, never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    /// Per-request timeout applied to every call, including login and logout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// How long before the hard expiry a token counts as due for refresh
    #[serde(default = "default_token_refresh_buffer_seconds")]
    pub token_refresh_buffer_seconds: u64,
    /// Optional `User-Agent` override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_token_refresh_buffer_seconds() -> u64 {
    DEFAULT_TOKEN_REFRESH_BUFFER_SECS
}

impl ClientConfig {
    /// Create a configuration with default timeout and refresh buffer.
    pub fn new(
        base_url: impl Into<String>,
        tenant: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            tenant: tenant.into(),
            username: username.into(),
            password: password.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            token_refresh_buffer_seconds: DEFAULT_TOKEN_REFRESH_BUFFER_SECS,
            user_agent: None,
        }
    }

    /// Set the per-request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the refresh buffer in seconds.
    pub fn with_token_refresh_buffer(mut self, seconds: u64) -> Self {
        self.token_refresh_buffer_seconds = seconds;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Per-request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Base URL without a trailing slash, so endpoints can be appended.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the configuration before any connection is opened.
    ///
    /// # Errors
    /// Returns `FolioError::InvalidArgument` for a zero timeout and
    /// `FolioError::Config` for empty fields or an unusable base URL.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(FolioError::InvalidArgument(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }

        let url = Url::parse(&self.base_url).map_err(|e| {
            FolioError::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FolioError::Config(format!(
                "Unsupported base URL scheme: {}",
                url.scheme()
            )));
        }

        let empty: Vec<&str> = [
            ("tenant", self.tenant.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !empty.is_empty() {
            return Err(FolioError::Config(format!(
                "Empty configuration fields: {}",
                empty.join(", ")
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("tenant", &self.tenant)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("token_refresh_buffer_seconds", &self.token_refresh_buffer_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
