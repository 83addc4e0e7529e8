//! Session state: credentials, tokens and their expiry
//!
//! A `Session` is plain data. It knows when its token is due for renewal but
//! never talks to the network; [`TokenManager`](super::TokenManager) owns the
//! flows that mutate it.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use folio_domain::constants::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use folio_domain::{ClientConfig, Credentials, TokenExpiration};

/// Observed state of the access token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token has been issued yet, or it was discarded.
    Missing,
    /// The token can be reused as is.
    Valid,
    /// Inside the refresh buffer but not yet past the hard expiry.
    SoftExpired,
    /// At or past the hard expiry.
    Expired,
}

/// What to do before the next request goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Send the current token as is.
    Reuse,
    /// Renew through the refresh endpoint.
    Refresh,
    /// Authenticate again with username and password.
    Login,
}

/// Authenticated session against one tenant.
pub struct Session {
    base_url: String,
    tenant: String,
    credentials: Credentials,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
    soft_expires_at: DateTime<Utc>,
    refresh_expires_at: Option<DateTime<Utc>>,
    refresh_buffer: ChronoDuration,
    timeout: Duration,
}

impl Session {
    /// Build an unauthenticated session from a validated configuration.
    pub fn new(config: &ClientConfig) -> Self {
        let buffer_secs = i64::try_from(config.token_refresh_buffer_seconds).unwrap_or(i64::MAX);
        let now = Utc::now();
        Self {
            base_url: config.normalized_base_url().to_string(),
            tenant: config.tenant.clone(),
            credentials: Credentials::new(&config.username, &config.password),
            access_token: None,
            refresh_token: None,
            expires_at: now,
            soft_expires_at: now,
            refresh_expires_at: None,
            refresh_buffer: ChronoDuration::try_seconds(buffer_secs).unwrap_or(ChronoDuration::MAX),
            timeout: config.timeout(),
        }
    }

    /// Token state as observed at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> TokenStatus {
        if self.access_token.is_none() {
            TokenStatus::Missing
        } else if now >= self.expires_at {
            TokenStatus::Expired
        } else if now >= self.soft_expires_at {
            TokenStatus::SoftExpired
        } else {
            TokenStatus::Valid
        }
    }

    /// Token state right now.
    pub fn status(&self) -> TokenStatus {
        self.status_at(Utc::now())
    }

    /// Decide between reuse, refresh and a full login.
    ///
    /// A soft-expired token is refreshed only while a refresh token is held
    /// and not known to be expired itself.
    pub fn next_action(&self, now: DateTime<Utc>) -> TokenAction {
        match self.status_at(now) {
            TokenStatus::Valid => TokenAction::Reuse,
            TokenStatus::Missing | TokenStatus::Expired => TokenAction::Login,
            TokenStatus::SoftExpired => {
                let refresh_usable = self.refresh_token.is_some()
                    && self.refresh_expires_at.map_or(true, |deadline| now < deadline);
                if refresh_usable {
                    TokenAction::Refresh
                } else {
                    TokenAction::Login
                }
            }
        }
    }

    /// Install freshly issued tokens.
    ///
    /// The soft expiry never lands after the hard one, and a buffer longer
    /// than the token lifetime simply makes it due immediately.
    pub fn apply_tokens(
        &mut self,
        access_token: String,
        refresh_token: Option<String>,
        expiration: &TokenExpiration,
    ) {
        let expires_at = expiration.access_token_expiration;
        let soft = expires_at
            .checked_sub_signed(self.refresh_buffer)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        self.access_token = Some(access_token);
        // refresh responses may omit the refresh cookie; keep the one we have
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.expires_at = expires_at;
        self.soft_expires_at = soft.min(expires_at);
        self.refresh_expires_at = expiration.refresh_token_expiration;
    }

    /// Forget both tokens and their expiry.
    pub fn clear_tokens(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.refresh_expires_at = None;
        let now = Utc::now();
        self.expires_at = now;
        self.soft_expires_at = now;
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// `Cookie` header value carrying both tokens, as the refresh and logout
    /// endpoints expect.
    pub fn cookie_header(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(refresh) = &self.refresh_token {
            parts.push(format!("{}={}", REFRESH_TOKEN_COOKIE, refresh));
        }
        if let Some(access) = &self.access_token {
            parts.push(format!("{}={}", ACCESS_TOKEN_COOKIE, access));
        }
        parts.join("; ")
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Tenant sent in `x-okapi-tenant`.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Login credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Current access token, if logged in.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Current refresh token, if one was issued.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Hard expiry of the access token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Instant from which the token is refreshed ahead of expiry.
    pub fn soft_expires_at(&self) -> DateTime<Utc> {
        self.soft_expires_at
    }

    /// Expiry of the refresh token, when the server reported one.
    pub fn refresh_expires_at(&self) -> Option<DateTime<Utc>> {
        self.refresh_expires_at
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("tenant", &self.tenant)
            .field("credentials", &self.credentials)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("soft_expires_at", &self.soft_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .field("timeout", &self.timeout)
            .finish()
    }
}
