//! Request and response types shared by the client

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_GET_LIMIT;

/// A single record returned by a listing endpoint.
pub type Record = Value;

/// Outcome of a successful write.
///
/// Some endpoints answer with the stored record, others with an empty body
/// (typically `201`/`204`); the latter surface as the bare status code.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Decoded JSON body.
    Json(Value),
    /// Status code of a response without a JSON body.
    Status(u16),
}

impl ResponseBody {
    /// Borrow the JSON body, if any.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Status(_) => None,
        }
    }

    /// Take the JSON body, if any.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Status(_) => None,
        }
    }

    /// Status code of a bodiless response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Json(_) => None,
            Self::Status(code) => Some(*code),
        }
    }
}

/// Options for a single GET call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOptions {
    /// Top-level field to extract from the response body
    pub key: Option<String>,
    /// CQL filter sent as the `query` parameter
    pub query: Option<String>,
    /// Maximum number of records; `0` omits the `limit` parameter entirely
    pub limit: u32,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self { key: None, query: None, limit: DEFAULT_GET_LIMIT }
    }
}

impl GetOptions {
    /// Default options: no key, no query, limit 10.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract this top-level field from the body.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// CQL query to send.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Maximum number of records.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Send no `limit` parameter (single-record endpoints).
    pub fn unlimited(self) -> Self {
        self.limit(0)
    }

    /// Query parameters in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            params.push(("query", query.to_string()));
        }
        if self.limit != 0 {
            params.push(("limit", self.limit.to_string()));
        }
        params
    }
}

/// Username/password pair posted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain-text password, only ever sent to the login endpoint.
    pub password: String,
}

impl Credentials {
    /// Pair a username with its password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// JSON body of a login or refresh response.
///
/// The tokens themselves travel as cookies; only their lifetimes are here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExpiration {
    /// Hard expiry of the access token.
    pub access_token_expiration: DateTime<Utc>,
    /// Expiry of the refresh token.
    #[serde(default)]
    pub refresh_token_expiration: Option<DateTime<Utc>>,
}
