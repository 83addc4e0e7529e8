//! Error types used throughout the client

use std::time::Duration;

use thiserror::Error;

/// Main error type for the FOLIO client
#[derive(Error, Debug)]
pub enum FolioError {
    /// The gateway could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A request exceeded the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Login or refresh failed, or no access token was issued.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 400, most often a malformed CQL query or payload.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Any other status outside 2xx.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code of the response.
        status: u16,
        /// Request URL and response text.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Protocol(String),

    /// A local precondition was violated before any request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FolioError {
    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Timeout(_) => "timeout",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Http { .. } => "http",
            Self::Protocol(_) => "protocol",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Config(_) => "config",
        }
    }

    /// HTTP status associated with this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened below HTTP (no response was received).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, FolioError>;
