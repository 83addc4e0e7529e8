//! Conversions from transport errors and HTTP statuses into `FolioError`.

use std::error::Error as StdError;
use std::time::Duration;

use folio_domain::FolioError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;

/// Error newtype that keeps reqwest-specific conversions on the client side
/// and can be converted back into the domain error.
#[derive(Debug)]
pub struct TransportError(pub FolioError);

impl From<TransportError> for FolioError {
    fn from(value: TransportError) -> Self {
        value.0
    }
}

impl From<FolioError> for TransportError {
    fn from(value: FolioError) -> Self {
        TransportError(value)
    }
}

impl TransportError {
    /// Classify a reqwest failure.
    ///
    /// `timeout` is the configured per-request timeout, reported back in
    /// `FolioError::Timeout` since reqwest does not carry it.
    pub fn from_reqwest(err: HttpError, timeout: Duration) -> Self {
        let mapped = if err.is_timeout() {
            FolioError::Timeout(timeout)
        } else if err.is_connect() {
            FolioError::Connection(format!("connection failed: {}", describe(&err)))
        } else if err.is_builder() {
            FolioError::InvalidArgument(format!("request could not be built: {}", describe(&err)))
        } else if err.is_decode() {
            FolioError::Protocol(format!("response body could not be decoded: {}", describe(&err)))
        } else {
            FolioError::Connection(format!("http transport error: {}", describe(&err)))
        };
        TransportError(mapped)
    }
}

/// Map a non-success HTTP status into the error taxonomy.
///
/// 404 and 400 get dedicated variants so callers can branch on them; every
/// other status outside 2xx becomes `FolioError::Http`.
pub fn status_error(status: StatusCode, url: &str, body: &str) -> FolioError {
    let message = if body.trim().is_empty() {
        format!("{} returned status {}", url, status)
    } else {
        format!("{} returned status {}: {}", url, status, body.trim())
    };

    match status {
        StatusCode::NOT_FOUND => FolioError::NotFound(message),
        StatusCode::BAD_REQUEST => FolioError::BadRequest(message),
        _ => FolioError::Http { status: status.as_u16(), message },
    }
}

/// Render an error together with its source chain (reqwest hides the root cause
/// behind `source()`).
fn describe(err: &HttpError) -> String {
    let mut message = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
