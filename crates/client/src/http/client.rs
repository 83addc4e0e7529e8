//! Blocking HTTP client with per-session headers

use std::time::Duration;

use folio_domain::{FolioError, Result};
use reqwest::blocking::{Client as ReqwestClient, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::{debug, error};

use crate::errors::{status_error, TransportError};

/// Blocking HTTP client shared by every request of a session.
///
/// Holds one reqwest connection pool plus a set of session headers (tenant,
/// token) that are attached to every request built through [`request`].
/// Failures are never retried.
///
/// [`request`]: HttpClient::request
pub struct HttpClient {
    client: ReqwestClient,
    session_headers: HeaderMap,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder carrying the current session headers.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).headers(self.session_headers.clone())
    }

    /// Execute the request and return the raw response, whatever its status.
    pub fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder
            .build()
            .map_err(|err| FolioError::from(TransportError::from_reqwest(err, self.timeout)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request) {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(TransportError::from_reqwest(err, self.timeout).into())
            }
        }
    }

    /// Execute the request and turn any status outside 2xx into an error.
    pub fn send_checked(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.send(builder)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().unwrap_or_default();
        let err = status_error(status, &url, &body);
        error!(status = status.as_u16(), url = %url, error = %err, "HTTP request rejected");
        Err(err)
    }

    /// Attach a header to every subsequent request.
    pub fn set_session_header(&mut self, name: &'static str, value: &str) -> Result<()> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            FolioError::InvalidArgument(format!("value for header {} is not valid: {}", name, e))
        })?;
        self.session_headers.insert(HeaderName::from_static(name), value);
        Ok(())
    }

    /// Stop sending a session header.
    pub fn remove_session_header(&mut self, name: &'static str) {
        self.session_headers.remove(name);
    }

    /// Current value of a session header.
    pub fn session_header(&self, name: &str) -> Option<&str> {
        self.session_headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Per-request timeout applied to every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    session_headers: HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            user_agent: None,
            session_headers: HeaderMap::new(),
        }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Header sent with every request until removed.
    ///
    /// # Errors
    /// Returns `FolioError::InvalidArgument` if the value is not a valid header value.
    pub fn session_header(mut self, name: &'static str, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            FolioError::InvalidArgument(format!("value for header {} is not valid: {}", name, e))
        })?;
        self.session_headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| FolioError::from(TransportError::from_reqwest(err, self.timeout)))?;

        Ok(HttpClient { client, session_headers: self.session_headers, timeout: self.timeout })
    }
}
