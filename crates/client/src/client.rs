//! FOLIO client: session plus the generic request dispatcher
//!
//! Every public call first lets the token manager renew the session if
//! needed, then goes through the shared [`HttpClient`]. Resource specific
//! helpers (see [`crate::resources`]) are built on the four verbs here.

use folio_domain::constants::TENANT_HEADER;
use folio_domain::{ClientConfig, FolioError, GetOptions, ResponseBody, Result};
use reqwest::blocking::Response;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::auth::{Session, TokenManager};
use crate::errors::TransportError;
use crate::http::HttpClient;
use crate::pagination::{PageCursor, Pages};

/// Blocking client bound to one tenant.
///
/// Construction logs in. Dropping the client logs out on a best-effort
/// basis; call [`close`](Self::close) to observe the logout result instead.
///
/// All operations take `&mut self`: token renewal mutates the session, and
/// the client is meant to be driven from one thread at a time.
pub struct FolioClient {
    http: HttpClient,
    session: Session,
    closed: bool,
}

impl FolioClient {
    /// Open a session.
    ///
    /// # Arguments
    ///
    /// * `config` - Gateway address, tenant, credentials and timeouts
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidArgument` or `FolioError::Config` for an
    /// unusable configuration, `FolioError::Auth` if the login is rejected,
    /// and transport errors if the gateway cannot be reached.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = HttpClient::builder()
            .timeout(config.timeout())
            .session_header(TENANT_HEADER, &config.tenant)?;
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let mut http = builder.build()?;
        let mut session = Session::new(&config);

        // log in before the client exists, so a failed construction never
        // reaches Drop and its logout
        TokenManager::new(&mut session, &mut http).login()?;

        info!(base_url = %session.base_url(), tenant = %session.tenant(), "FOLIO client ready");
        Ok(Self { http, session, closed: false })
    }

    /// Open a session from `FOLIO_*` environment variables (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Config` when required variables are missing,
    /// otherwise the errors of [`new`](Self::new).
    pub fn from_env() -> Result<Self> {
        let config = crate::config::load_from_env()?;
        Self::new(config)
    }

    /// Session state, for inspection.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Renew the session token if it is missing, soft-expired or expired.
    ///
    /// Called implicitly by every request; exposed for callers that want to
    /// front-load the renewal.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Auth` or `FolioError::Protocol` when renewal
    /// fails, and transport errors as they occur.
    pub fn ensure_valid_token(&mut self) -> Result<()> {
        TokenManager::new(&mut self.session, &mut self.http).ensure_valid_token()
    }

    /// GET an endpoint and decode the JSON body.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Path relative to the base URL, e.g. `/users`
    /// * `options` - Result key, CQL query and limit
    ///
    /// # Returns
    ///
    /// `body[key]` when a key is given, the whole body otherwise
    ///
    /// # Errors
    ///
    /// Returns `FolioError::NotFound`, `FolioError::BadRequest` or
    /// `FolioError::Http` for non-2xx statuses and `FolioError::Protocol` when
    /// the body is not JSON or lacks the requested key.
    #[instrument(skip(self, options), fields(endpoint = %endpoint))]
    pub fn get(&mut self, endpoint: &str, options: &GetOptions) -> Result<Value> {
        self.ensure_valid_token()?;

        let url = self.session.url(endpoint);
        let builder = self.http.request(Method::GET, &url).query(&options.params());
        let response = self.http.send_checked(builder)?;
        let body = self.read_json(response)?;

        match options.key.as_deref() {
            Some(key) => extract_key(body, key),
            None => Ok(body),
        }
    }

    /// POST a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidArgument` if the payload cannot be
    /// serialized, and the status errors described on [`get`](Self::get).
    #[instrument(skip(self, payload), fields(endpoint = %endpoint))]
    pub fn post<T: Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        payload: &T,
    ) -> Result<ResponseBody> {
        let payload = to_payload(payload)?;
        self.ensure_valid_token()?;
        self.send_write(Method::POST, endpoint, &payload)
    }

    /// PUT a JSON payload.
    ///
    /// Empty payloads (`null`, `{}`, `[]`, `""`) are rejected before any
    /// token handling or network call.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidArgument` for empty or unserializable
    /// payloads, and the status errors described on [`get`](Self::get).
    #[instrument(skip(self, payload), fields(endpoint = %endpoint))]
    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        payload: &T,
    ) -> Result<ResponseBody> {
        let payload = to_payload(payload)?;
        if is_empty_payload(&payload) {
            return Err(FolioError::InvalidArgument(format!(
                "refusing to PUT an empty payload to {}",
                endpoint
            )));
        }
        self.ensure_valid_token()?;
        self.send_write(Method::PUT, endpoint, &payload)
    }

    /// DELETE an endpoint and return the status code.
    ///
    /// # Errors
    ///
    /// Returns the status errors described on [`get`](Self::get).
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub fn delete(&mut self, endpoint: &str) -> Result<u16> {
        self.ensure_valid_token()?;

        let url = self.session.url(endpoint);
        let response = self.http.send_checked(self.http.request(Method::DELETE, &url))?;
        Ok(response.status().as_u16())
    }

    /// Lazily walk every record of a listing endpoint.
    ///
    /// Records are fetched `page_size` at a time, ordered by `id`, with the
    /// last seen id as the cursor. `filter` is an optional CQL expression
    /// combined with the cursor condition.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidArgument` for a zero page size. Request
    /// failures surface as items of the returned iterator.
    pub fn paginate<'a>(
        &'a mut self,
        endpoint: &str,
        key: &str,
        filter: Option<&str>,
        page_size: u32,
    ) -> Result<Pages<'a>> {
        let cursor = PageCursor::new(filter, page_size)?;
        Ok(Pages::new(self, endpoint, key, cursor))
    }

    /// Log out and release the connection.
    ///
    /// # Errors
    ///
    /// Returns the logout failure; the client is gone either way.
    pub fn close(mut self) -> Result<()> {
        self.logout_once()
    }

    fn logout_once(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        TokenManager::new(&mut self.session, &mut self.http).logout()
    }

    fn send_write(
        &mut self,
        method: Method,
        endpoint: &str,
        payload: &Value,
    ) -> Result<ResponseBody> {
        let url = self.session.url(endpoint);
        let builder = self.http.request(method, &url).json(payload);
        let response = self.http.send_checked(builder)?;
        self.read_write_body(response)
    }

    fn read_text(&self, response: Response) -> Result<String> {
        response
            .text()
            .map_err(|err| FolioError::from(TransportError::from_reqwest(err, self.http.timeout())))
    }

    fn read_json(&self, response: Response) -> Result<Value> {
        let text = self.read_text(response)?;
        serde_json::from_str(&text)
            .map_err(|e| FolioError::Protocol(format!("response body is not valid JSON: {}", e)))
    }

    fn read_write_body(&self, response: Response) -> Result<ResponseBody> {
        let status = response.status().as_u16();
        let text = self.read_text(response)?;
        if text.trim().is_empty() {
            return Ok(ResponseBody::Status(status));
        }
        match serde_json::from_str(&text) {
            Ok(value) => Ok(ResponseBody::Json(value)),
            Err(_) => {
                debug!(status, "response body is not JSON, returning status only");
                Ok(ResponseBody::Status(status))
            }
        }
    }
}

impl Drop for FolioClient {
    fn drop(&mut self) {
        if let Err(err) = self.logout_once() {
            warn!(error = %err, kind = err.label(), "logout on drop failed");
        }
    }
}

fn to_payload<T: Serialize + ?Sized>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload)
        .map_err(|e| FolioError::InvalidArgument(format!("payload cannot be serialized: {}", e)))
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn extract_key(body: Value, key: &str) -> Result<Value> {
    match body {
        Value::Object(mut map) => map
            .remove(key)
            .ok_or_else(|| FolioError::Protocol(format!("response has no '{}' field", key))),
        other => Err(FolioError::Protocol(format!(
            "expected a JSON object holding '{}', got {}",
            key,
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
