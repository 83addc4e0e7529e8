//! Token lifecycle flows
//!
//! Before every outbound call the client asks the token manager to make the
//! session usable:
//! - no token, or a token at/past its hard expiry: full login
//! - token inside the refresh buffer: cookie based refresh
//! - otherwise: reuse
//!
//! Login and refresh both answer with the tokens in `Set-Cookie` headers and
//! their lifetimes in the JSON body. The access token then becomes a session
//! header on the shared HTTP client.

use chrono::Utc;
use folio_domain::constants::{
    ACCESS_TOKEN_COOKIE, LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH, REFRESH_TOKEN_COOKIE, TOKEN_HEADER,
};
use folio_domain::{FolioError, Result, TokenExpiration};
use reqwest::blocking::Response;
use reqwest::header::COOKIE;
use reqwest::Method;
use tracing::{debug, error, info};

use super::session::{Session, TokenAction};
use crate::http::HttpClient;

/// Drives login, refresh and logout for one session.
///
/// Borrows the session and the HTTP client mutably for the duration of a
/// flow; it holds no state of its own.
pub struct TokenManager<'a> {
    session: &'a mut Session,
    http: &'a mut HttpClient,
}

impl<'a> TokenManager<'a> {
    /// Borrow a session and its HTTP client for one flow.
    pub fn new(session: &'a mut Session, http: &'a mut HttpClient) -> Self {
        Self { session, http }
    }

    /// Make sure the session holds a token that can be sent right now.
    ///
    /// # Errors
    /// Returns `FolioError::Auth` when login or refresh is rejected,
    /// `FolioError::Protocol` when the response lacks a usable expiry, and
    /// transport errors as they occur.
    pub fn ensure_valid_token(&mut self) -> Result<()> {
        let action = self.session.next_action(Utc::now());
        debug!(?action, status = ?self.session.status(), "checked session token");

        match action {
            TokenAction::Reuse => Ok(()),
            TokenAction::Refresh => self.refresh(),
            TokenAction::Login => self.login(),
        }
    }

    /// Authenticate with username and password.
    ///
    /// # Errors
    /// See [`ensure_valid_token`](Self::ensure_valid_token).
    pub fn login(&mut self) -> Result<()> {
        // a stale token must not accompany the credentials
        self.http.remove_session_header(TOKEN_HEADER);

        let url = self.session.url(LOGIN_PATH);
        let builder = self.http.request(Method::POST, &url).json(self.session.credentials());
        let response = self.http.send(builder)?;

        self.accept_tokens(response, "login")
    }

    /// Renew the access token with the refresh cookie.
    ///
    /// Falls back to a full login when no refresh token is held.
    ///
    /// # Errors
    /// See [`ensure_valid_token`](Self::ensure_valid_token).
    pub fn refresh(&mut self) -> Result<()> {
        if self.session.refresh_token().is_none() {
            debug!("no refresh token held, logging in instead");
            return self.login();
        }

        let url = self.session.url(REFRESH_PATH);
        let builder =
            self.http.request(Method::POST, &url).header(COOKIE, self.session.cookie_header());
        let response = self.http.send(builder)?;

        self.accept_tokens(response, "refresh")
    }

    /// End the session on the server.
    ///
    /// Tokens are discarded locally only when the server accepted the logout.
    ///
    /// # Errors
    /// Returns the token renewal error, or the mapped HTTP error of the logout
    /// call.
    pub fn logout(&mut self) -> Result<()> {
        self.ensure_valid_token()?;

        let url = self.session.url(LOGOUT_PATH);
        let builder =
            self.http.request(Method::POST, &url).header(COOKIE, self.session.cookie_header());
        self.http.send_checked(builder)?;

        self.session.clear_tokens();
        self.http.remove_session_header(TOKEN_HEADER);
        info!(tenant = %self.session.tenant(), "logged out");
        Ok(())
    }

    fn accept_tokens(&mut self, response: Response, flow: &'static str) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(flow, status = status.as_u16(), "authentication rejected");
            return Err(FolioError::Auth(format!(
                "{} failed with status {}: {}",
                flow,
                status,
                body.trim()
            )));
        }

        let mut access_token = None;
        let mut refresh_token = None;
        for cookie in response.cookies() {
            match cookie.name() {
                ACCESS_TOKEN_COOKIE => access_token = Some(cookie.value().to_string()),
                REFRESH_TOKEN_COOKIE => refresh_token = Some(cookie.value().to_string()),
                _ => {}
            }
        }

        let access_token = access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| FolioError::Auth("No access token received".to_string()))?;

        let body = response.text().map_err(|e| {
            FolioError::Protocol(format!("{} response body could not be read: {}", flow, e))
        })?;
        let expiration: TokenExpiration = serde_json::from_str(&body).map_err(|e| {
            FolioError::Protocol(format!("{} response carries no usable token expiry: {}", flow, e))
        })?;

        self.http.set_session_header(TOKEN_HEADER, &access_token)?;
        self.session.apply_tokens(access_token, refresh_token, &expiration);

        info!(
            flow,
            tenant = %self.session.tenant(),
            expires_at = %self.session.expires_at(),
            "session token issued"
        );
        Ok(())
    }
}
