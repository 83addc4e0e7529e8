//! Okapi protocol constants
//!
//! Header, cookie and endpoint names used when talking to a FOLIO gateway,
//! plus client defaults.

// Headers
/// Tenant id, sent on every request.
pub const TENANT_HEADER: &str = "x-okapi-tenant";
/// Access token, sent once logged in.
pub const TOKEN_HEADER: &str = "x-okapi-token";

// Cookies carrying the session tokens
/// Access token cookie.
pub const ACCESS_TOKEN_COOKIE: &str = "folioAccessToken";
/// Refresh token cookie.
pub const REFRESH_TOKEN_COOKIE: &str = "folioRefreshToken";

// Authentication endpoints (relative to the base URL)
/// Username/password login.
pub const LOGIN_PATH: &str = "/authn/login-with-expiry";
/// Cookie-based token refresh.
pub const REFRESH_PATH: &str = "/authn/refresh";
/// Session logout.
pub const LOGOUT_PATH: &str = "/authn/logout";

// Client defaults
/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// How long before expiry a token is refreshed.
pub const DEFAULT_TOKEN_REFRESH_BUFFER_SECS: u64 = 10;
/// `limit` sent by a plain GET.
pub const DEFAULT_GET_LIMIT: u32 = 10;
/// Page size of the resource helpers.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
