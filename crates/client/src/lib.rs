//! # FOLIO Client
//!
//! Blocking client for the FOLIO library services platform (Okapi gateway).
//!
//! This crate contains:
//! - The session token lifecycle (login, cookie refresh, logout)
//! - A generic `get`/`post`/`put`/`delete` dispatcher
//! - Cursor pagination over listing endpoints
//! - Resource helpers for users and loans
//! - Configuration loading and logging bootstrap
//!
//! ## Architecture
//! - Pure types and the error taxonomy live in `folio-domain`
//! - Everything that performs I/O lives here
//!
//! ```no_run
//! use folio_client::{FolioClient, UsersApi};
//!
//! # fn main() -> folio_domain::Result<()> {
//! let mut client = FolioClient::from_env()?;
//! for user in client.iter_users(Some("active==true"))? {
//!     let user = user?;
//!     println!("{}", user["username"]);
//! }
//! client.close()
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod pagination;
pub mod resources;

// Re-export commonly used items
pub use auth::{Session, TokenStatus};
pub use client::FolioClient;
pub use folio_domain::{ClientConfig, FolioError, GetOptions, Record, ResponseBody, Result};
pub use logging::LogFormat;
pub use pagination::{PageCursor, Pages};
pub use resources::{LoansApi, UsersApi};
