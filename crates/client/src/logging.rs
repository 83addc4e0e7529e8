//! Logging bootstrap for binaries and examples using the client
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the application.
//!
//! ```bash
//! # Everything at debug
//! FOLIO_LOG=debug cargo run --example list_users
//!
//! # Token decisions only
//! FOLIO_LOG=folio_client::auth=debug cargo run --example list_users
//! ```

use folio_domain::{FolioError, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "FOLIO_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Install a global fmt subscriber.
///
/// # Errors
/// Returns `FolioError::Config` if the filter does not parse or a global
/// subscriber is already installed.
pub fn try_init(format: LogFormat) -> Result<()> {
    let filter = env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init(),
    };
    installed.map_err(|e| FolioError::Config(format!("Failed to install log subscriber: {}", e)))
}

/// Like [`try_init`], ignoring a subscriber that is already installed.
pub fn init(format: LogFormat) {
    if let Err(err) = try_init(format) {
        tracing::debug!(error = %err, "logging already initialised");
    }
}

/// `FOLIO_LOG`, then `RUST_LOG`, then `info`.
fn env_filter() -> Result<EnvFilter> {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok()
        .filter(|value| !value.trim().is_empty());

    match directives {
        Some(directives) => EnvFilter::try_new(&directives)
            .map_err(|e| FolioError::Config(format!("Invalid log filter '{}': {}", directives, e))),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}
