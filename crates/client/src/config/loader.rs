//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file from the working directory if one exists
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FOLIO_BASE_URL`: Gateway base URL (required)
//! - `FOLIO_TENANT`: Tenant id (required)
//! - `FOLIO_USER`: Username (required)
//! - `FOLIO_PASSWORD`: Password (required)
//! - `FOLIO_TIMEOUT`: Per-request timeout in seconds (default 60)
//! - `FOLIO_TOKEN_REFRESH_BUFFER`: Seconds before expiry at which the token
//!   is refreshed (default 10)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./folio.json` or `./folio.toml`
//! 2. `./config.json` or `./config.toml`
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use folio_domain::{ClientConfig, FolioError, Result};

/// Gateway base URL.
pub const ENV_BASE_URL: &str = "FOLIO_BASE_URL";
/// Tenant id.
pub const ENV_TENANT: &str = "FOLIO_TENANT";
/// Login username.
pub const ENV_USER: &str = "FOLIO_USER";
/// Login password.
pub const ENV_PASSWORD: &str = "FOLIO_PASSWORD";
/// Per-request timeout in seconds.
pub const ENV_TIMEOUT: &str = "FOLIO_TIMEOUT";
/// Refresh buffer in seconds.
pub const ENV_TOKEN_REFRESH_BUFFER: &str = "FOLIO_TOKEN_REFRESH_BUFFER";

const REQUIRED_VARS: [&str; 4] = [ENV_BASE_URL, ENV_TENANT, ENV_USER, ENV_PASSWORD];

const CONFIG_FILE_NAMES: [&str; 4] = ["folio.json", "folio.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win whenever all required ones are set; only when
/// some are missing does the loader fall back to a config file. Invalid
/// values found in a complete environment are reported, not skipped.
///
/// # Errors
/// Returns `FolioError::Config` if neither source yields a complete
/// configuration, `FolioError::InvalidArgument` for a non-positive timeout,
/// and the validation errors of [`ClientConfig::validate`].
pub fn load() -> Result<ClientConfig> {
    read_dotenv();

    let missing = missing_env_vars();
    if !missing.is_empty() {
        tracing::debug!(missing = %missing.join(", "), "Environment incomplete, trying file");
        return load_from_file(None);
    }

    let config = config_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// A `.env` file in the working directory is read first; variables already
/// set in the process environment take precedence over it.
///
/// # Errors
/// Returns `FolioError::Config` naming every missing required variable at
/// once or describing an unparsable refresh buffer, and
/// `FolioError::InvalidArgument` for a timeout that is not a positive number
/// of seconds.
pub fn load_from_env() -> Result<ClientConfig> {
    read_dotenv();

    let missing = missing_env_vars();
    if !missing.is_empty() {
        return Err(FolioError::Config(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    config_from_env()
}

fn read_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

fn missing_env_vars() -> Vec<&'static str> {
    REQUIRED_VARS.into_iter().filter(|key| env_value(key).is_none()).collect()
}

/// Build and validate a config once every required variable is present.
fn config_from_env() -> Result<ClientConfig> {
    let mut values = REQUIRED_VARS.iter().filter_map(|key| env_value(key));
    let (Some(base_url), Some(tenant), Some(username), Some(password)) =
        (values.next(), values.next(), values.next(), values.next())
    else {
        return Err(FolioError::Config("Incomplete environment configuration".to_string()));
    };

    let mut config = ClientConfig::new(base_url, tenant, username, password);
    if let Some(timeout) = env_timeout()? {
        config = config.with_timeout(timeout);
    }
    if let Some(buffer) = env_u64(ENV_TOKEN_REFRESH_BUFFER)? {
        config = config.with_token_refresh_buffer(buffer);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for a config file.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `FolioError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FolioError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FolioError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FolioError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FolioError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FolioError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(FolioError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Searches the current working directory, then the directory of the
/// running executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::with_capacity(2);

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    let exe_dir = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf));
    if let Some(exe_dir) = exe_dir {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Non-empty value of an environment variable
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    env_value(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| FolioError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// `FOLIO_TIMEOUT` as a positive number of seconds.
fn env_timeout() -> Result<Option<u64>> {
    let Some(raw) = env_value(ENV_TIMEOUT) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Some(seconds)),
        _ => Err(FolioError::InvalidArgument(format!(
            "{} must be a positive number of seconds, got '{}'",
            ENV_TIMEOUT, raw
        ))),
    }
}
