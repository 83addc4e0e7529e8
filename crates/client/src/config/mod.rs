//! Configuration loading
//!
//! Builds a [`ClientConfig`](folio_domain::ClientConfig) from `FOLIO_*`
//! environment variables, a `.env` file, or a JSON/TOML config file.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
