//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! opening a client with it.

mod support;

use std::io::Write;

use folio_client::{config, FolioClient, FolioError};
use support::StubServer;
use tempfile::{Builder, TempDir};

#[test]
fn test_load_config_from_json_file() {
    let mut temp_file =
        Builder::new().suffix(".json").tempfile().expect("Failed to create temp file");
    temp_file
        .write_all(
            br#"{
                "base_url": "https://folio.example.edu/okapi/",
                "tenant": "diku",
                "username": "circ-desk",
                "password": "pw",
                "timeout_seconds": 30,
                "token_refresh_buffer_seconds": 15
            }"#,
        )
        .expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.normalized_base_url(), "https://folio.example.edu/okapi");
    assert_eq!(config.tenant, "diku");
    assert_eq!(config.username, "circ-desk");
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.token_refresh_buffer_seconds, 15);
}

#[test]
fn test_load_config_from_toml_file() {
    let mut temp_file =
        Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");
    temp_file
        .write_all(
            br#"
base_url = "http://localhost:9130"
tenant = "diku"
username = "diku_admin"
password = "admin"
"#,
        )
        .expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.base_url, "http://localhost:9130");
    assert_eq!(config.timeout_seconds, 60);
    assert_eq!(config.token_refresh_buffer_seconds, 10);
}

#[test]
fn test_incomplete_file_is_config_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("folio.json");
    std::fs::write(&path, r#"{"base_url": "http://localhost:9130", "tenant": "diku"}"#)
        .expect("Failed to write config");

    let result = config::load_from_file(Some(path));
    assert!(matches!(result, Err(FolioError::Config(_))), "got {:?}", result);
}

#[test]
fn test_file_config_opens_session() {
    let stub = StubServer::with_auth();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("folio.toml");
    std::fs::write(
        &path,
        format!(
            "base_url = \"{}\"\n\
             tenant = \"diku\"\n\
             username = \"diku_admin\"\n\
             password = \"admin\"\n\
             timeout_seconds = 5\n",
            stub.uri()
        ),
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("config should load");
    let client = FolioClient::new(config).expect("client should log in");

    assert_eq!(client.session().tenant(), "diku");
    client.close().expect("logout should succeed");
    assert_eq!(stub.requests_to("/authn/logout").len(), 1);
}
