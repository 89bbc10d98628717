//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use gifscout_domain::GifScoutError;
use gifscout_infra::config;
use tempfile::NamedTempFile;

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() {
    let file = config_file(
        ".json",
        r#"{
            "api": {
                "base_uri": "https://api.test/v1/gifs/search",
                "api_key": "json-key",
                "timeout_secs": 15,
                "device_id": "device-1"
            },
            "backoff": {
                "factor": 3.0,
                "initial_delay_ms": 200,
                "max_delay_ms": 10000,
                "max_retries": 4
            },
            "storage": { "path": "/tmp/gifscout-integration.db", "pool_size": 2 }
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("config loads");

    assert_eq!(config.api.api_key, "json-key");
    assert_eq!(config.api.timeout_secs, 15);
    assert_eq!(config.api.device_id, "device-1");
    assert_eq!(config.backoff.factor, 3.0);
    assert_eq!(config.backoff.initial_delay_ms, 200);
    assert_eq!(config.backoff.max_retries, Some(4));
    assert_eq!(config.storage.path, "/tmp/gifscout-integration.db");
    assert_eq!(config.storage.pool_size, 2);
    config.validate().expect("config is valid");
}

#[test]
fn test_load_config_from_toml_file_uses_defaults() {
    let file = config_file(
        ".toml",
        r#"
[api]
base_uri = "https://api.test/v1/gifs/search"
api_key = "toml-key"
"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("config loads");

    assert_eq!(config.api.api_key, "toml-key");
    assert_eq!(config.api.device, "cli");
    assert_eq!(config.backoff.factor, 2.0);
    assert_eq!(config.backoff.max_retries, None);
    assert_eq!(config.storage.pool_size, 4);
}

#[test]
fn test_invalid_json_is_a_config_error() {
    let file = config_file(".json", "{ this is not json");

    let err = config::load_from_file(Some(file.path().to_path_buf())).unwrap_err();
    match err {
        GifScoutError::Config(msg) => assert!(msg.contains("Invalid JSON format")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_missing_api_section_is_rejected() {
    let file = config_file(".toml", "[storage]\npath = \"x.db\"\n");

    let result = config::load_from_file(Some(file.path().to_path_buf()));
    assert!(matches!(result, Err(GifScoutError::Config(_))));
}

#[test]
fn test_loaded_values_still_go_through_validation() {
    let file = config_file(
        ".toml",
        r#"
[api]
base_uri = "https://api.test"
api_key = "k"

[backoff]
initial_delay_ms = 5000
max_delay_ms = 100
"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("file parses");
    assert!(matches!(config.validate(), Err(GifScoutError::Config(_))));
}
