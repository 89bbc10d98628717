//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Searches several paths for a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GIFSCOUT_API_BASE_URI`: Search endpoint (required)
//! - `GIFSCOUT_API_KEY`: API key (required)
//! - `GIFSCOUT_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `GIFSCOUT_DEVICE_ID`: Sent as `X-Device-Id`
//! - `GIFSCOUT_DB_PATH`: Database file path
//! - `GIFSCOUT_DB_POOL_SIZE`: Connection pool size
//! - `GIFSCOUT_BACKOFF_FACTOR`, `GIFSCOUT_BACKOFF_INITIAL_DELAY_MS`,
//!   `GIFSCOUT_BACKOFF_MAX_DELAY_MS`, `GIFSCOUT_BACKOFF_MAX_RETRIES`
//!
//! ## File Locations
//! The loader checks the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./gifscout.json` or `./gifscout.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use gifscout_domain::{ApiConfig, BackoffConfig, Config, GifScoutError, Result, StorageConfig};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file. The
/// result is validated either way.
///
/// # Errors
/// Returns `GifScoutError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value violates the configuration invariants
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only the API base URI and key are required; everything else falls back
/// to the defaults.
///
/// # Errors
/// Returns `GifScoutError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let mut api = ApiConfig::new(env_var("GIFSCOUT_API_BASE_URI")?, env_var("GIFSCOUT_API_KEY")?);
    if let Some(timeout) = env_parse::<u64>("GIFSCOUT_API_TIMEOUT_SECS")? {
        api.timeout_secs = timeout;
    }
    if let Ok(device_id) = std::env::var("GIFSCOUT_DEVICE_ID") {
        api.device_id = device_id;
    }

    let mut storage = StorageConfig::default();
    if let Ok(path) = std::env::var("GIFSCOUT_DB_PATH") {
        storage.path = path;
    }
    if let Some(pool_size) = env_parse::<u32>("GIFSCOUT_DB_POOL_SIZE")? {
        storage.pool_size = pool_size;
    }

    let mut backoff = BackoffConfig::default();
    if let Some(factor) = env_parse::<f64>("GIFSCOUT_BACKOFF_FACTOR")? {
        backoff.factor = factor;
    }
    if let Some(initial) = env_parse::<u64>("GIFSCOUT_BACKOFF_INITIAL_DELAY_MS")? {
        backoff.initial_delay_ms = initial;
    }
    if let Some(max) = env_parse::<u64>("GIFSCOUT_BACKOFF_MAX_DELAY_MS")? {
        backoff.max_delay_ms = max;
    }
    backoff.max_retries = env_parse::<u32>("GIFSCOUT_BACKOFF_MAX_RETRIES")?;

    Ok(Config { api, backoff, storage })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for a config file.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `GifScoutError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GifScoutError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            GifScoutError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GifScoutError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GifScoutError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GifScoutError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(GifScoutError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search several paths for a configuration file
///
/// Returns the first config file found, or `None` if no file exists.
pub fn find_config_path() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("gifscout.json"),
        dir.join("gifscout.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        GifScoutError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable; unset yields `None`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GifScoutError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: &[&str] = &[
        "GIFSCOUT_API_BASE_URI",
        "GIFSCOUT_API_KEY",
        "GIFSCOUT_API_TIMEOUT_SECS",
        "GIFSCOUT_DEVICE_ID",
        "GIFSCOUT_DB_PATH",
        "GIFSCOUT_DB_POOL_SIZE",
        "GIFSCOUT_BACKOFF_FACTOR",
        "GIFSCOUT_BACKOFF_INITIAL_DELAY_MS",
        "GIFSCOUT_BACKOFF_MAX_DELAY_MS",
        "GIFSCOUT_BACKOFF_MAX_RETRIES",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("GIFSCOUT_API_BASE_URI", "https://api.test/v1/gifs/search");
        std::env::set_var("GIFSCOUT_API_KEY", "key-1");
        std::env::set_var("GIFSCOUT_API_TIMEOUT_SECS", "12");
        std::env::set_var("GIFSCOUT_DEVICE_ID", "device-7");
        std::env::set_var("GIFSCOUT_DB_PATH", "/tmp/test.db");
        std::env::set_var("GIFSCOUT_DB_POOL_SIZE", "5");
        std::env::set_var("GIFSCOUT_BACKOFF_INITIAL_DELAY_MS", "250");
        std::env::set_var("GIFSCOUT_BACKOFF_MAX_RETRIES", "6");

        let config = load_from_env().expect("config from env");
        assert_eq!(config.api.base_uri, "https://api.test/v1/gifs/search");
        assert_eq!(config.api.api_key, "key-1");
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.api.device_id, "device-7");
        assert_eq!(config.storage.path, "/tmp/test.db");
        assert_eq!(config.storage.pool_size, 5);
        assert_eq!(config.backoff.initial_delay_ms, 250);
        assert_eq!(config.backoff.max_delay_ms, 60_000);
        assert_eq!(config.backoff.max_retries, Some(6));

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("GIFSCOUT_API_BASE_URI", "https://api.test");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, GifScoutError::Config(_)), "Should be a Config error");

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("GIFSCOUT_API_BASE_URI", "https://api.test");
        std::env::set_var("GIFSCOUT_API_KEY", "k");
        std::env::set_var("GIFSCOUT_DB_POOL_SIZE", "not-a-number");

        let err = load_from_env().unwrap_err();
        match err {
            GifScoutError::Config(msg) => assert!(msg.contains("GIFSCOUT_DB_POOL_SIZE")),
            other => panic!("expected config error, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{
            "api": { "base_uri": "https://api.test", "api_key": "k" },
            "storage": { "path": "test.db" }
        }"#;

        let config = parse_config(json_content, Path::new("test.json")).expect("valid JSON");
        assert_eq!(config.storage.path, "test.db");
        assert_eq!(config.storage.pool_size, 4);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
[api]
base_uri = "https://api.test"
api_key = "k"
device = "desktop"

[backoff]
factor = 1.5
max_retries = 3
"#;

        let config = parse_config(toml_content, Path::new("test.toml")).expect("valid TOML");
        assert_eq!(config.api.user_agent(), format!("gifscout/{} (desktop)", config.api.app_version));
        assert_eq!(config.backoff.factor, 1.5);
        assert_eq!(config.backoff.max_retries, Some(3));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", Path::new("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(GifScoutError::Config(_))));
    }
}
