//! Application configuration structures
//!
//! Loading (environment variables, config files) lives in
//! `gifscout-infra::config`; this module only defines the shape and the
//! invariants.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_BACKOFF_FACTOR, DEFAULT_BACKOFF_INITIAL_DELAY_MS,
    DEFAULT_BACKOFF_MAX_DELAY_MS, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_DEVICE,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::errors::{GifScoutError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Check cross-field invariants before any component is built.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_uri.trim().is_empty() {
            return Err(GifScoutError::Config("api.base_uri must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(GifScoutError::Config("api.timeout_secs must be greater than 0".into()));
        }
        self.backoff.validate()?;
        if self.storage.pool_size == 0 {
            return Err(GifScoutError::Config("storage.pool_size must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Remote API endpoint and client identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_uri: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_app")]
    pub app: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default)]
    pub device_id: String,
}

impl ApiConfig {
    pub fn new(base_uri: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
            app: default_app(),
            app_version: default_app_version(),
            device: default_device(),
            device_id: String::new(),
        }
    }

    /// `User-Agent` header value: `app/version (device)`.
    pub fn user_agent(&self) -> String {
        format!("{}/{} ({})", self.app, self.app_version, self.device)
    }
}

/// Retry backoff parameters, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub factor: f64,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// `None` retries without limit.
    pub max_retries: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            factor: DEFAULT_BACKOFF_FACTOR,
            initial_delay_ms: DEFAULT_BACKOFF_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_BACKOFF_MAX_DELAY_MS,
            max_retries: None,
        }
    }
}

impl BackoffConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_delay_ms == 0 {
            return Err(GifScoutError::Config("backoff.initial_delay_ms must be greater than 0".into()));
        }
        if self.max_delay_ms <= self.initial_delay_ms {
            return Err(GifScoutError::Config(
                "backoff.max_delay_ms must be greater than backoff.initial_delay_ms".into(),
            ));
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(GifScoutError::Config("backoff.factor must be a finite number >= 1".into()));
        }
        Ok(())
    }
}

/// Local transaction store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_app() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}
