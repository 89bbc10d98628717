//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Search paging
pub const SEARCH_PAGE_SIZE: u32 = 25;
pub const DEFAULT_SEARCH_BASE_URI: &str = "https://api.giphy.com/v1/gifs/search";

// Client identity defaults
pub const DEFAULT_APP_NAME: &str = "gifscout";
pub const DEFAULT_DEVICE: &str = "cli";
pub const DEVICE_ID_HEADER: &str = "X-Device-Id";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Backoff defaults (milliseconds)
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
pub const DEFAULT_BACKOFF_INITIAL_DELAY_MS: u64 = 100;
pub const DEFAULT_BACKOFF_MAX_DELAY_MS: u64 = 60_000;

// Storage defaults
pub const DEFAULT_DB_PATH: &str = "gifscout.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Connection error fallbacks
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";
