// Constants for backoff module
use std::time::Duration;

/// Default multiplier applied to the delay after every scheduled wait
pub const DEFAULT_FACTOR: f64 = 2.0;

/// Default delay before the first retry
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Default maximum delay cap
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Smallest accepted growth factor
pub const MIN_FACTOR: f64 = 1.0;
