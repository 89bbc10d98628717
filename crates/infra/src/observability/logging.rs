//! Tracing subscriber bootstrap

use std::env;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "GIFSCOUT_LOG";

const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber.
///
/// Precedence for the filter:
/// 1) `RUST_LOG`
/// 2) `GIFSCOUT_LOG`
/// 3) `info`
///
/// Returns `false` when a subscriber was already installed; calling it twice
/// is harmless.
pub fn init(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt().with_target(true).with_env_filter(filter_from_env());
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    installed.is_ok()
}

fn filter_from_env() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if let Some(filter) = env::var(LOG_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
    {
        return filter;
    }

    EnvFilter::new(DEFAULT_FILTER)
}
