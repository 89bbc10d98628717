// Exponential delay strategy for the backoff controller
use std::time::Duration;

use super::constants::{DEFAULT_FACTOR, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY, MIN_FACTOR};
use super::error::BackoffResult;
use crate::error::CommonError;

/// Parameters for [`ExponentialBackoffStrategy`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffOptions {
    pub factor: f64,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffOptions {
    fn default() -> Self {
        Self {
            factor: DEFAULT_FACTOR,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl BackoffOptions {
    /// Set the growth factor
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Set the first delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay cap
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Check the invariants `0 < initial_delay < max_delay` and `factor >= 1`.
    pub fn validate(&self) -> BackoffResult<()> {
        if self.initial_delay.is_zero() {
            return Err(CommonError::config_field(
                "initial_delay",
                "initial delay must be greater than zero",
            )
            .into());
        }
        if self.max_delay.is_zero() {
            return Err(
                CommonError::config_field("max_delay", "max delay must be greater than zero").into()
            );
        }
        if self.max_delay <= self.initial_delay {
            return Err(CommonError::config_field(
                "max_delay",
                format!(
                    "max delay ({:?}) must be greater than initial delay ({:?})",
                    self.max_delay, self.initial_delay
                ),
            )
            .into());
        }
        if !self.factor.is_finite() || self.factor < MIN_FACTOR {
            return Err(CommonError::config_field(
                "factor",
                format!("factor must be a finite number >= {MIN_FACTOR}, got {}", self.factor),
            )
            .into());
        }
        Ok(())
    }
}

/// Delay sequence that grows by `factor` on every step, clamped at `max_delay`
#[derive(Debug, Clone)]
pub struct ExponentialBackoffStrategy {
    options: BackoffOptions,
    current_delay: Duration,
}

impl ExponentialBackoffStrategy {
    /// Build a strategy, rejecting invalid parameters.
    pub fn new(options: BackoffOptions) -> BackoffResult<Self> {
        options.validate()?;
        Ok(Self { options, current_delay: options.initial_delay })
    }

    /// Return the current delay and advance to the next one.
    pub fn next(&mut self) -> Duration {
        let delay = self.current_delay;
        let grown = Duration::try_from_secs_f64(self.current_delay.as_secs_f64() * self.options.factor)
            .unwrap_or(self.options.max_delay);
        self.current_delay = grown.min(self.options.max_delay);
        delay
    }

    /// Restart the sequence at `initial_delay`.
    pub fn reset(&mut self) {
        self.current_delay = self.options.initial_delay;
    }

    /// Delay the next call to [`Self::next`] will return.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn options(&self) -> &BackoffOptions {
        &self.options
    }
}

impl Default for ExponentialBackoffStrategy {
    fn default() -> Self {
        let options = BackoffOptions::default();
        Self { options, current_delay: options.initial_delay }
    }
}
