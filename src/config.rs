//! Configuration Module
//!
//! Handles loading the demo binary's settings from environment variables.

use std::env;
use std::time::Duration;

/// Demo configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL in seconds of the demo's expiring entry
    pub ttl_secs: u64,
    /// Interval in milliseconds between counter updates
    pub update_interval_ms: u64,
    /// How long the demo runs before shutting down, in seconds
    pub run_secs: u64,
    /// Interval in milliseconds between progress reports
    pub report_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEMO_TTL_SECS` - TTL of the expiring entry (default: 3)
    /// - `DEMO_UPDATE_INTERVAL_MS` - Counter update interval (default: 1000)
    /// - `DEMO_RUN_SECS` - Total run time (default: 10)
    /// - `DEMO_REPORT_INTERVAL_MS` - Report interval (default: 500)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_secs: env_or("DEMO_TTL_SECS", defaults.ttl_secs),
            update_interval_ms: env_or("DEMO_UPDATE_INTERVAL_MS", defaults.update_interval_ms),
            run_secs: env_or("DEMO_RUN_SECS", defaults.run_secs),
            report_interval_ms: env_or("DEMO_REPORT_INTERVAL_MS", defaults.report_interval_ms),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn run_time(&self) -> Duration {
        Duration::from_secs(self.run_secs)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

/// Parses `name` from the environment, falling back to `default`.
fn env_or(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_secs: 3,
            update_interval_ms: 1000,
            run_secs: 10,
            report_interval_ms: 500,
        }
    }
}
