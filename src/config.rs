//! Judge configuration
//!
//! Timeouts are configuration, not request parameters. Callers construct a
//! `JudgeConfig` (or take the defaults) and inject it into the judge, so
//! tests can shrink the limits without code changes.

use std::time::Duration;

/// Configuration for the judging pipeline
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Build step time limit in milliseconds (default: 10000ms = 10s)
    pub compile_time_limit_ms: u64,
    /// Run step time limit in milliseconds (default: 5000ms = 5s)
    pub run_time_limit_ms: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            compile_time_limit_ms: 10_000,
            run_time_limit_ms: 5_000,
        }
    }
}

impl JudgeConfig {
    pub fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_time_limit_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_time_limit_ms)
    }
}
