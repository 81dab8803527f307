//! Runner configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason attached to the V3 skip notice unless overridden.
pub const DEFAULT_V3_SKIP_REASON: &str = "Test does not include V3 test.";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} (expected true or false)")]
    InvalidBool { var: String, value: String },
}

/// Configuration for a [`crate::VersionMatrixRunner`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatrixConfig {
    /// Reason carried by the skip notice when a scenario has no V3 coverage.
    pub v3_skip_reason: String,

    /// Queue a pass/fail notice after every executed sub-run.
    pub report_sub_runs: bool,

    /// Emit JSON log lines when the runner initialises tracing.
    pub log_json: bool,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            v3_skip_reason: DEFAULT_V3_SKIP_REASON.to_string(),
            report_sub_runs: true,
            log_json: false,
        }
    }
}

impl MatrixConfig {
    pub fn with_v3_skip_reason(mut self, reason: impl Into<String>) -> Self {
        self.v3_skip_reason = reason.into();
        self
    }

    pub fn with_sub_run_reports(mut self, enabled: bool) -> Self {
        self.report_sub_runs = enabled;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - COMPOSE_MATRIX_V3_SKIP_REASON (optional, default: "Test does not include V3 test.")
    /// - COMPOSE_MATRIX_REPORT_SUB_RUNS (optional, default: "true")
    /// - COMPOSE_MATRIX_LOG_FORMAT (optional, "json" enables JSON logs)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`MatrixConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let v3_skip_reason = lookup("COMPOSE_MATRIX_V3_SKIP_REASON")
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(defaults.v3_skip_reason);

        let report_sub_runs = match lookup("COMPOSE_MATRIX_REPORT_SUB_RUNS") {
            Some(value) => parse_bool("COMPOSE_MATRIX_REPORT_SUB_RUNS", &value)?,
            None => defaults.report_sub_runs,
        };

        let log_json = lookup("COMPOSE_MATRIX_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(defaults.log_json);

        Ok(Self {
            v3_skip_reason,
            report_sub_runs,
            log_json,
        })
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
