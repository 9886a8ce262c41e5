use std::process::ExitStatus;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Boxed error used at the port boundaries
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the external command runner
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("{name} exited with {status}")]
    Failed {
        name: String,
        status: ExitStatus,
        output: Vec<u8>,
    },

    #[error("{0} cancelled")]
    Cancelled(String),

    #[error("{0} timed out")]
    TimedOut(String),

    #[error("IO error running {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the analytics core on malformed input
#[derive(Debug, Error, PartialEq)]
pub enum AnalyticsError {
    #[error("out-of-order point for {series}: {at} is before {last}")]
    InvalidOrder {
        series: String,
        at: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: f64 },
}

impl AnalyticsError {
    pub(crate) fn invalid(field: impl Into<String>, value: f64) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value,
        }
    }
}

/// Errors raised by the inventory cache
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("container inventory fetch failed: {0}")]
    Fetch(#[source] BoxError),
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(String),

    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Errors raised by a monitoring tick
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("sample source failed: {0}")]
    Source(#[source] BoxError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}
