use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_STRESS_NOTIFY_SECS: &str = "HOSTWATCH_STRESS_NOTIFY_SECS";
pub const ENV_TREND_CAPACITY: &str = "HOSTWATCH_TREND_CAPACITY";
pub const ENV_INVENTORY_TTL_SECS: &str = "HOSTWATCH_INVENTORY_TTL_SECS";
pub const ENV_EVENT_LOG_CAPACITY: &str = "HOSTWATCH_EVENT_LOG_CAPACITY";

/// Parameters of the analytics core.
///
/// All four values are supplied by the integrating system; none has a
/// built-in default.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// How long a stress period must last before it is reported
    pub stress_notify_after: Duration,
    /// Trend points kept per volume
    pub trend_capacity: usize,
    /// Maximum age of a served container inventory
    pub inventory_ttl: Duration,
    /// Report events kept between drains
    pub event_log_capacity: usize,
}

impl AnalyticsConfig {
    pub fn new(
        stress_notify_after: Duration,
        trend_capacity: usize,
        inventory_ttl: Duration,
        event_log_capacity: usize,
    ) -> Self {
        Self {
            stress_notify_after,
            trend_capacity,
            inventory_ttl,
            event_log_capacity,
        }
    }

    /// Load from `HOSTWATCH_*` environment variables and validate
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            stress_notify_after: Duration::from_secs(required(&lookup, ENV_STRESS_NOTIFY_SECS)?),
            trend_capacity: required(&lookup, ENV_TREND_CAPACITY)?,
            inventory_ttl: Duration::from_secs(required(&lookup, ENV_INVENTORY_TTL_SECS)?),
            event_log_capacity: required(&lookup, ENV_EVENT_LOG_CAPACITY)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trend_capacity < 2 {
            return Err(invalid(ENV_TREND_CAPACITY, "at least two points are needed for a forecast"));
        }
        if self.event_log_capacity == 0 {
            return Err(invalid(ENV_EVENT_LOG_CAPACITY, "must be greater than zero"));
        }
        Ok(())
    }

    pub(crate) fn stress_notify_after_chrono(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::from_std(self.stress_notify_after)
            .map_err(|e| invalid(ENV_STRESS_NOTIFY_SECS, &e.to_string()))
    }
}

/// Over-threshold policy turning raw readings into stress signals.
///
/// Site policy; supplied by the integrator like the analytics values.
#[derive(Debug, Clone, PartialEq)]
pub struct StressThresholds {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub swap_percent: f64,
    pub disk_util_percent: f64,
    /// 1-minute load average; `None` disables the load tracker
    pub load_one: Option<f64>,
}

impl StressThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("cpu_percent", self.cpu_percent),
            ("ram_percent", self.ram_percent),
            ("swap_percent", self.swap_percent),
            ("disk_util_percent", self.disk_util_percent),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(invalid(key, "must be a percentage between 0 and 100"));
            }
        }
        if let Some(load) = self.load_one {
            if !load.is_finite() || load <= 0.0 {
                return Err(invalid("load_one", "must be positive"));
            }
        }
        Ok(())
    }
}

/// Forecast horizons, in days, that raise disk events
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionHorizons {
    pub warning_days: f64,
    pub critical_days: f64,
}

impl PredictionHorizons {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.critical_days.is_finite() || self.critical_days < 0.0 {
            return Err(invalid("critical_days", "must be a non-negative number"));
        }
        if !self.warning_days.is_finite() || self.warning_days < self.critical_days {
            return Err(invalid("warning_days", "must not be below critical_days"));
        }
        Ok(())
    }
}

/// Everything the monitoring service needs
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub analytics: AnalyticsConfig,
    pub thresholds: StressThresholds,
    pub horizons: PredictionHorizons,
}

impl MonitorConfig {
    pub fn new(analytics: AnalyticsConfig, thresholds: StressThresholds, horizons: PredictionHorizons) -> Self {
        Self {
            analytics,
            thresholds,
            horizons,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analytics.validate()?;
        self.thresholds.validate()?;
        self.horizons.validate()
    }
}

fn required<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()))?;
    raw.trim().parse().map_err(|e: T::Err| invalid(key, &e.to_string()))
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
