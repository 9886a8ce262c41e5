//! Host health analytics.
//!
//! Turns point-in-time resource samples into stress-period state, disk-fill
//! forecasts and classified report events, and keeps a TTL cache of the
//! container inventory. Sampling, scheduling and report delivery live in the
//! integrating process; this crate only reacts to what it is fed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod telemetry;

pub use application::{InventoryCache, MonitoringService, StressBoard, StressTracker};
pub use config::{AnalyticsConfig, MonitorConfig, PredictionHorizons, StressThresholds};
pub use error::{AnalyticsError, BoxError, CommandError, ConfigError, InventoryError, MonitorError};
