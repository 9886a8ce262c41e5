use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped observation of a tracked metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub at: DateTime<Utc>,
    pub value: f64,
}

impl TrendPoint {
    pub fn new(at: DateTime<Utc>, value: f64) -> Self {
        Self { at, value }
    }
}

/// Linear disk-fill forecast for one volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskPrediction {
    /// `f64::INFINITY` when usage is flat, shrinking or there is too little data
    pub days_until_full: f64,
    pub gb_per_day: f64,
    pub samples: usize,
}

impl DiskPrediction {
    pub fn never(samples: usize) -> Self {
        Self {
            days_until_full: f64::INFINITY,
            gb_per_day: 0.0,
            samples,
        }
    }

    pub fn is_filling(&self) -> bool {
        self.days_until_full.is_finite()
    }
}
