use serde::{Deserialize, Serialize};

/// System load average (1, 5, 15 minutes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadAverage {
    pub fn new(one: f64, five: f64, fifteen: f64) -> Self {
        Self { one, five, fifteen }
    }

    pub fn zero() -> Self {
        Self {
            one: 0.0,
            five: 0.0,
            fifteen: 0.0,
        }
    }
}

/// Aggregate disk throughput
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskIo {
    pub read_mb_s: f64,
    pub write_mb_s: f64,
    pub util_percent: f64,
}

impl DiskIo {
    pub fn new(read_mb_s: f64, write_mb_s: f64, util_percent: f64) -> Self {
        Self {
            read_mb_s,
            write_mb_s,
            util_percent,
        }
    }

    pub fn zero() -> Self {
        Self {
            read_mb_s: 0.0,
            write_mb_s: 0.0,
            util_percent: 0.0,
        }
    }
}

/// Process usage at sample time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcInfo {
    pub name: String,
    pub mem_percent: f64,
    pub cpu_percent: f64,
}

impl ProcInfo {
    pub fn new(name: impl Into<String>, mem_percent: f64, cpu_percent: f64) -> Self {
        Self {
            name: name.into(),
            mem_percent,
            cpu_percent,
        }
    }
}
