use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DiskIo, LoadAverage, ProcInfo};
use crate::error::AnalyticsError;

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Usage of one storage volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    /// Used space in percent, 0-100
    pub used: f64,
    /// Free bytes
    pub free: u64,
    /// Volume size in bytes, 0 when unknown
    pub total: u64,
}

impl VolumeStats {
    pub fn new(used: f64, free: u64, total: u64) -> Self {
        Self { used, free, total }
    }

    pub fn used_bytes(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }

    pub fn used_gb(&self) -> f64 {
        self.used_bytes() as f64 / BYTES_PER_GB
    }

    pub fn capacity_gb(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.total as f64 / BYTES_PER_GB)
    }
}

/// One point-in-time resource snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub swap_percent: f64,
    pub ram_free_mb: u64,
    pub ram_total_mb: u64,
    pub load: LoadAverage,
    pub uptime_seconds: u64,
    pub volumes: BTreeMap<String, VolumeStats>,
    pub disk_io: DiskIo,
    pub top_cpu: Vec<ProcInfo>,
    pub top_ram: Vec<ProcInfo>,
}

impl Stats {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            cpu_percent: 0.0,
            ram_percent: 0.0,
            swap_percent: 0.0,
            ram_free_mb: 0,
            ram_total_mb: 0,
            load: LoadAverage::zero(),
            uptime_seconds: 0,
            volumes: BTreeMap::new(),
            disk_io: DiskIo::zero(),
            top_cpu: Vec::new(),
            top_ram: Vec::new(),
        }
    }

    pub fn with_usage(mut self, cpu_percent: f64, ram_percent: f64, swap_percent: f64) -> Self {
        self.cpu_percent = cpu_percent;
        self.ram_percent = ram_percent;
        self.swap_percent = swap_percent;
        self
    }

    pub fn with_memory(mut self, ram_free_mb: u64, ram_total_mb: u64) -> Self {
        self.ram_free_mb = ram_free_mb;
        self.ram_total_mb = ram_total_mb;
        self
    }

    pub fn with_load(mut self, load: LoadAverage, uptime_seconds: u64) -> Self {
        self.load = load;
        self.uptime_seconds = uptime_seconds;
        self
    }

    pub fn with_volume(mut self, name: impl Into<String>, volume: VolumeStats) -> Self {
        self.volumes.insert(name.into(), volume);
        self
    }

    pub fn with_disk_io(mut self, disk_io: DiskIo) -> Self {
        self.disk_io = disk_io;
        self
    }

    pub fn with_processes(mut self, top_cpu: Vec<ProcInfo>, top_ram: Vec<ProcInfo>) -> Self {
        self.top_cpu = top_cpu;
        self.top_ram = top_ram;
        self
    }

    /// Reject samples carrying NaN, infinite or out-of-range readings
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        check_percent("cpu_percent", self.cpu_percent)?;
        check_percent("ram_percent", self.ram_percent)?;
        check_percent("swap_percent", self.swap_percent)?;
        check_non_negative("load.one", self.load.one)?;
        check_non_negative("load.five", self.load.five)?;
        check_non_negative("load.fifteen", self.load.fifteen)?;
        check_non_negative("disk_io.read_mb_s", self.disk_io.read_mb_s)?;
        check_non_negative("disk_io.write_mb_s", self.disk_io.write_mb_s)?;
        check_percent("disk_io.util_percent", self.disk_io.util_percent)?;

        for (name, volume) in &self.volumes {
            check_percent(&format!("volumes[{name}].used"), volume.used)?;
        }

        for proc_info in self.top_cpu.iter().chain(&self.top_ram) {
            check_non_negative(&format!("{}.cpu_percent", proc_info.name), proc_info.cpu_percent)?;
            check_non_negative(&format!("{}.mem_percent", proc_info.name), proc_info.mem_percent)?;
        }

        Ok(())
    }
}

fn check_percent(field: &str, value: f64) -> Result<(), AnalyticsError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AnalyticsError::invalid(field, value));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), AnalyticsError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AnalyticsError::invalid(field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Stats {
        Stats::new(Utc::now())
            .with_usage(42.0, 63.5, 0.0)
            .with_load(LoadAverage::new(0.5, 0.7, 0.9), 3600)
            .with_volume("/", VolumeStats::new(50.0, 50 << 30, 100 << 30))
            .with_volume("/home", VolumeStats::new(10.0, 90 << 30, 100 << 30))
            .with_processes(vec![ProcInfo::new("postgres", 12.0, 35.0)], Vec::new())
    }

    #[test]
    fn valid_sample_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn nan_cpu_is_rejected() {
        let stats = sample().with_usage(f64::NAN, 10.0, 0.0);
        assert!(matches!(
            stats.validate(),
            Err(AnalyticsError::InvalidValue { field, .. }) if field == "cpu_percent"
        ));
    }

    #[test]
    fn volume_over_hundred_percent_is_rejected() {
        let stats = sample().with_volume("/data", VolumeStats::new(120.0, 0, 10));
        assert!(stats.validate().is_err());
    }

    #[test]
    fn volume_sizes_convert_to_gb() {
        let volume = VolumeStats::new(25.0, 75 << 30, 100 << 30);
        assert_eq!(volume.used_bytes(), 25 << 30);
        assert!((volume.used_gb() - 25.0).abs() < 1e-9);
        assert_eq!(volume.capacity_gb(), Some(100.0));
        assert_eq!(VolumeStats::new(0.0, 0, 0).capacity_gb(), None);
    }
}
