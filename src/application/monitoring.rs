use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::adapters::{EventLog, TrendStore};
use crate::application::inventory::InventoryCache;
use crate::application::predictor;
use crate::application::stress::{StressBoard, StressStatus};
use crate::config::{MonitorConfig, PredictionHorizons, StressThresholds};
use crate::domain::{
    DiskPrediction, EventKind, InventorySnapshot, ProcInfo, ReportEvent, Stats, TrendPoint, VolumeStats,
};
use crate::error::{AnalyticsError, ConfigError, InventoryError, MonitorError};
use crate::ports::{ContainerSource, SampleSource};

pub const RESOURCE_CPU: &str = "cpu";
pub const RESOURCE_RAM: &str = "ram";
pub const RESOURCE_SWAP: &str = "swap";
pub const RESOURCE_DISK_IO: &str = "disk_io";
pub const RESOURCE_LOAD: &str = "load";

/// Main application service tying samples to the analytics core
pub struct MonitoringService {
    sample_source: Arc<dyn SampleSource>,
    container_source: Arc<dyn ContainerSource>,
    thresholds: StressThresholds,
    horizons: PredictionHorizons,
    stress: StressBoard,
    trends: TrendStore,
    events: EventLog,
    inventory: InventoryCache,
    last_tick: Mutex<Option<DateTime<Utc>>>,
    volumes: RwLock<BTreeMap<String, VolumeStats>>,
    disk_alerts: Mutex<HashMap<String, EventKind>>,
}

impl MonitoringService {
    pub fn new(
        config: MonitorConfig,
        sample_source: Arc<dyn SampleSource>,
        container_source: Arc<dyn ContainerSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let analytics = &config.analytics;

        let mut resources = vec![RESOURCE_CPU, RESOURCE_RAM, RESOURCE_SWAP, RESOURCE_DISK_IO];
        if config.thresholds.load_one.is_some() {
            resources.push(RESOURCE_LOAD);
        }

        Ok(Self {
            sample_source,
            container_source,
            stress: StressBoard::new(analytics.stress_notify_after_chrono()?).with_resources(resources),
            trends: TrendStore::new(analytics.trend_capacity),
            events: EventLog::new(analytics.event_log_capacity),
            inventory: InventoryCache::new(analytics.inventory_ttl),
            thresholds: config.thresholds,
            horizons: config.horizons,
            last_tick: Mutex::new(None),
            volumes: RwLock::new(BTreeMap::new()),
            disk_alerts: Mutex::new(HashMap::new()),
        })
    }

    /// Take one sample from the source and ingest it.
    ///
    /// A source failure leaves all analytics state untouched.
    pub async fn tick(&self) -> Result<Vec<ReportEvent>, MonitorError> {
        let stats = self.sample_source.sample().await.map_err(|e| {
            warn!(error = %e, "Sample source failed, skipping tick");
            MonitorError::Source(e)
        })?;
        Ok(self.ingest(&stats)?)
    }

    /// Feed one snapshot through stress tracking, trend history and forecasting
    pub fn ingest(&self, stats: &Stats) -> Result<Vec<ReportEvent>, AnalyticsError> {
        stats.validate()?;
        let now = stats.timestamp;
        self.advance_clock(now)?;

        let mut events = Vec::new();

        for (resource, stressed) in self.stress_signals(stats) {
            let produced = self.stress.update(resource, stressed, now);
            let notified = produced.iter().any(|e| e.kind == EventKind::Critical);
            events.extend(produced);
            if notified {
                events.extend(culprit_action(resource, stats, now));
            }
        }

        // Stress state is already committed, so its events are recorded even
        // when a volume step fails.
        let outcome = self.ingest_volumes(stats, now, &mut events);

        debug!(events = events.len(), "Tick ingested");
        self.events.record_all(events.iter().cloned());
        outcome.map(|()| events)
    }

    /// Trend, forecast and disk events per volume.
    ///
    /// A failing volume does not stop the others; the first error is returned.
    fn ingest_volumes(
        &self,
        stats: &Stats,
        now: DateTime<Utc>,
        events: &mut Vec<ReportEvent>,
    ) -> Result<(), AnalyticsError> {
        let mut first_error = None;

        for (name, volume) in &stats.volumes {
            let step = self
                .trends
                .append(name, TrendPoint::new(now, volume.used_gb()))
                .and_then(|()| self.predict_volume(name, volume));
            match step {
                Ok(Some(prediction)) => events.extend(self.disk_events(name, &prediction, now)),
                Ok(None) => {}
                Err(e) => {
                    warn!(volume = %name, error = %e, "Volume skipped this tick");
                    first_error.get_or_insert(e);
                }
            }
        }
        *self.volumes.write() = stats.volumes.clone();

        first_error.map_or(Ok(()), Err)
    }

    fn advance_clock(&self, now: DateTime<Utc>) -> Result<(), AnalyticsError> {
        let mut last_tick = self.last_tick.lock();
        if let Some(last) = *last_tick {
            if now < last {
                return Err(AnalyticsError::InvalidOrder {
                    series: "stats".to_string(),
                    at: now,
                    last,
                });
            }
        }
        *last_tick = Some(now);
        Ok(())
    }

    fn stress_signals(&self, stats: &Stats) -> Vec<(&'static str, bool)> {
        let t = &self.thresholds;
        let mut signals = vec![
            (RESOURCE_CPU, stats.cpu_percent > t.cpu_percent),
            (RESOURCE_RAM, stats.ram_percent > t.ram_percent),
            (RESOURCE_SWAP, stats.swap_percent > t.swap_percent),
            (RESOURCE_DISK_IO, stats.disk_io.util_percent > t.disk_util_percent),
        ];
        if let Some(load) = t.load_one {
            signals.push((RESOURCE_LOAD, stats.load.one > load));
        }
        signals
    }

    fn predict_volume(&self, name: &str, volume: &VolumeStats) -> Result<Option<DiskPrediction>, AnalyticsError> {
        let Some(capacity) = volume.capacity_gb() else {
            return Ok(None);
        };
        predictor::predict(&self.trends.series(name), capacity, volume.used_gb()).map(Some)
    }

    fn disk_events(&self, name: &str, prediction: &DiskPrediction, now: DateTime<Utc>) -> Vec<ReportEvent> {
        let days = prediction.days_until_full;
        let level = if days < self.horizons.critical_days {
            Some(EventKind::Critical)
        } else if days < self.horizons.warning_days {
            Some(EventKind::Warning)
        } else {
            None
        };

        let mut alerts = self.disk_alerts.lock();
        let Some(level) = level else {
            if alerts.remove(name).is_some() {
                debug!(volume = name, "Disk forecast back outside horizons");
            }
            return Vec::new();
        };
        if alerts.get(name) == Some(&level) {
            return Vec::new();
        }
        alerts.insert(name.to_string(), level);

        let mut events = vec![ReportEvent::new(
            now,
            level,
            format!(
                "{name} predicted full in {days:.1} days ({:.2} GB/day)",
                prediction.gb_per_day
            ),
        )];
        if level == EventKind::Critical {
            events.push(ReportEvent::action(now, format!("free space on {name} before it fills")));
        }
        events
    }

    /// Live stress status of every tracked resource
    pub fn stress_statuses(&self, now: DateTime<Utc>) -> Vec<StressStatus> {
        self.stress.statuses(now)
    }

    /// Forecast for one volume from its trend and latest sample
    pub fn prediction(&self, volume: &str) -> Result<Option<DiskPrediction>, AnalyticsError> {
        let latest = self.volumes.read().get(volume).copied();
        match latest {
            Some(stats) => self.predict_volume(volume, &stats),
            None => Ok(None),
        }
    }

    /// Forecasts for every volume seen in the latest sample
    pub fn predictions(&self) -> Result<BTreeMap<String, DiskPrediction>, AnalyticsError> {
        let latest = self.volumes.read().clone();
        let mut predictions = BTreeMap::new();
        for (name, stats) in &latest {
            if let Some(prediction) = self.predict_volume(name, stats)? {
                predictions.insert(name.clone(), prediction);
            }
        }
        Ok(predictions)
    }

    /// Container inventory, at most one TTL old
    pub async fn containers(&self) -> Result<Arc<InventorySnapshot>, InventoryError> {
        self.inventory.get(self.container_source.as_ref()).await
    }

    /// Events recorded since the last drain
    pub fn drain_events(&self) -> Vec<ReportEvent> {
        self.events.drain()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn trends(&self) -> &TrendStore {
        &self.trends
    }

    pub fn stress(&self) -> &StressBoard {
        &self.stress
    }
}

/// Suggest the heaviest process for a resource that just crossed its notify threshold
fn culprit_action(resource: &str, stats: &Stats, now: DateTime<Utc>) -> Option<ReportEvent> {
    let candidates: &[ProcInfo] = match resource {
        RESOURCE_RAM | RESOURCE_SWAP => &stats.top_ram,
        _ => &stats.top_cpu,
    };
    let top = candidates.first()?;
    Some(ReportEvent::action(
        now,
        format!(
            "inspect {} (cpu {:.1}%, mem {:.1}%) for sustained {resource} stress",
            top.name, top.cpu_percent, top.mem_percent
        ),
    ))
}
