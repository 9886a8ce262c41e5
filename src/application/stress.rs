//! Per-resource stress-period tracking.
//!
//! A resource is "stressed" while an externally computed over-threshold
//! signal stays true. The tracker only reacts to that boolean; threshold
//! policy belongs to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::ReportEvent;

/// Stress-period state machine for one resource
#[derive(Debug, Clone, PartialEq)]
pub struct StressTracker {
    /// Start of the ongoing period, `None` while idle
    pub current_start: Option<DateTime<Utc>>,
    /// Completed periods
    pub stress_count: u64,
    pub longest_stress: Duration,
    pub total_stress: Duration,
    /// Whether the ongoing period already produced its notification
    pub notified: bool,
}

/// Serializable live view of a tracker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressStatus {
    pub resource: String,
    pub stressed: bool,
    pub current_seconds: i64,
    pub stress_count: u64,
    pub longest_seconds: i64,
    pub total_seconds: i64,
    pub notified: bool,
}

impl Default for StressTracker {
    fn default() -> Self {
        Self {
            current_start: None,
            stress_count: 0,
            longest_stress: Duration::zero(),
            total_stress: Duration::zero(),
            notified: false,
        }
    }
}

impl StressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stressed(&self) -> bool {
        self.current_start.is_some()
    }

    /// Length of the ongoing period at `now`, zero while idle
    pub fn current_duration(&self, now: DateTime<Utc>) -> Duration {
        self.current_start
            .map(|start| elapsed(start, now))
            .unwrap_or_else(Duration::zero)
    }

    /// Feed one tick of the over-threshold signal
    pub fn update(
        &mut self,
        resource: &str,
        stressed_now: bool,
        now: DateTime<Utc>,
        notify_after: Duration,
    ) -> Vec<ReportEvent> {
        let mut events = Vec::new();

        match (self.current_start, stressed_now) {
            (None, false) => {}
            (None, true) => {
                debug!(resource, "Stress period started");
                self.current_start = Some(now);
                self.notified = false;
                self.check_notify(resource, now, now, notify_after, &mut events);
            }
            (Some(start), true) => {
                self.check_notify(resource, start, now, notify_after, &mut events);
            }
            (Some(start), false) => {
                let duration = elapsed(start, now);
                self.stress_count += 1;
                self.longest_stress = self.longest_stress.max(duration);
                self.total_stress = self.total_stress + duration;
                self.current_start = None;
                debug!(resource, seconds = duration.num_seconds(), "Stress period ended");

                if self.notified {
                    events.push(ReportEvent::info(
                        now,
                        format!("{resource} stress resolved after {}", format_duration(duration)),
                    ));
                }
                self.notified = false;
            }
        }

        events
    }

    fn check_notify(
        &mut self,
        resource: &str,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
        notify_after: Duration,
        events: &mut Vec<ReportEvent>,
    ) {
        if self.notified {
            return;
        }
        let duration = elapsed(start, now);
        if duration < notify_after {
            return;
        }

        self.notified = true;
        info!(resource, seconds = duration.num_seconds(), "Sustained stress detected");
        events.push(ReportEvent::critical(
            now,
            format!("{resource} under sustained stress for {}", format_duration(duration)),
        ));
    }

    pub fn status(&self, resource: &str, now: DateTime<Utc>) -> StressStatus {
        StressStatus {
            resource: resource.to_string(),
            stressed: self.is_stressed(),
            current_seconds: self.current_duration(now).num_seconds(),
            stress_count: self.stress_count,
            longest_seconds: self.longest_stress.num_seconds(),
            total_seconds: self.total_stress.num_seconds(),
            notified: self.notified,
        }
    }
}

/// Trackers for every monitored resource, sharing one notify threshold
#[derive(Debug)]
pub struct StressBoard {
    trackers: Mutex<BTreeMap<String, StressTracker>>,
    notify_after: Duration,
}

impl StressBoard {
    pub fn new(notify_after: Duration) -> Self {
        Self {
            trackers: Mutex::new(BTreeMap::new()),
            notify_after,
        }
    }

    /// Pre-create idle trackers so they show up in status before their first tick
    pub fn with_resources<I, S>(self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut trackers = self.trackers.lock();
            for resource in resources {
                trackers.entry(resource.into()).or_default();
            }
        }
        self
    }

    pub fn notify_after(&self) -> Duration {
        self.notify_after
    }

    pub fn update(&self, resource: &str, stressed_now: bool, now: DateTime<Utc>) -> Vec<ReportEvent> {
        let mut trackers = self.trackers.lock();
        let tracker = trackers.entry(resource.to_string()).or_default();
        tracker.update(resource, stressed_now, now, self.notify_after)
    }

    pub fn tracker(&self, resource: &str) -> Option<StressTracker> {
        self.trackers.lock().get(resource).cloned()
    }

    /// Status of every tracker, ordered by resource id
    pub fn statuses(&self, now: DateTime<Utc>) -> Vec<StressStatus> {
        self.trackers
            .lock()
            .iter()
            .map(|(resource, tracker)| tracker.status(resource, now))
            .collect()
    }
}

// A clock stepping backwards yields an empty period rather than a negative one.
fn elapsed(start: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - start).max(Duration::zero())
}

fn format_duration(duration: Duration) -> String {
    let secs = u64::try_from(duration.num_seconds()).unwrap_or(0);
    humantime::format_duration(std::time::Duration::from_secs(secs)).to_string()
}
