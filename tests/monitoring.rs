use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use hostwatch::adapters::{DockerCliSource, ScriptedRunner};
use hostwatch::domain::{EventKind, ProcInfo, Stats, VolumeStats, BYTES_PER_GB};
use hostwatch::error::CommandError;
use hostwatch::ports::SampleSource;
use hostwatch::{
    AnalyticsConfig, BoxError, MonitorConfig, MonitorError, MonitoringService, PredictionHorizons, StressThresholds,
};

/// Sample source replaying a fixed script of snapshots
struct Replay(Mutex<VecDeque<Stats>>);

#[async_trait]
impl SampleSource for Replay {
    async fn sample(&self) -> Result<Stats, BoxError> {
        self.0.lock().pop_front().ok_or_else(|| "script exhausted".into())
    }
}

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

fn gb(value: f64) -> u64 {
    (value * BYTES_PER_GB) as u64
}

fn snapshot(at: i64, ram: f64, root_used_gb: f64) -> Stats {
    Stats::new(t(at))
        .with_usage(20.0, ram, 0.0)
        .with_memory(512, 16_384)
        .with_volume(
            "/",
            VolumeStats::new(root_used_gb, gb(100.0 - root_used_gb), gb(100.0)),
        )
        .with_volume("/home", VolumeStats::new(30.0, gb(700.0), gb(1000.0)))
        .with_processes(Vec::new(), vec![ProcInfo::new("chrome", 55.0, 8.0)])
}

const PS_OUTPUT: &str = concat!(
    r#"{"ID":"aa11","Image":"postgres:16","Names":"db","State":"running","Status":"Up 9 days"}"#,
    "\n",
    r#"{"ID":"bb22","Image":"redis:7","Names":"cache","State":"exited","Status":"Exited (137) 1 hour ago"}"#,
    "\n",
);

fn build(script: Vec<Stats>, runner: Arc<ScriptedRunner>) -> MonitoringService {
    let analytics = AnalyticsConfig::new(
        StdDuration::from_secs(120),
        64,
        StdDuration::from_secs(3600),
        32,
    );
    let thresholds = StressThresholds {
        cpu_percent: 90.0,
        ram_percent: 90.0,
        swap_percent: 50.0,
        disk_util_percent: 90.0,
        load_one: None,
    };
    let horizons = PredictionHorizons {
        warning_days: 14.0,
        critical_days: 3.0,
    };
    MonitoringService::new(
        MonitorConfig::new(analytics, thresholds, horizons),
        Arc::new(Replay(Mutex::new(script.into()))),
        Arc::new(DockerCliSource::new(runner)),
    )
    .unwrap()
}

#[tokio::test]
async fn ticks_produce_stress_and_disk_events() {
    let day = 86_400;
    let script = vec![
        snapshot(0, 95.0, 60.0),
        snapshot(180, 95.0, 60.0),
        snapshot(day, 50.0, 65.0),
        snapshot(2 * day, 50.0, 80.0),
    ];
    let svc = build(script, Arc::new(ScriptedRunner::new()));

    assert!(svc.tick().await.unwrap().is_empty());

    let events = svc.tick().await.unwrap();
    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Critical, EventKind::Action]);
    assert_eq!(events[0].message, "ram under sustained stress for 3m");
    assert!(events[1].message.contains("chrome"));

    // RAM recovers; "/" grows ~5 GB/day with 35 GB left.
    let events = svc.tick().await.unwrap();
    assert!(events.iter().any(|e| e.kind == EventKind::Info && e.message.starts_with("ram stress resolved")));
    assert!(events.iter().any(|e| e.kind == EventKind::Warning && e.message.starts_with("/ predicted full")));

    // 20 GB left and the fit steepens past 9 GB/day: inside the critical horizon.
    let events = svc.tick().await.unwrap();
    assert!(events.iter().any(|e| e.kind == EventKind::Critical));

    let prediction = svc.prediction("/").unwrap().unwrap();
    assert!(prediction.gb_per_day > 5.0);
    assert!(prediction.days_until_full < 3.0);
    let home = svc.prediction("/home").unwrap().unwrap();
    assert!(home.days_until_full.is_infinite());

    let ram = svc
        .stress_statuses(t(2 * day))
        .into_iter()
        .find(|s| s.resource == "ram")
        .unwrap();
    assert_eq!(ram.stress_count, 1);
    assert!(!ram.stressed);

    let drained = svc.drain_events();
    assert!(drained.len() >= 6);
    assert!(drained.windows(2).all(|w| w[0].at <= w[1].at));
    assert!(svc.drain_events().is_empty());

    assert!(matches!(svc.tick().await, Err(MonitorError::Source(_))));
}

#[tokio::test(start_paused = true)]
async fn container_inventory_is_cached_and_survives_runtime_outage() {
    let runner = Arc::new(
        ScriptedRunner::new()
            .reply("docker", Ok(PS_OUTPUT.as_bytes().to_vec()))
            .reply("docker", Err(CommandError::CommandNotFound("docker".into()))),
    );
    let svc = build(Vec::new(), runner.clone());

    let first = svc.containers().await.unwrap();
    assert_eq!(first.containers.len(), 2);
    assert_eq!(first.running_count(), 1);

    let second = svc.containers().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(runner.calls().len(), 1);

    tokio::time::advance(StdDuration::from_secs(3601)).await;
    let stale = svc.containers().await.unwrap();
    assert!(Arc::ptr_eq(&first, &stale));
    assert_eq!(runner.calls().len(), 2);
}

#[tokio::test]
async fn sampling_and_draining_can_run_concurrently() {
    let script: Vec<Stats> = (0..200).map(|i| snapshot(i * 60, 95.0, 50.0)).collect();
    let svc = Arc::new(build(script, Arc::new(ScriptedRunner::new())));

    let sampler = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move {
            while svc.tick().await.is_ok() {
                tokio::task::yield_now().await;
            }
        })
    };
    let reporter = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..50 {
                seen.extend(svc.drain_events());
                tokio::task::yield_now().await;
            }
            seen
        })
    };

    sampler.await.unwrap();
    let mut seen = reporter.await.unwrap();
    seen.extend(svc.drain_events());

    let criticals = seen.iter().filter(|e| e.kind == EventKind::Critical).count();
    assert_eq!(criticals, 1);
    assert_eq!(svc.trends().len("/"), 64);
}
