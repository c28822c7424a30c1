use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use perflogger::clock::Clock;
use perflogger::config::Settings;
use perflogger::scheduler::{RolloverOutcome, Scheduler};
use perflogger::system::MetricsProvider;
use perflogger::system::process::{ProcessInfo, ProcessSnapshot};
use perflogger::system::snapshot::{DiskInfo, DiskSnapshot, PerformanceSnapshot, RamSnapshot};
use perflogger::ui::Renderer;
use perflogger::writer::read_records;
use perflogger::{PERFORMANCE_LOG_FILENAME, PROCESSES_LOG_FILENAME};
use proptest::prelude::*;
use serde_json::Value;

#[derive(Clone)]
struct FakeClock(Rc<Cell<DateTime<Local>>>);

impl FakeClock {
    fn at(start: DateTime<Local>) -> Self {
        FakeClock(Rc::new(Cell::new(start)))
    }

    fn set(&self, at: DateTime<Local>) {
        self.0.set(at);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        self.0.get()
    }
}

#[derive(Clone, Default)]
struct FakeMetrics {
    process_calls: Rc<Cell<usize>>,
}

impl MetricsProvider for FakeMetrics {
    fn current_performance(&mut self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            cpu_percent: 42,
            ram: RamSnapshot {
                free_mb: 1024,
                total_mb: 4096,
                used_mb: 3072,
                utilization_percent: 75,
            },
        }
    }

    fn current_disks(&mut self) -> DiskSnapshot {
        vec![
            DiskInfo {
                name: "/".into(),
                file_system: "ext4".into(),
                used_gb: 30,
                total_gb: 100,
                utilization_percent: 30,
            },
            DiskInfo {
                name: "/mnt/empty".into(),
                file_system: "tmpfs".into(),
                used_gb: 0,
                total_gb: 0,
                utilization_percent: 0,
            },
        ]
    }

    fn current_processes(&mut self) -> ProcessSnapshot {
        self.process_calls.set(self.process_calls.get() + 1);
        vec![
            ProcessInfo {
                pid: 7,
                name: "small".into(),
                processed_time: Duration::from_secs(3),
                threads_count: 1,
                working_set_mb: 12,
                cpu_percent: 0,
            },
            ProcessInfo {
                pid: 8,
                name: "large".into(),
                processed_time: Duration::from_secs(90),
                threads_count: 16,
                working_set_mb: 800,
                cpu_percent: 5,
            },
        ]
    }
}

#[derive(Clone, Default)]
struct CountingRenderer {
    shown: Rc<RefCell<Vec<u32>>>,
}

impl Renderer for CountingRenderer {
    fn show(&mut self, performance: &PerformanceSnapshot, _disks: &DiskSnapshot) {
        self.shown.borrow_mut().push(performance.cpu_percent);
    }
}

fn noon(y: i32, m: u32, d: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn settings(folder: &Path, perf_secs: u64, proc_secs: u64) -> Settings {
    Settings {
        performance_log_period: Duration::from_secs(perf_secs),
        process_log_period: Duration::from_secs(proc_secs),
        logs_folder: folder.to_path_buf(),
    }
}

struct Harness {
    scheduler: Scheduler,
    clock: FakeClock,
    metrics: FakeMetrics,
    renderer: CountingRenderer,
    start: DateTime<Local>,
}

impl Harness {
    fn new(settings: Settings, start: DateTime<Local>) -> Self {
        let clock = FakeClock::at(start);
        let metrics = FakeMetrics::default();
        let renderer = CountingRenderer::default();
        let scheduler = Scheduler::new(
            Box::new(metrics.clone()),
            Box::new(settings),
            Box::new(renderer.clone()),
            Box::new(clock.clone()),
        );
        Harness {
            scheduler,
            clock,
            metrics,
            renderer,
            start,
        }
    }

    fn tick_at(&mut self, secs: i64) -> perflogger::scheduler::TickReport {
        self.clock.set(self.start + TimeDelta::seconds(secs));
        self.scheduler.tick()
    }
}

#[test]
fn performance_cadence_follows_last_firing() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 30, 3600), noon(2024, 6, 10));

    let fired: Vec<(i64, bool)> = [0, 20, 35, 50, 66]
        .into_iter()
        .map(|t| (t, h.tick_at(t).performance_fired()))
        .collect();

    assert_eq!(
        fired,
        vec![(0, true), (20, false), (35, true), (50, false), (66, true)]
    );
    assert_eq!(
        h.scheduler.state().last_performance_log_at,
        Some(h.start + TimeDelta::seconds(66))
    );

    let records: Vec<Value> = read_records(&dir.path().join(PERFORMANCE_LOG_FILENAME)).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["cpu"], 42);
    assert_eq!(records[0]["ramUsage"], 3072);
    assert_eq!(records[0]["hdds"][1]["usage"], 0);
}

#[tokio::test(start_paused = true)]
async fn run_ticks_once_per_interval_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 3600, 3600), noon(2024, 6, 10));
    let interval = Duration::from_millis(900);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::time::sleep(interval * 5 + interval / 2).await;
        let _ = tx.send(());
    });
    h.scheduler
        .run(interval, async {
            let _ = rx.await;
        })
        .await;

    // Immediate first tick, then one per interval up to 4.5 s.
    assert_eq!(h.renderer.shown.borrow().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn run_stops_before_ticking_when_shutdown_is_already_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 30, 30), noon(2024, 6, 10));

    h.scheduler
        .run(Duration::from_millis(900), std::future::ready(()))
        .await;

    assert!(h.renderer.shown.borrow().is_empty());
    assert!(!dir.path().join(PERFORMANCE_LOG_FILENAME).exists());
}

#[test]
fn renderer_sees_every_tick() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 3600, 3600), noon(2024, 6, 10));
    for t in 0..5 {
        h.tick_at(t);
    }
    assert_eq!(*h.renderer.shown.borrow(), vec![42; 5]);
}

#[test]
fn processes_are_only_collected_when_due() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 1, 60), noon(2024, 6, 10));

    for t in 0..=120 {
        h.tick_at(t);
    }
    // Fires at 0, 61 and never again before 122.
    assert_eq!(h.metrics.process_calls.get(), 2);

    let records: Vec<Value> = read_records(&dir.path().join(PROCESSES_LOG_FILENAME)).unwrap();
    assert_eq!(records.len(), 2);
    let first = &records[0]["processes"];
    assert_eq!(first[0]["name"], "large");
    assert_eq!(first[0]["processedTime"], "00:01:30");
    assert_eq!(first[1]["name"], "small");
}

#[test]
fn failed_append_is_retried_on_the_next_tick() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("logs");
    fs::write(&blocked, "a file where the log folder should be").unwrap();
    let mut h = Harness::new(settings(&blocked, 30, 30), noon(2024, 6, 10));

    let report = h.tick_at(0);
    assert!(matches!(report.performance_logged, Some(Err(_))));
    assert!(matches!(report.processes_logged, Some(Err(_))));
    assert_eq!(h.scheduler.state().last_performance_log_at, None);

    fs::remove_file(&blocked).unwrap();
    let report = h.tick_at(1);
    assert!(report.performance_fired());
    assert!(report.processes_fired());
}

#[test]
fn rollover_archives_once_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 1, 1), noon(2024, 6, 10));
    h.tick_at(0);

    let next_day = 24 * 3600;
    let mut attempts = 0;
    for i in 0..1000 {
        if h.tick_at(next_day + i).rollover.is_some() {
            attempts += 1;
        }
    }
    assert_eq!(attempts, 1);

    let archive = dir.path().join("11_06_2024.zip");
    assert!(archive.exists());
}

#[test]
fn rollover_removes_logs_after_archiving() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 1, 1), noon(2024, 6, 10));
    h.tick_at(0);
    assert!(dir.path().join(PERFORMANCE_LOG_FILENAME).exists());

    // Next tick lands on the next day; both cadences are due as well, so the
    // fresh records written this tick are archived along with the old ones.
    let report = h.tick_at(24 * 3600);
    match report.rollover {
        Some(RolloverOutcome::Rotated(path)) => assert!(path.ends_with("11_06_2024.zip")),
        other => panic!("expected rotation, got {other:?}"),
    }
    assert!(!dir.path().join(PERFORMANCE_LOG_FILENAME).exists());
    assert!(!dir.path().join(PROCESSES_LOG_FILENAME).exists());

    // Logging resumes into fresh files.
    h.tick_at(24 * 3600 + 5);
    let records: Vec<Value> = read_records(&dir.path().join(PERFORMANCE_LOG_FILENAME)).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn rollover_crosses_month_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let start = Local.with_ymd_and_hms(2024, 5, 31, 23, 59, 50).unwrap();
    let mut h = Harness::new(settings(dir.path(), 1, 1), start);
    h.tick_at(0);

    let report = h.tick_at(20);
    assert!(matches!(report.rollover, Some(RolloverOutcome::Rotated(_))));
    assert!(dir.path().join("01_06_2024.zip").exists());
}

#[test]
fn missing_logs_skip_rollover_but_advance_the_day() {
    let dir = tempfile::tempdir().unwrap();
    // Periods long enough that nothing is written on the rollover tick.
    let mut h = Harness::new(settings(dir.path(), 3600 * 48, 3600 * 48), noon(2024, 6, 10));
    h.tick_at(0);
    fs::remove_file(dir.path().join(PROCESSES_LOG_FILENAME)).unwrap();

    let report = h.tick_at(24 * 3600);
    assert!(matches!(report.rollover, Some(RolloverOutcome::Skipped)));
    assert_eq!(
        h.scheduler.state().last_tick_day,
        noon(2024, 6, 11).date_naive()
    );
    // The surviving log is kept, not deleted without an archive.
    assert!(dir.path().join(PERFORMANCE_LOG_FILENAME).exists());
    assert!(h.tick_at(24 * 3600 + 1).rollover.is_none());
}

#[test]
fn failed_archive_keeps_logs_and_waits_for_next_day() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 3600 * 48, 3600 * 48), noon(2024, 6, 10));
    h.tick_at(0);

    // Occupy every candidate archive name so creation cannot succeed.
    let now = noon(2024, 6, 11);
    for name in perflogger::archive::archive_names(now) {
        fs::create_dir(dir.path().join(name)).unwrap();
    }

    let report = h.tick_at(24 * 3600);
    assert!(matches!(report.rollover, Some(RolloverOutcome::ArchiveFailed(_))));
    assert!(dir.path().join(PERFORMANCE_LOG_FILENAME).exists());
    assert!(dir.path().join(PROCESSES_LOG_FILENAME).exists());

    // No same-day retry.
    assert!(h.tick_at(24 * 3600 + 60).rollover.is_none());
}

#[test]
fn backwards_clock_does_not_trigger_rollover() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(settings(dir.path(), 30, 30), noon(2024, 6, 10));
    h.tick_at(0);
    assert!(h.tick_at(-2 * 24 * 3600).rollover.is_none());
    assert!(h.tick_at(10).rollover.is_none());
}

proptest! {
    #[test]
    fn firings_are_never_closer_than_the_period(
        period in 1u64..120,
        steps in prop::collection::vec(1i64..90, 1..200),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new(settings(dir.path(), period, 3600 * 48), noon(2024, 6, 10));

        let mut now = 0i64;
        let mut fired_at = Vec::new();
        for step in steps {
            if h.tick_at(now).performance_fired() {
                fired_at.push(now);
            }
            now += step;
        }

        prop_assert!(!fired_at.is_empty());
        prop_assert_eq!(fired_at[0], 0);
        for pair in fired_at.windows(2) {
            prop_assert!(pair[1] - pair[0] > period as i64);
        }
    }
}
