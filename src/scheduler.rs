//! The tick loop.
//!
//! Each tick renders a fresh snapshot and then evaluates three independent
//! gates: the performance-log cadence, the process-log cadence and the
//! calendar-day rollover. All gate state lives in [`ScheduleState`], owned by
//! the [`Scheduler`] and never persisted.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use tracing::{debug, error, info, warn};

use crate::archive::{ArchiveOutcome, Archiver, remove_logs};
use crate::clock::Clock;
use crate::config::{Settings, SettingsProvider};
use crate::error::{ArchiveError, LogError};
use crate::record::{PerformanceRecord, ProcessesRecord};
use crate::system::MetricsProvider;
use crate::ui::Renderer;
use crate::writer::LogWriter;

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleState {
    pub last_performance_log_at: Option<DateTime<Local>>,
    pub last_process_log_at: Option<DateTime<Local>>,
    pub last_tick_day: NaiveDate,
}

impl ScheduleState {
    pub fn starting_at(now: DateTime<Local>) -> Self {
        ScheduleState {
            last_performance_log_at: None,
            last_process_log_at: None,
            last_tick_day: now.date_naive(),
        }
    }
}

/// True once strictly more than `period` has passed since `last`.
///
/// Exactly `period` does not fire. A clock that stepped backwards gives a
/// negative elapsed time, which never fires either.
pub fn is_due(last: Option<DateTime<Local>>, now: DateTime<Local>, period: Duration) -> bool {
    let Some(last) = last else {
        return true;
    };
    let period = TimeDelta::from_std(period).unwrap_or(TimeDelta::MAX);
    now.signed_duration_since(last) > period
}

#[derive(Debug)]
pub enum RolloverOutcome {
    /// Logs were archived to the given path and then removed.
    Rotated(PathBuf),
    /// One of the log files was missing; nothing was touched.
    Skipped,
    ArchiveFailed(ArchiveError),
    /// The archive was written but the originals could not be removed.
    CleanupFailed(PathBuf, ArchiveError),
}

/// What a single tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    pub performance_logged: Option<Result<(), LogError>>,
    pub processes_logged: Option<Result<(), LogError>>,
    pub rollover: Option<RolloverOutcome>,
}

impl TickReport {
    pub fn performance_fired(&self) -> bool {
        matches!(self.performance_logged, Some(Ok(())))
    }

    pub fn processes_fired(&self) -> bool {
        matches!(self.processes_logged, Some(Ok(())))
    }
}

pub struct Scheduler {
    metrics: Box<dyn MetricsProvider>,
    settings: Box<dyn SettingsProvider>,
    renderer: Box<dyn Renderer>,
    clock: Box<dyn Clock>,
    writer: LogWriter,
    archiver: Archiver,
    state: ScheduleState,
}

impl Scheduler {
    pub fn new(
        metrics: Box<dyn MetricsProvider>,
        settings: Box<dyn SettingsProvider>,
        renderer: Box<dyn Renderer>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let state = ScheduleState::starting_at(clock.now());
        Scheduler {
            metrics,
            settings,
            renderer,
            clock,
            writer: LogWriter::new(),
            archiver: Archiver::new(),
            state,
        }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn tick(&mut self) -> TickReport {
        let _span = tracing::debug_span!("scheduler.tick").entered();

        let performance = self.metrics.current_performance();
        let disks = self.metrics.current_disks();
        self.renderer.show(&performance, &disks);

        let settings = self.settings.current();
        let now = self.clock.now();
        let mut report = TickReport::default();

        if is_due(
            self.state.last_performance_log_at,
            now,
            settings.performance_log_period,
        ) {
            let record = PerformanceRecord::new(now, &performance, &disks);
            let result = self.writer.append(&settings.performance_log_path(), &record);
            match &result {
                Ok(()) => {
                    self.state.last_performance_log_at = Some(now);
                    debug!(cpu = performance.cpu_percent, "performance sample logged");
                }
                Err(e) => warn!(error = %e, "failed to write performance log"),
            }
            report.performance_logged = Some(result);
        }

        if is_due(
            self.state.last_process_log_at,
            now,
            settings.process_log_period,
        ) {
            let processes = self.metrics.current_processes();
            let count = processes.len();
            let record = ProcessesRecord::new(now, processes);
            let result = self.writer.append(&settings.processes_log_path(), &record);
            match &result {
                Ok(()) => {
                    self.state.last_process_log_at = Some(now);
                    debug!(count, "process sample logged");
                }
                Err(e) => warn!(error = %e, "failed to write process log"),
            }
            report.processes_logged = Some(result);
        }

        let today = now.date_naive();
        if today > self.state.last_tick_day {
            report.rollover = Some(self.rollover(&settings, now));
            // Advance even on failure: at most one attempt per day.
            self.state.last_tick_day = today;
        }

        report
    }

    fn rollover(&self, settings: &Settings, now: DateTime<Local>) -> RolloverOutcome {
        let folder = &settings.logs_folder;
        match self.archiver.archive_and_rotate(folder, now) {
            Ok(ArchiveOutcome::Archived(path)) => match remove_logs(folder) {
                Ok(()) => {
                    info!(archive = %path.display(), "rotated daily logs");
                    RolloverOutcome::Rotated(path)
                }
                Err(e) => {
                    error!(archive = %path.display(), error = %e, "archived logs but could not remove them");
                    RolloverOutcome::CleanupFailed(path, e)
                }
            },
            Ok(ArchiveOutcome::Skipped) => {
                info!(folder = %folder.display(), "log files incomplete, skipping daily archive");
                RolloverOutcome::Skipped
            }
            Err(e) => {
                error!(error = %e, "daily archive failed, logs kept until the next rollover");
                RolloverOutcome::ArchiveFailed(e)
            }
        }
    }

    /// Tick every `interval` until `shutdown` resolves. The first tick is
    /// immediate; a late tick pushes the schedule back instead of bursting.
    pub async fn run<F>(&mut self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping sampler");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }
    }
}
