use std::time::{Duration, Instant};

use sysinfo::{Disks, MINIMUM_CPU_UPDATE_INTERVAL, ProcessRefreshKind, ProcessesToUpdate, System};

use super::platform;
use super::process::{ProcessInfo, ProcessSnapshot, normalize_cpu};
use super::snapshot::{DiskInfo, DiskSnapshot, PerformanceSnapshot, RamSnapshot};
use super::{Metric, MetricsProvider};

/// [`MetricsProvider`] backed by `sysinfo`.
pub struct SysinfoProvider {
    sys: System,
    last_cpu_refresh: Instant,
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        SysinfoProvider {
            sys,
            last_cpu_refresh: Instant::now(),
        }
    }

    fn cpu_usage(&mut self) -> Metric<f32> {
        // Usage is a delta between two refreshes; wait out the minimum gap if
        // the previous refresh is too recent to give a meaningful rate.
        let since = self.last_cpu_refresh.elapsed();
        if since < MINIMUM_CPU_UPDATE_INTERVAL {
            std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL - since);
        }
        self.sys.refresh_cpu_usage();
        self.last_cpu_refresh = Instant::now();

        if self.sys.cpus().is_empty() {
            return Metric::Unavailable;
        }
        Metric::Measured(self.sys.global_cpu_usage())
    }

    fn ram(&mut self) -> Metric<RamSnapshot> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Metric::Unavailable;
        }
        Metric::Measured(RamSnapshot::from_bytes(total, self.sys.available_memory()))
    }

    fn refresh_processes(&mut self) {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
    }
}

impl MetricsProvider for SysinfoProvider {
    fn current_performance(&mut self) -> PerformanceSnapshot {
        let _span = tracing::trace_span!("collector.performance").entered();

        let cpu = self.cpu_usage();
        let ram = self.ram();
        PerformanceSnapshot::from_metrics(cpu, ram)
    }

    fn current_disks(&mut self) -> DiskSnapshot {
        let disks = Disks::new_with_refreshed_list();
        disks
            .iter()
            .map(|disk| {
                DiskInfo::from_bytes(
                    disk.mount_point().to_string_lossy().to_string(),
                    disk.file_system().to_string_lossy().to_string(),
                    disk.total_space(),
                    disk.available_space(),
                )
            })
            .collect()
    }

    fn current_processes(&mut self) -> ProcessSnapshot {
        let _span = tracing::trace_span!("collector.processes").entered();

        // Two samples bracket the rate window for per-process CPU.
        self.refresh_processes();
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        self.refresh_processes();

        let logical_cpus = self.sys.cpus().len();
        let sampled: Vec<_> = self
            .sys
            .processes()
            .iter()
            // Idle pseudo-process and userland threads listed as tasks.
            .filter(|(pid, process)| pid.as_u32() != 0 && process.thread_kind().is_none())
            .collect();
        let pids: Vec<u32> = sampled.iter().map(|(pid, _)| pid.as_u32()).collect();
        let threads = platform::thread_counts(&pids);

        sampled
            .into_iter()
            .map(|(pid, process)| {
                let pid = pid.as_u32();
                ProcessInfo {
                    pid,
                    name: process.name().to_string_lossy().to_string(),
                    processed_time: Duration::from_millis(process.accumulated_cpu_time()),
                    threads_count: threads.get(&pid).copied().unwrap_or(0),
                    working_set_mb: process.memory() / (1024 * 1024),
                    cpu_percent: normalize_cpu(process.cpu_usage(), logical_cpus),
                }
            })
            .collect()
    }
}
