use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// Cumulative CPU time consumed since the process started.
    pub processed_time: Duration,
    pub threads_count: u32,
    pub working_set_mb: u64,
    /// Share of total machine CPU, normalized by logical core count.
    pub cpu_percent: u32,
}

pub type ProcessSnapshot = Vec<ProcessInfo>;

/// Order processes by working set, largest first. Ties keep their pid order.
pub fn sort_by_working_set(processes: &mut ProcessSnapshot) {
    processes.sort_by(|a, b| {
        b.working_set_mb
            .cmp(&a.working_set_mb)
            .then_with(|| a.pid.cmp(&b.pid))
    });
}

/// Convert a raw per-process reading (100% per core) into a whole-machine share.
pub fn normalize_cpu(raw_percent: f32, logical_cpus: usize) -> u32 {
    if !raw_percent.is_finite() || raw_percent <= 0.0 {
        return 0;
    }
    let cores = logical_cpus.max(1) as f32;
    (raw_percent / cores).min(100.0) as u32
}
