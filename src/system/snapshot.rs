use super::Metric;

const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * 1024 * 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RamSnapshot {
    pub free_mb: u64,
    pub total_mb: u64,
    pub used_mb: u64,
    pub utilization_percent: u32,
}

impl RamSnapshot {
    pub fn from_bytes(total_bytes: u64, available_bytes: u64) -> Self {
        let total_mb = total_bytes / MB;
        let free_mb = (available_bytes / MB).min(total_mb);
        let used_mb = total_mb - free_mb;
        RamSnapshot {
            free_mb,
            total_mb,
            used_mb,
            utilization_percent: percent_of(used_mb, total_mb),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerformanceSnapshot {
    pub cpu_percent: u32,
    pub ram: RamSnapshot,
}

impl PerformanceSnapshot {
    /// Build a snapshot from best-effort readings; unavailable values become zero.
    pub fn from_metrics(cpu: Metric<f32>, ram: Metric<RamSnapshot>) -> Self {
        PerformanceSnapshot {
            cpu_percent: cpu.value_or_default().clamp(0.0, 100.0) as u32,
            ram: ram.value_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiskInfo {
    pub name: String,
    pub file_system: String,
    pub used_gb: u64,
    pub total_gb: u64,
    pub utilization_percent: u32,
}

impl DiskInfo {
    pub fn from_bytes(name: String, file_system: String, total_bytes: u64, free_bytes: u64) -> Self {
        let total_gb = total_bytes / GB;
        let used_gb = total_bytes.saturating_sub(free_bytes) / GB;
        DiskInfo {
            name,
            file_system,
            used_gb,
            total_gb,
            utilization_percent: percent_of(used_gb, total_gb),
        }
    }

    pub fn free_gb(&self) -> u64 {
        self.total_gb.saturating_sub(self.used_gb)
    }
}

pub type DiskSnapshot = Vec<DiskInfo>;

/// Integer percentage, truncated. A zero total yields 0 rather than a division fault.
pub fn percent_of(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0) as u32
}
