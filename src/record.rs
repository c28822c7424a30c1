//! On-disk shapes of the two log records.
//!
//! Field names are camelCase to stay compatible with existing consumers of
//! the log files.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::format::format_time_span;
use crate::system::process::{ProcessInfo, ProcessSnapshot, sort_by_working_set};
use crate::system::snapshot::{DiskInfo, PerformanceSnapshot};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HddRecord {
    pub name: String,
    /// Utilization percent.
    pub usage: u32,
    /// Free space in GB.
    pub free: u64,
}

impl From<&DiskInfo> for HddRecord {
    fn from(disk: &DiskInfo) -> Self {
        HddRecord {
            name: disk.name.clone(),
            usage: disk.utilization_percent,
            free: disk.free_gb(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub now: DateTime<Local>,
    pub cpu: u32,
    /// RAM utilization percent.
    pub ram: u32,
    /// Used RAM in MB.
    pub ram_usage: u64,
    pub hdds: Vec<HddRecord>,
}

impl PerformanceRecord {
    pub fn new(now: DateTime<Local>, perf: &PerformanceSnapshot, disks: &[DiskInfo]) -> Self {
        PerformanceRecord {
            now,
            cpu: perf.cpu_percent,
            ram: perf.ram.utilization_percent,
            ram_usage: perf.ram.used_mb,
            hdds: disks.iter().map(HddRecord::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// Cumulative CPU time as `[d.]hh:mm:ss[.fffffff]`.
    pub processed_time: String,
    pub threads_count: u32,
    /// Working set in MB.
    pub working_set: u64,
    pub cpu: u32,
}

impl From<&ProcessInfo> for ProcessRecord {
    fn from(p: &ProcessInfo) -> Self {
        ProcessRecord {
            pid: p.pid,
            name: p.name.clone(),
            processed_time: format_time_span(p.processed_time),
            threads_count: p.threads_count,
            working_set: p.working_set_mb,
            cpu: p.cpu_percent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessesRecord {
    pub now: DateTime<Local>,
    pub processes: Vec<ProcessRecord>,
}

impl ProcessesRecord {
    /// Takes ownership so the snapshot can be reordered in place.
    pub fn new(now: DateTime<Local>, mut processes: ProcessSnapshot) -> Self {
        sort_by_working_set(&mut processes);
        ProcessesRecord {
            now,
            processes: processes.iter().map(ProcessRecord::from).collect(),
        }
    }
}
