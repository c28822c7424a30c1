pub mod collector;
pub mod platform;
pub mod process;
pub mod snapshot;

use process::ProcessSnapshot;
use snapshot::{DiskSnapshot, PerformanceSnapshot};

/// Outcome of a best-effort reading.
///
/// Acquisition never fails a tick: callers that only need a number use
/// [`Metric::value_or_default`], callers that care can tell a measured zero
/// from a reading that was not available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Metric<T> {
    Measured(T),
    Unavailable,
}

impl<T: Default> Metric<T> {
    pub fn value_or_default(self) -> T {
        match self {
            Metric::Measured(v) => v,
            Metric::Unavailable => T::default(),
        }
    }
}

/// Source of host metrics. Implementations degrade failures to zero or empty
/// values instead of returning errors.
pub trait MetricsProvider {
    fn current_performance(&mut self) -> PerformanceSnapshot;
    fn current_disks(&mut self) -> DiskSnapshot;
    fn current_processes(&mut self) -> ProcessSnapshot;
}
