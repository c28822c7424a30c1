pub mod console;
pub mod status_line;


use crate::system::snapshot::{DiskSnapshot, PerformanceSnapshot};

/// Presents the latest snapshot to an operator.
///
/// Rendering is fire-and-forget: implementations swallow their own errors and
/// never feed anything back into the scheduler.
pub trait Renderer {
    fn show(&mut self, performance: &PerformanceSnapshot, disks: &DiskSnapshot);
}

/// Renderer for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn show(&mut self, _performance: &PerformanceSnapshot, _disks: &DiskSnapshot) {}
}
