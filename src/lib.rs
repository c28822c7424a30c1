pub mod archive;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod record;
pub mod scheduler;
pub mod system;
pub mod ui;
pub mod writer;

pub const PERFORMANCE_LOG_FILENAME: &str = "performance.txt";
pub const PROCESSES_LOG_FILENAME: &str = "processes.txt";
