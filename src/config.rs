use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use serde::Deserialize;
use tracing::warn;

use crate::format::parse_time_span;

pub const DEFAULT_LOG_PERIOD: Duration = Duration::from_secs(30);
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 900;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_interval_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// Raw logging table. Periods stay strings and each one falls back to the
/// default on its own.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub performance_log_period: Option<String>,
    pub process_log_period: Option<String>,
    pub logs_folder: Option<String>,
}

/// Settings the scheduler consults on every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub performance_log_period: Duration,
    pub process_log_period: Duration,
    pub logs_folder: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_logging(&LoggingConfig::default())
    }
}

impl Settings {
    pub fn from_logging(logging: &LoggingConfig) -> Self {
        Settings {
            performance_log_period: resolve_period(
                "performance_log_period",
                logging.performance_log_period.as_deref(),
            ),
            process_log_period: resolve_period(
                "process_log_period",
                logging.process_log_period.as_deref(),
            ),
            logs_folder: resolve_logs_folder(logging.logs_folder.as_deref()),
        }
    }

    pub fn performance_log_path(&self) -> PathBuf {
        self.logs_folder.join(crate::PERFORMANCE_LOG_FILENAME)
    }

    pub fn processes_log_path(&self) -> PathBuf {
        self.logs_folder.join(crate::PROCESSES_LOG_FILENAME)
    }
}

fn resolve_period(key: &str, raw: Option<&str>) -> Duration {
    match raw {
        None => DEFAULT_LOG_PERIOD,
        Some(value) => parse_time_span(value).unwrap_or_else(|| {
            warn!(key, value, "unparseable period, using default of 30s");
            DEFAULT_LOG_PERIOD
        }),
    }
}

fn resolve_logs_folder(raw: Option<&str>) -> PathBuf {
    match raw.map(str::trim) {
        Some(folder) if !folder.is_empty() => expand_home(folder),
        _ => default_logs_folder(),
    }
}

pub fn default_logs_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("perflogger").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn expand_home(folder: &str) -> PathBuf {
    let Some(rest) = folder.strip_prefix('~') else {
        return PathBuf::from(folder);
    };
    // "~user" forms are left alone
    if !(rest.is_empty() || rest.starts_with(['/', '\\'])) {
        return PathBuf::from(folder);
    }
    let rest = rest.trim_start_matches(['/', '\\']);
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(folder),
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("perflogger").join("config.toml"))
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

/// Supplies the settings in effect for the current tick.
pub trait SettingsProvider {
    fn current(&mut self) -> Settings;
}

/// Fixed settings, for tests and embedding.
impl SettingsProvider for Settings {
    fn current(&mut self) -> Settings {
        self.clone()
    }
}

/// Longest a parsed config is trusted while the file looks unchanged.
/// Covers edits that keep both size and a coarse-grained mtime.
pub const SETTINGS_MAX_AGE: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

struct CachedSettings {
    stamp: FileStamp,
    loaded_at: Instant,
    settings: Settings,
}

/// Settings read from a TOML file on disk.
///
/// The file is re-parsed when its modification time or length changes, and
/// at least every [`SETTINGS_MAX_AGE`], so edits take effect without a
/// restart.
pub struct FileSettings {
    path: Option<PathBuf>,
    max_age: Duration,
    cached: Option<CachedSettings>,
}

impl FileSettings {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self::with_max_age(path, SETTINGS_MAX_AGE)
    }

    pub fn with_max_age(path: Option<PathBuf>, max_age: Duration) -> Self {
        FileSettings {
            path,
            max_age,
            cached: None,
        }
    }

    fn stamp(&self) -> Option<FileStamp> {
        let path = self.path.as_ref()?;
        let meta = std::fs::metadata(path).ok()?;
        Some(FileStamp {
            modified: meta.modified().ok()?,
            len: meta.len(),
        })
    }

    fn load(&self) -> Settings {
        let config = match &self.path {
            Some(path) => load_config_from_path(path),
            None => Config::default(),
        };
        Settings::from_logging(&config.logging)
    }
}

impl SettingsProvider for FileSettings {
    fn current(&mut self) -> Settings {
        let stamp = self.stamp();
        if let Some(cached) = &self.cached
            && Some(cached.stamp) == stamp
            && cached.loaded_at.elapsed() < self.max_age
        {
            return cached.settings.clone();
        }
        let settings = self.load();
        self.cached = stamp.map(|stamp| CachedSettings {
            stamp,
            loaded_at: Instant::now(),
            settings: settings.clone(),
        });
        settings
    }
}
