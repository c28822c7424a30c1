use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use tracing::{info, warn};

use perflogger::clock::SystemClock;
use perflogger::config::{self, Config, FileSettings, Settings, load_config_from_path};
use perflogger::logging::{DIAGNOSTICS_FILENAME, init_tracing};
use perflogger::scheduler::Scheduler;
use perflogger::system::collector::SysinfoProvider;
use perflogger::ui::console::ConsoleRenderer;
use perflogger::ui::{NullRenderer, Renderer};

#[derive(Parser)]
#[command(
    name = "perflogger",
    about = "Continuous host telemetry sampler with daily log rotation"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick interval in milliseconds (bounds logging latency)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Do not draw the console status line
    #[arg(long, default_value_t = false)]
    headless: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = cli.config.clone().or_else(config::config_path);
    let config = match &config_path {
        Some(path) => load_config_from_path(path),
        None => Config::default(),
    };
    let startup_settings = Settings::from_logging(&config.logging);
    let headless = cli.headless || !std::io::stdout().is_terminal();

    // The status line owns the terminal, so diagnostics go to a file then.
    if headless {
        init_tracing(None)?;
    } else {
        let diagnostics = startup_settings.logs_folder.join(DIAGNOSTICS_FILENAME);
        if init_tracing(Some(&diagnostics)).is_err() {
            init_tracing(None)?;
        }
    }

    let renderer: Box<dyn Renderer> = if headless {
        Box::new(NullRenderer)
    } else {
        match ConsoleRenderer::new() {
            Ok(console) => Box::new(console),
            Err(e) => {
                warn!(error = %e, "console unavailable, running headless");
                Box::new(NullRenderer)
            }
        }
    };

    let tick_ms = cli
        .tick_ms
        .unwrap_or(config.general.tick_interval_ms)
        .max(1);
    info!(
        config = ?config_path,
        logs = %startup_settings.logs_folder.display(),
        tick_ms,
        "perflogger starting"
    );

    let mut scheduler = Scheduler::new(
        Box::new(SysinfoProvider::new()),
        Box::new(FileSettings::new(config_path)),
        renderer,
        Box::new(SystemClock),
    );
    scheduler
        .run(Duration::from_millis(tick_ms), shutdown_signal())
        .await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C, run until killed");
        std::future::pending::<()>().await;
    }
}
