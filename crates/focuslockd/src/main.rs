//! focuslockd - The focus-lock background service

use anyhow::{Context, Result};
use clap::Parser;
use focuslock_config::load_config_or_default;
use focuslock_util::default_config_path;
use focuslockd::Daemon;
use std::path::PathBuf;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// focuslockd - Keeps focus sessions locked until they end
#[derive(Parser, Debug)]
#[command(name = "focuslockd")]
#[command(about = "Focus-lock service: block lists, sessions and schedules", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/focuslock/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set FOCUSLOCK_SOCKET env var)
    #[arg(short, long, env = "FOCUSLOCK_SOCKET")]
    socket: Option<PathBuf>,

    /// Data directory override (or set FOCUSLOCK_DATA_DIR env var)
    #[arg(short, long, env = "FOCUSLOCK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// Future resolving on SIGTERM, SIGINT or SIGHUP
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
            _ = sighup.recv() => info!("Received SIGHUP"),
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "focuslockd starting");

    let mut settings = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    if let Some(socket) = args.socket {
        settings.daemon.socket_path = socket;
    }
    if let Some(data_dir) = args.data_dir {
        settings.daemon.data_dir = data_dir;
    }

    info!(
        config_path = %args.config.display(),
        socket_path = %settings.daemon.socket_path.display(),
        data_dir = %settings.daemon.data_dir.display(),
        catalog_entries = settings.catalog.len(),
        "Configuration loaded"
    );

    if focuslock_util::is_mock_time_active() {
        info!("Mock time is active");
    }

    let daemon = Daemon::new(&settings).await?;

    let shutdown = shutdown_signal()?;
    daemon.run(shutdown).await
}
