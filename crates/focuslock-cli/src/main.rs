//! focuslock - command-line client for focuslockd

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use focuslock_cli::DaemonBackend;
use focuslock_config::{load_config_or_default, Settings};
use focuslock_util::default_config_path;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "focuslock", version, about = "Block distracting apps and sites until a focus session ends")]
struct Cli {
    /// Configuration file path (default: ~/.config/focuslock/config.toml)
    #[arg(short, long, global = true, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set FOCUSLOCK_SOCKET env var)
    #[arg(short, long, global = true, env = "FOCUSLOCK_SOCKET")]
    socket: Option<PathBuf>,

    /// Log level
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the current enforcement state
    Status,
    /// Live countdown until the current state ends (Ctrl-C to quit)
    Watch,
    /// Start a manual focus session
    Start {
        /// Hours
        #[arg(long, default_value_t = 0)]
        hours: u32,
        /// Minutes (0-59)
        #[arg(short, long, default_value_t = 0)]
        minutes: u32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Pause enforcement briefly (limited uses per session)
    Unlock,
    /// Blocked applications
    Apps {
        #[command(subcommand)]
        action: commands::blocklist::AppsAction,
    },
    /// Blocked websites
    Sites {
        #[command(subcommand)]
        action: commands::blocklist::SitesAction,
    },
    /// Turn blocking of common VPN clients on or off
    Vpn {
        #[arg(value_parser = ["on", "off"])]
        toggle: String,
    },
    /// Weekly lock schedules
    Schedules {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Merge settings from an exported JSON file
    Import { file: PathBuf },
    /// Write settings as JSON (stdout when no file is given)
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Installed applications known to the daemon
    Catalog {
        /// Show the most-blocked apps instead
        #[arg(long)]
        top: bool,
    },
    /// Daemon health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings: Settings = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let socket = cli
        .socket
        .clone()
        .unwrap_or_else(|| settings.daemon.socket_path.clone());

    let backend = DaemonBackend::connect(&socket)
        .await
        .with_context(|| format!("Cannot reach focuslockd at {:?}", socket))?;

    match cli.command {
        Commands::Status => commands::session::status(&backend).await,
        Commands::Watch => commands::session::watch(backend, &settings).await,
        Commands::Start { hours, minutes, yes } => {
            commands::session::start(&backend, hours, minutes, yes).await
        }
        Commands::Unlock => commands::session::unlock(&backend).await,
        Commands::Apps { action } => commands::blocklist::apps(&backend, action).await,
        Commands::Sites { action } => commands::blocklist::sites(&backend, action).await,
        Commands::Vpn { toggle } => commands::blocklist::vpn(&backend, toggle == "on").await,
        Commands::Schedules { action } => commands::schedule::run(&backend, action).await,
        Commands::Import { file } => commands::settings::import(&backend, &file).await,
        Commands::Export { output } => commands::settings::export(&backend, output.as_deref()).await,
        Commands::Catalog { top } => commands::blocklist::catalog(&backend, top).await,
        Commands::Health => commands::settings::health(&backend).await,
    }
}
