//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Global daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// Session limits
    #[serde(default)]
    pub session: RawSessionConfig,

    /// Client-side polling cadence
    #[serde(default)]
    pub monitor: RawMonitorConfig,

    /// Static application catalog
    #[serde(default)]
    pub catalog: Vec<RawCatalogEntry>,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// IPC socket path (default: $XDG_RUNTIME_DIR/focuslock/focuslockd.sock)
    pub socket_path: Option<PathBuf>,

    /// Data directory for store
    pub data_dir: Option<PathBuf>,

    /// Housekeeping tick in milliseconds
    pub tick_interval_ms: Option<u64>,
}

/// Session behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSessionConfig {
    /// Length of an emergency-unlock pause
    pub pause_seconds: Option<u64>,

    /// Emergency unlocks allowed per manual session
    pub emergency_unlock_limit: Option<u32>,

    /// Longest manual session; 0 means unlimited
    pub max_session_minutes: Option<u64>,
}

/// Refresh/countdown intervals used by clients
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMonitorConfig {
    pub refresh_interval_ms: Option<u64>,
    pub countdown_interval_ms: Option<u64>,
}

/// One known application
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCatalogEntry {
    /// Executable name as the enforcer sees it (e.g. "steam" or "Discord.exe")
    pub exe: String,

    /// Display name; defaults to the executable stem
    pub name: Option<String>,

    /// Icon reference (opaque, interpreted by the frontend)
    pub icon: Option<String>,
}
