//! Validated settings structures

use crate::schema::{
    RawCatalogEntry, RawConfig, RawDaemonConfig, RawMonitorConfig, RawSessionConfig,
};
use focuslock_api::AppInfo;
use std::path::PathBuf;
use std::time::Duration;

/// Validated settings ready for use by the daemon and clients
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub daemon: DaemonConfig,
    pub session: SessionPolicy,
    pub monitor: MonitorConfig,
    /// Applications known to the static catalog
    pub catalog: Vec<AppInfo>,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            daemon: DaemonConfig::from_raw(raw.daemon),
            session: SessionPolicy::from_raw(raw.session),
            monitor: MonitorConfig::from_raw(raw.monitor),
            catalog: raw.catalog.into_iter().map(convert_catalog_entry).collect(),
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
}

impl DaemonConfig {
    fn from_raw(raw: RawDaemonConfig) -> Self {
        let defaults = Self::default();
        Self {
            socket_path: raw.socket_path.unwrap_or(defaults.socket_path),
            data_dir: raw.data_dir.unwrap_or(defaults.data_dir),
            tick_interval: raw
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: focuslock_util::socket_path_without_env(),
            data_dir: focuslock_util::data_dir_without_env(),
            tick_interval: Duration::from_millis(500),
        }
    }
}

/// Limits applied to manual sessions and emergency unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// How long an emergency unlock suspends enforcement
    pub pause: Duration,
    pub emergency_unlock_limit: u32,
    /// Longest manual session. None means unlimited.
    pub max_session: Option<Duration>,
}

impl SessionPolicy {
    fn from_raw(raw: RawSessionConfig) -> Self {
        let defaults = Self::default();
        Self {
            pause: raw
                .pause_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.pause),
            emergency_unlock_limit: raw
                .emergency_unlock_limit
                .unwrap_or(defaults.emergency_unlock_limit),
            max_session: match raw.max_session_minutes {
                Some(0) => None, // 0 means unlimited
                Some(minutes) => Some(Duration::from_secs(minutes * 60)),
                None => defaults.max_session,
            },
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(120),
            emergency_unlock_limit: 2,
            max_session: None,
        }
    }
}

/// Polling cadence for the engine monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How often the snapshot is re-fetched
    pub refresh_interval: Duration,
    /// How often state and countdown are recomputed
    pub countdown_interval: Duration,
}

impl MonitorConfig {
    fn from_raw(raw: RawMonitorConfig) -> Self {
        let defaults = Self::default();
        Self {
            refresh_interval: raw
                .refresh_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_interval),
            countdown_interval: raw
                .countdown_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.countdown_interval),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(2),
            countdown_interval: Duration::from_secs(1),
        }
    }
}

fn convert_catalog_entry(raw: RawCatalogEntry) -> AppInfo {
    let name = raw.name.unwrap_or_else(|| exe_stem(&raw.exe).to_string());
    AppInfo {
        name,
        exe: raw.exe,
        icon: raw.icon,
    }
}

/// Executable name without a trailing `.exe`
pub fn exe_stem(exe: &str) -> &str {
    let len = exe.len();
    if len > 4 && exe.is_char_boundary(len - 4) && exe[len - 4..].eq_ignore_ascii_case(".exe") {
        &exe[..len - 4]
    } else {
        exe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config;

    #[test]
    fn defaults_apply_when_sections_missing() {
        let settings = parse_config("config_version = 1").unwrap();
        assert_eq!(settings.session.pause, Duration::from_secs(120));
        assert_eq!(settings.session.emergency_unlock_limit, 2);
        assert_eq!(settings.session.max_session, None);
        assert_eq!(settings.monitor.refresh_interval, Duration::from_secs(2));
        assert_eq!(settings.monitor.countdown_interval, Duration::from_secs(1));
        assert_eq!(settings.daemon.tick_interval, Duration::from_millis(500));
    }

    #[test]
    fn zero_max_session_is_unlimited() {
        let settings = parse_config(
            r#"
            config_version = 1
            [session]
            max_session_minutes = 0
        "#,
        )
        .unwrap();
        assert_eq!(settings.session.max_session, None);

        let settings = parse_config(
            r#"
            config_version = 1
            [session]
            max_session_minutes = 240
        "#,
        )
        .unwrap();
        assert_eq!(settings.session.max_session, Some(Duration::from_secs(240 * 60)));
    }

    #[test]
    fn catalog_name_defaults_to_exe_stem() {
        let settings = parse_config(
            r#"
            config_version = 1
            [[catalog]]
            exe = "Discord.exe"
        "#,
        )
        .unwrap();
        assert_eq!(settings.catalog[0].name, "Discord");
        assert_eq!(settings.catalog[0].exe, "Discord.exe");
    }

    #[test]
    fn exe_stem_strips_suffix_case_insensitively() {
        assert_eq!(exe_stem("steam.EXE"), "steam");
        assert_eq!(exe_stem("firefox"), "firefox");
        assert_eq!(exe_stem(".exe"), ".exe");
    }
}
