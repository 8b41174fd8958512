//! Default paths for focuslock components
//!
//! Paths are user-writable by default (no root required):
//! - Socket: `$XDG_RUNTIME_DIR/focuslock/focuslockd.sock` or `/tmp/focuslock-$USER/focuslockd.sock`
//! - Config: `$XDG_CONFIG_HOME/focuslock/config.toml` or `~/.config/focuslock/config.toml`
//! - Data: `$XDG_DATA_HOME/focuslock` or `~/.local/share/focuslock`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const FOCUSLOCK_SOCKET_ENV: &str = "FOCUSLOCK_SOCKET";

/// Environment variable for overriding the data directory
pub const FOCUSLOCK_DATA_DIR_ENV: &str = "FOCUSLOCK_DATA_DIR";

const SOCKET_FILENAME: &str = "focuslockd.sock";
const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "focuslock";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$FOCUSLOCK_SOCKET` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/focuslock/focuslockd.sock` (if XDG_RUNTIME_DIR is set)
/// 3. `/tmp/focuslock-$USER/focuslockd.sock` (fallback)
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(FOCUSLOCK_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the socket path without checking FOCUSLOCK_SOCKET.
/// Used for default values in configs where the env var is checked separately.
pub fn socket_path_without_env() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the default daemon configuration file path.
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$FOCUSLOCK_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/focuslock` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/focuslock` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(FOCUSLOCK_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking FOCUSLOCK_DATA_DIR.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
