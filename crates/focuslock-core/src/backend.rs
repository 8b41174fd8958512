//! Backend boundary used by frontends

use async_trait::async_trait;
use chrono::{DateTime, Local};
use focuslock_api::{AppInfo, ConfigSnapshot, ImportSummary, Schedule};
use focuslock_util::{FocusError, Result};
use std::sync::Mutex;

/// Operations a frontend needs from the focus-lock backend.
///
/// Implemented in-process by the service and over IPC by the CLI client.
/// Every error is safe to show to the user.
#[async_trait]
pub trait FocusBackend: Send + Sync {
    async fn get_config(&self) -> Result<ConfigSnapshot>;

    /// Lock for `total_seconds` from now; returns the new lock end
    async fn start_session(&self, total_seconds: u64) -> Result<DateTime<Local>>;

    /// Pause enforcement; returns when the pause ends
    async fn emergency_unlock(&self) -> Result<DateTime<Local>>;

    async fn add_blocked_app(&self, app: &str) -> Result<()>;
    async fn remove_blocked_app(&self, app: &str) -> Result<()>;
    async fn set_blocked_apps(&self, apps: Vec<String>) -> Result<()>;

    async fn add_blocked_site(&self, site: &str) -> Result<()>;
    async fn remove_blocked_site(&self, site: &str) -> Result<()>;
    async fn add_blocked_sites(&self, sites: Vec<String>) -> Result<()>;
    async fn remove_blocked_sites(&self, sites: Vec<String>) -> Result<()>;
    async fn set_block_common_vpn(&self, enabled: bool) -> Result<()>;

    async fn get_schedules(&self) -> Result<Vec<Schedule>>;
    /// Replace the whole schedule list
    async fn save_schedules(&self, schedules: Vec<Schedule>) -> Result<()>;

    async fn get_installed_apps(&self) -> Result<Vec<AppInfo>>;
    async fn get_top_blocked_apps(&self) -> Result<Vec<AppInfo>>;

    async fn import_settings(&self, data: &str) -> Result<ImportSummary>;
    async fn export_settings(&self) -> Result<String>;
}

/// In-memory backend for unit tests and frontends without a daemon
#[derive(Default)]
pub struct MockBackend {
    config: Mutex<ConfigSnapshot>,
    calls: Mutex<Vec<String>>,

    /// Configure every call to fail with this error
    pub fail_with: Mutex<Option<FocusError>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConfigSnapshot) -> Self {
        let backend = Self::new();
        backend.set_config(config);
        backend
    }

    pub fn set_config(&self, config: ConfigSnapshot) {
        if let Ok(mut guard) = self.config.lock() {
            *guard = config;
        }
    }

    pub fn set_failure(&self, error: Option<FocusError>) {
        if let Ok(mut guard) = self.fail_with.lock() {
            *guard = error;
        }
    }

    /// Names of the operations called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn enter(&self, op: &str) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(op.to_string());
        }
        match self.fail_with.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            Err(_) => Err(FocusError::internal("mock lock poisoned")),
        }
    }

    fn with_config_mut<R>(&self, f: impl FnOnce(&mut ConfigSnapshot) -> R) -> Result<R> {
        self.config
            .lock()
            .map(|mut config| f(&mut config))
            .map_err(|_| FocusError::internal("mock lock poisoned"))
    }
}

#[async_trait]
impl FocusBackend for MockBackend {
    async fn get_config(&self) -> Result<ConfigSnapshot> {
        self.enter("get_config")?;
        self.with_config_mut(|c| c.clone())
    }

    async fn start_session(&self, total_seconds: u64) -> Result<DateTime<Local>> {
        self.enter("start_session")?;
        let end = focuslock_util::now() + chrono::Duration::seconds(total_seconds as i64);
        self.with_config_mut(|c| {
            c.lock_end_time = Some(end);
            c.emergency_unlocks_used = 0;
        })?;
        Ok(end)
    }

    async fn emergency_unlock(&self) -> Result<DateTime<Local>> {
        self.enter("emergency_unlock")?;
        let until = focuslock_util::now() + chrono::Duration::minutes(2);
        self.with_config_mut(|c| {
            c.paused_until = Some(until);
            c.emergency_unlocks_used += 1;
        })?;
        Ok(until)
    }

    async fn add_blocked_app(&self, app: &str) -> Result<()> {
        self.enter("add_blocked_app")?;
        self.with_config_mut(|c| c.blocked_apps.push(app.to_string()))
    }

    async fn remove_blocked_app(&self, app: &str) -> Result<()> {
        self.enter("remove_blocked_app")?;
        self.with_config_mut(|c| c.blocked_apps.retain(|a| a != app))
    }

    async fn set_blocked_apps(&self, apps: Vec<String>) -> Result<()> {
        self.enter("set_blocked_apps")?;
        self.with_config_mut(|c| c.blocked_apps = apps)
    }

    async fn add_blocked_site(&self, site: &str) -> Result<()> {
        self.enter("add_blocked_site")?;
        self.with_config_mut(|c| c.blocked_sites.push(site.to_string()))
    }

    async fn remove_blocked_site(&self, site: &str) -> Result<()> {
        self.enter("remove_blocked_site")?;
        self.with_config_mut(|c| c.blocked_sites.retain(|s| s != site))
    }

    async fn add_blocked_sites(&self, sites: Vec<String>) -> Result<()> {
        self.enter("add_blocked_sites")?;
        self.with_config_mut(|c| c.blocked_sites.extend(sites))
    }

    async fn remove_blocked_sites(&self, sites: Vec<String>) -> Result<()> {
        self.enter("remove_blocked_sites")?;
        self.with_config_mut(|c| c.blocked_sites.retain(|s| !sites.contains(s)))
    }

    async fn set_block_common_vpn(&self, enabled: bool) -> Result<()> {
        self.enter("set_block_common_vpn")?;
        self.with_config_mut(|c| c.block_common_vpn = enabled)
    }

    async fn get_schedules(&self) -> Result<Vec<Schedule>> {
        self.enter("get_schedules")?;
        self.with_config_mut(|c| c.schedules.clone())
    }

    async fn save_schedules(&self, schedules: Vec<Schedule>) -> Result<()> {
        self.enter("save_schedules")?;
        self.with_config_mut(|c| c.schedules = schedules)
    }

    async fn get_installed_apps(&self) -> Result<Vec<AppInfo>> {
        self.enter("get_installed_apps")?;
        Ok(Vec::new())
    }

    async fn get_top_blocked_apps(&self) -> Result<Vec<AppInfo>> {
        self.enter("get_top_blocked_apps")?;
        Ok(Vec::new())
    }

    async fn import_settings(&self, _data: &str) -> Result<ImportSummary> {
        self.enter("import_settings")?;
        Ok(ImportSummary::default())
    }

    async fn export_settings(&self) -> Result<String> {
        self.enter("export_settings")?;
        Ok(String::new())
    }
}
