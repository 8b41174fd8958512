//! Backend implementation that talks to focuslockd

use async_trait::async_trait;
use chrono::{DateTime, Local};
use focuslock_api::{
    AppInfo, Command, ConfigSnapshot, EffectiveBlocklist, FocusStatus, HealthStatus,
    ImportSummary, ResponsePayload, ResponseResult, Schedule,
};
use focuslock_core::FocusBackend;
use focuslock_ipc::IpcClient;
use focuslock_util::{FocusError, Result};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// [`FocusBackend`] over the daemon socket.
///
/// One connection, one request in flight at a time. A dropped connection
/// (daemon restart) is re-established once per call.
pub struct DaemonBackend {
    socket_path: PathBuf,
    client: Mutex<IpcClient>,
}

impl DaemonBackend {
    pub async fn connect(socket_path: impl AsRef<Path>) -> Result<Self> {
        let socket_path = socket_path.as_ref();
        debug!(path = %socket_path.display(), "Connecting to focuslockd");
        let client = IpcClient::connect(socket_path).await?;
        Ok(Self {
            socket_path: socket_path.to_path_buf(),
            client: Mutex::new(client),
        })
    }

    async fn call(&self, command: Command) -> Result<ResponsePayload> {
        let mut client = self.client.lock().await;
        let response = match client.send(command.clone()).await {
            Err(e) if e.is_disconnect() => {
                warn!(error = %e, "Lost connection to focuslockd, reconnecting");
                *client = IpcClient::connect(&self.socket_path).await?;
                client.send(command).await?
            }
            other => other?,
        };
        match response.result {
            ResponseResult::Ok(payload) => Ok(payload),
            ResponseResult::Err(e) => Err(e.into_focus_error()),
        }
    }

    /// Run a command whose reply is the updated snapshot
    async fn edit(&self, command: Command) -> Result<()> {
        match self.call(command).await? {
            ResponsePayload::Config(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn status(&self) -> Result<FocusStatus> {
        match self.call(Command::GetState).await? {
            ResponsePayload::State(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    pub async fn effective_blocklist(&self) -> Result<EffectiveBlocklist> {
        match self.call(Command::GetEffectiveBlocklist).await? {
            ResponsePayload::Blocklist(list) => Ok(list),
            other => Err(unexpected(other)),
        }
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        match self.call(Command::GetHealth).await? {
            ResponsePayload::Health(health) => Ok(health),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(payload: ResponsePayload) -> FocusError {
    FocusError::ipc(format!("Unexpected response from focuslockd: {:?}", payload))
}

#[async_trait]
impl FocusBackend for DaemonBackend {
    async fn get_config(&self) -> Result<ConfigSnapshot> {
        match self.call(Command::GetConfig).await? {
            ResponsePayload::Config(config) => Ok(config),
            other => Err(unexpected(other)),
        }
    }

    async fn start_session(&self, total_seconds: u64) -> Result<DateTime<Local>> {
        match self.call(Command::StartSession { total_seconds }).await? {
            ResponsePayload::SessionStarted { lock_end_time } => Ok(lock_end_time),
            other => Err(unexpected(other)),
        }
    }

    async fn emergency_unlock(&self) -> Result<DateTime<Local>> {
        match self.call(Command::EmergencyUnlock).await? {
            ResponsePayload::Paused { until, .. } => Ok(until),
            other => Err(unexpected(other)),
        }
    }

    async fn add_blocked_app(&self, app: &str) -> Result<()> {
        self.edit(Command::AddBlockedApp { app: app.to_string() }).await
    }

    async fn remove_blocked_app(&self, app: &str) -> Result<()> {
        self.edit(Command::RemoveBlockedApp { app: app.to_string() }).await
    }

    async fn set_blocked_apps(&self, apps: Vec<String>) -> Result<()> {
        self.edit(Command::SetBlockedApps { apps }).await
    }

    async fn add_blocked_site(&self, site: &str) -> Result<()> {
        self.edit(Command::AddBlockedSite { site: site.to_string() }).await
    }

    async fn remove_blocked_site(&self, site: &str) -> Result<()> {
        self.edit(Command::RemoveBlockedSite { site: site.to_string() }).await
    }

    async fn add_blocked_sites(&self, sites: Vec<String>) -> Result<()> {
        self.edit(Command::AddBlockedSites { sites }).await
    }

    async fn remove_blocked_sites(&self, sites: Vec<String>) -> Result<()> {
        self.edit(Command::RemoveBlockedSites { sites }).await
    }

    async fn set_block_common_vpn(&self, enabled: bool) -> Result<()> {
        self.edit(Command::SetBlockCommonVpn { enabled }).await
    }

    async fn get_schedules(&self) -> Result<Vec<Schedule>> {
        match self.call(Command::GetSchedules).await? {
            ResponsePayload::Schedules { schedules } => Ok(schedules),
            other => Err(unexpected(other)),
        }
    }

    async fn save_schedules(&self, schedules: Vec<Schedule>) -> Result<()> {
        match self.call(Command::SaveSchedules { schedules }).await? {
            ResponsePayload::Schedules { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn get_installed_apps(&self) -> Result<Vec<AppInfo>> {
        match self.call(Command::GetInstalledApps).await? {
            ResponsePayload::Apps { apps } => Ok(apps),
            other => Err(unexpected(other)),
        }
    }

    async fn get_top_blocked_apps(&self) -> Result<Vec<AppInfo>> {
        match self.call(Command::GetTopBlockedApps).await? {
            ResponsePayload::Apps { apps } => Ok(apps),
            other => Err(unexpected(other)),
        }
    }

    async fn import_settings(&self, data: &str) -> Result<ImportSummary> {
        match self.call(Command::ImportSettings { data: data.to_string() }).await? {
            ResponsePayload::Imported(summary) => Ok(summary),
            other => Err(unexpected(other)),
        }
    }

    async fn export_settings(&self) -> Result<String> {
        match self.call(Command::ExportSettings).await? {
            ResponsePayload::Exported { data } => Ok(data),
            other => Err(unexpected(other)),
        }
    }
}
