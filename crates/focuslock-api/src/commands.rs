//! Command types for the focuslockd protocol

use chrono::{DateTime, Local};
use focuslock_util::{ClientId, FocusError};
use serde::{Deserialize, Serialize};

use crate::{
    AppInfo, ClientRole, ConfigSnapshot, EffectiveBlocklist, FocusStatus, HealthStatus,
    ImportSummary, Schedule, API_VERSION,
};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Rebuild the typed error on the client side
    pub fn into_focus_error(self) -> FocusError {
        match self.code {
            ErrorCode::InvalidRequest | ErrorCode::ValidationFailed => {
                FocusError::Validation(self.message)
            }
            ErrorCode::SessionActive => FocusError::SessionActive(self.message),
            ErrorCode::NoActiveSession => FocusError::NoActiveSession,
            ErrorCode::UnlockLimitReached => FocusError::Validation(self.message),
            ErrorCode::PermissionDenied => FocusError::PermissionDenied(self.message),
            ErrorCode::RateLimited => FocusError::RateLimited,
            ErrorCode::ImportFailed => FocusError::ImportError(self.message),
            ErrorCode::StoreError => FocusError::StoreError(self.message),
            ErrorCode::InternalError => FocusError::Internal(self.message),
        }
    }
}

impl From<&FocusError> for ErrorInfo {
    fn from(err: &FocusError) -> Self {
        let code = match err {
            FocusError::Validation(_) | FocusError::ConfigError(_) => ErrorCode::ValidationFailed,
            FocusError::SessionActive(_) => ErrorCode::SessionActive,
            FocusError::NoActiveSession => ErrorCode::NoActiveSession,
            FocusError::UnlockLimitReached { .. } => ErrorCode::UnlockLimitReached,
            FocusError::ImportError(_) => ErrorCode::ImportFailed,
            FocusError::StoreError(_) => ErrorCode::StoreError,
            FocusError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            FocusError::RateLimited => ErrorCode::RateLimited,
            FocusError::IpcError(_) | FocusError::Internal(_) => ErrorCode::InternalError,
        };
        Self::new(code, err.to_string())
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    ValidationFailed,
    SessionActive,
    UnlockLimitReached,
    NoActiveSession,
    PermissionDenied,
    RateLimited,
    ImportFailed,
    StoreError,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Get the current enforcement state
    GetState,

    /// Get the full configuration snapshot
    GetConfig,

    /// Start a manual focus session
    StartSession { total_seconds: u64 },

    /// Suspend enforcement for the configured pause length
    EmergencyUnlock,

    AddBlockedApp { app: String },
    RemoveBlockedApp { app: String },
    SetBlockedApps { apps: Vec<String> },

    AddBlockedSite { site: String },
    RemoveBlockedSite { site: String },
    AddBlockedSites { sites: Vec<String> },
    RemoveBlockedSites { sites: Vec<String> },
    SetBlockCommonVpn { enabled: bool },

    GetSchedules,
    /// Replace the whole schedule list
    SaveSchedules { schedules: Vec<Schedule> },

    GetInstalledApps,
    GetTopBlockedApps,

    /// Merge settings from an exported JSON document
    ImportSettings { data: String },
    ExportSettings,

    // Enforcer commands

    /// Block lists the enforcer should apply, VPN list included
    GetEffectiveBlocklist,
    /// Report that a blocked process was terminated
    RecordKill { app: String },

    /// Subscribe to events (returns immediately, events stream separately)
    SubscribeEvents,

    /// Unsubscribe from events
    UnsubscribeEvents,

    /// Get health status
    GetHealth,

    /// Ping for keepalive
    Ping,
}

impl Command {
    /// Whether the command changes persisted state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::StartSession { .. }
                | Command::EmergencyUnlock
                | Command::AddBlockedApp { .. }
                | Command::RemoveBlockedApp { .. }
                | Command::SetBlockedApps { .. }
                | Command::AddBlockedSite { .. }
                | Command::RemoveBlockedSite { .. }
                | Command::AddBlockedSites { .. }
                | Command::RemoveBlockedSites { .. }
                | Command::SetBlockCommonVpn { .. }
                | Command::SaveSchedules { .. }
                | Command::ImportSettings { .. }
        )
    }
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    State(FocusStatus),
    Config(ConfigSnapshot),
    SessionStarted {
        lock_end_time: DateTime<Local>,
    },
    Paused {
        until: DateTime<Local>,
        used: u32,
        limit: u32,
    },
    Schedules {
        schedules: Vec<Schedule>,
    },
    Apps {
        apps: Vec<AppInfo>,
    },
    Imported(ImportSummary),
    Exported {
        data: String,
    },
    Blocklist(EffectiveBlocklist),
    KillRecorded,
    Subscribed {
        client_id: ClientId,
    },
    Unsubscribed,
    Health(HealthStatus),
    Pong,
}

/// Client connection info (set by IPC layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: ClientId,
    pub role: ClientRole,
    /// Unix UID if available
    pub uid: Option<u32>,
}

impl ClientInfo {
    pub fn new(role: ClientRole) -> Self {
        Self {
            client_id: ClientId::new(),
            role,
            uid: None,
        }
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = Request::new(1, Command::StartSession { total_seconds: 3600 });
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""type":"start_session""#));

        let parsed: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.request_id, 1);
        assert!(matches!(
            parsed.command,
            Command::StartSession { total_seconds: 3600 }
        ));
    }

    #[test]
    fn response_serialization() {
        let resp = Response::success(1, ResponsePayload::Config(ConfigSnapshot::default()));

        let json = serde_json::to_string(&resp).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 1);
        assert!(matches!(
            parsed.result,
            ResponseResult::Ok(ResponsePayload::Config(_))
        ));
    }

    #[test]
    fn focus_errors_map_to_codes() {
        let info = ErrorInfo::from(&FocusError::UnlockLimitReached { used: 2, limit: 2 });
        assert_eq!(info.code, ErrorCode::UnlockLimitReached);
        assert_eq!(info.message, "Emergency unlock limit reached (2/2)");

        let info = ErrorInfo::from(&FocusError::session_active("Cannot remove sites"));
        assert_eq!(info.code, ErrorCode::SessionActive);
        assert!(matches!(
            info.into_focus_error(),
            FocusError::SessionActive(msg) if msg == "Cannot remove sites"
        ));
    }

    #[test]
    fn read_only_commands_are_not_mutations() {
        assert!(!Command::GetState.is_mutation());
        assert!(!Command::ExportSettings.is_mutation());
        assert!(Command::EmergencyUnlock.is_mutation());
    }
}
