//! Error types for focuslock

use thiserror::Error;

/// Core error type for focuslock operations
///
/// Every variant carries a message that is safe to show to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FocusError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    SessionActive(String),

    #[error("No focus session is active")]
    NoActiveSession,

    #[error("Emergency unlock limit reached ({used}/{limit})")]
    UnlockLimitReached { used: u32, limit: u32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Import failed: {0}")]
    ImportError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FocusError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn session_active(msg: impl Into<String>) -> Self {
        Self::SessionActive(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn import(msg: impl Into<String>) -> Self {
        Self::ImportError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn ipc(msg: impl Into<String>) -> Self {
        Self::IpcError(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors raised locally before any backend work happened
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, FocusError>;
