//! IPC layer for focuslockd
//!
//! Provides:
//! - Unix domain socket server
//! - NDJSON (newline-delimited JSON) protocol
//! - Client connection management
//! - Peer UID based role assignment

mod client;
mod server;

pub use client::*;
pub use server::*;

use focuslock_util::FocusError;
use thiserror::Error;

/// IPC errors
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl IpcError {
    /// True when the connection itself is gone and a fresh one may succeed
    pub fn is_disconnect(&self) -> bool {
        matches!(self, IpcError::ConnectionClosed | IpcError::Io(_))
    }
}

impl From<IpcError> for FocusError {
    fn from(err: IpcError) -> Self {
        match err {
            IpcError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                FocusError::ipc("focuslockd is not running")
            }
            IpcError::Io(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                FocusError::ipc("focuslockd is not running")
            }
            other => FocusError::ipc(other.to_string()),
        }
    }
}

pub type IpcResult<T> = Result<T, IpcError>;
