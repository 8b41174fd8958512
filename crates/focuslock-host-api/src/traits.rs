//! App catalog traits

use async_trait::async_trait;
use focuslock_api::AppInfo;
use focuslock_util::FocusError;
use thiserror::Error;

/// Errors from catalog operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<HostError> for FocusError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::PermissionDenied(msg) => FocusError::permission(msg),
            other => FocusError::internal(other.to_string()),
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// Source of installed-application metadata
#[async_trait]
pub trait AppCatalog: Send + Sync {
    /// List installed applications, sorted by display name
    async fn installed_apps(&self) -> HostResult<Vec<AppInfo>>;

    /// Optional: check if the catalog is healthy
    fn is_healthy(&self) -> bool {
        true
    }
}

/// Catalog backed by a fixed list, typically from the daemon config
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    apps: Vec<AppInfo>,
}

impl StaticCatalog {
    pub fn new(mut apps: Vec<AppInfo>) -> Self {
        apps.sort_by_key(|app| app.name.to_lowercase());
        tracing::debug!(count = apps.len(), "Static catalog loaded");
        Self { apps }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

#[async_trait]
impl AppCatalog for StaticCatalog {
    async fn installed_apps(&self) -> HostResult<Vec<AppInfo>> {
        Ok(self.apps.clone())
    }
}
