//! Store trait definitions

use focuslock_api::ConfigSnapshot;

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Configuration snapshot

    /// Load the persisted configuration, if one was ever saved
    fn load_config(&self) -> StoreResult<Option<ConfigSnapshot>>;

    /// Replace the persisted configuration
    fn save_config(&self, config: &ConfigSnapshot) -> StoreResult<()>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
