//! Store-backed focus service
//!
//! Owns the configuration snapshot, applies every mutation atomically
//! (validate, persist, then update the cached copy) and enforces the lock
//! guards that keep a running session from being weakened.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta};
use focuslock_api::{
    AppInfo, ConfigSnapshot, EffectiveBlocklist, FocusStatus, HealthStatus, ImportSummary,
    Schedule,
};
use focuslock_config::{validate_schedules, SessionPolicy};
use focuslock_host_api::AppCatalog;
use focuslock_store::{AuditEvent, AuditEventType, Store};
use focuslock_util::{FocusError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::blocklist::{contains_app, effective_blocklist, insert_app, insert_site, normalize_app, normalize_site};
use crate::engine::{active_manual_lock, active_pause, evaluate, session_in_force};
use crate::import::{merge_document, SettingsDocument};
use crate::{CoreEvent, FocusBackend};

/// Number of entries returned by [`FocusService::top_blocked_apps`]
pub const TOP_BLOCKED_LIMIT: usize = 5;

/// The focus-lock backend
pub struct FocusService {
    store: Arc<dyn Store>,
    catalog: Arc<dyn AppCatalog>,
    policy: SessionPolicy,
    config: ConfigSnapshot,
    events: Vec<CoreEvent>,
}

impl FocusService {
    /// Load the persisted snapshot, or start from the default one
    pub fn new(
        store: Arc<dyn Store>,
        catalog: Arc<dyn AppCatalog>,
        policy: SessionPolicy,
    ) -> Result<Self> {
        let config = match store.load_config()? {
            Some(config) => config,
            None => {
                info!("No saved configuration, starting from defaults");
                ConfigSnapshot::default()
            }
        };

        info!(
            blocked_apps = config.blocked_apps.len(),
            blocked_sites = config.blocked_sites.len(),
            schedules = config.schedules.len(),
            "Focus service initialized"
        );

        if let Err(e) = store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted)) {
            warn!(error = %e, "Failed to append audit event");
        }

        Ok(Self {
            store,
            catalog,
            policy,
            config,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn status(&self, now: DateTime<Local>) -> FocusStatus {
        evaluate(&self.config, now, self.policy.emergency_unlock_limit)
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply `f` to a copy of the snapshot, persist it, then make it current.
    ///
    /// If `f` or the store fails the cached snapshot is left unchanged.
    fn update<R>(&mut self, f: impl FnOnce(&mut ConfigSnapshot) -> Result<R>) -> Result<R> {
        let mut next = self.config.clone();
        let out = f(&mut next)?;
        if next != self.config {
            self.store.save_config(&next)?;
            self.config = next;
        }
        Ok(out)
    }

    fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }

    fn block_list_changed(&mut self) {
        self.audit(AuditEventType::BlockListChanged {
            apps: self.config.blocked_apps.len(),
            sites: self.config.blocked_sites.len(),
            block_common_vpn: self.config.block_common_vpn,
        });
        self.events.push(CoreEvent::ConfigChanged);
    }

    fn guard(&self, now: DateTime<Local>, what: &str) -> Result<()> {
        if session_in_force(&self.config, now) {
            debug!(operation = what, "Rejected while session in force");
            return Err(FocusError::session_active(format!(
                "Cannot {} while a focus session is active",
                what
            )));
        }
        Ok(())
    }

    // Sessions

    /// Start (or extend) a manual lock of `total_seconds` from `now`
    pub fn start_session(&mut self, total_seconds: u64, now: DateTime<Local>) -> Result<DateTime<Local>> {
        if total_seconds == 0 {
            return Err(FocusError::validation("Duration must be greater than zero"));
        }
        if let Some(max) = self.policy.max_session {
            if Duration::from_secs(total_seconds) > max {
                return Err(FocusError::validation(format!(
                    "Sessions are limited to {} minutes",
                    max.as_secs() / 60
                )));
            }
        }

        let end = i64::try_from(total_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| FocusError::validation("Duration is too long"))?;

        if let Some(current) = active_manual_lock(&self.config, now) {
            if end < current {
                return Err(FocusError::session_active(format!(
                    "A focus session is already running until {}",
                    focuslock_util::format_clock_time(&current)
                )));
            }
        }

        self.update(|config| {
            config.lock_end_time = Some(end);
            config.paused_until = None;
            config.emergency_unlocks_used = 0;

            for app in &config.blocked_apps {
                *config.stats.blocked_frequency.entry(app.clone()).or_insert(0) += 1;
                *config.stats.blocked_duration.entry(app.clone()).or_insert(0) += total_seconds;
            }
            Ok(())
        })?;

        self.audit(AuditEventType::SessionStarted {
            total_seconds,
            lock_end_time: end,
        });
        self.events.push(CoreEvent::SessionStarted {
            lock_end_time: end,
            total_seconds,
        });

        info!(
            total_seconds,
            lock_end_time = %end,
            blocked_apps = self.config.blocked_apps.len(),
            "Focus session started"
        );

        Ok(end)
    }

    /// Suspend enforcement for the configured pause
    pub fn emergency_unlock(&mut self, now: DateTime<Local>) -> Result<DateTime<Local>> {
        if !session_in_force(&self.config, now) {
            return Err(FocusError::NoActiveSession);
        }
        if let Some(until) = active_pause(&self.config, now) {
            return Err(FocusError::validation(format!(
                "Already paused until {}",
                focuslock_util::format_clock_time(&until)
            )));
        }

        let limit = self.policy.emergency_unlock_limit;
        let used = self.config.emergency_unlocks_used;
        if used >= limit {
            warn!(used, limit, "Emergency unlock refused");
            return Err(FocusError::UnlockLimitReached { used, limit });
        }

        let pause = TimeDelta::from_std(self.policy.pause)
            .map_err(|e| FocusError::internal(format!("invalid pause duration: {}", e)))?;
        let until = now + pause;

        let used = self.update(|config| {
            config.paused_until = Some(until);
            config.emergency_unlocks_used += 1;
            Ok(config.emergency_unlocks_used)
        })?;

        self.audit(AuditEventType::EmergencyUnlock {
            paused_until: until,
            used,
        });
        self.events.push(CoreEvent::EmergencyUnlocked {
            paused_until: until,
            used,
            limit,
        });

        info!(paused_until = %until, used, limit, "Emergency unlock");

        Ok(until)
    }

    /// Clear an expired manual lock and pause.
    ///
    /// Expired fields are already inert for the resolver; this only keeps
    /// the stored snapshot tidy and reports the expiry.
    pub fn housekeeping(&mut self, now: DateTime<Local>) -> Result<()> {
        let expired_lock = self.config.lock_end_time.filter(|end| now >= *end);
        let expired_pause = self.config.paused_until.is_some_and(|until| now >= until);

        if expired_lock.is_none() && !expired_pause {
            return Ok(());
        }

        self.update(|config| {
            if expired_lock.is_some() {
                config.lock_end_time = None;
                config.emergency_unlocks_used = 0;
            }
            if expired_pause {
                config.paused_until = None;
            }
            Ok(())
        })?;

        if let Some(lock_end_time) = expired_lock {
            self.audit(AuditEventType::LockExpired { lock_end_time });
            self.events.push(CoreEvent::LockExpired { lock_end_time });
            info!(lock_end_time = %lock_end_time, "Focus session ended");
        }
        if expired_pause {
            debug!("Pause expired");
        }

        Ok(())
    }

    // Blocked apps

    pub fn add_blocked_app(&mut self, app: &str) -> Result<()> {
        let app = normalize_app(app)?;
        if self.update(|config| Ok(insert_app(&mut config.blocked_apps, app)))? {
            self.block_list_changed();
        }
        Ok(())
    }

    pub fn remove_blocked_app(&mut self, app: &str, now: DateTime<Local>) -> Result<()> {
        let app = normalize_app(app)?;
        if !contains_app(&self.config.blocked_apps, &app) {
            return Ok(());
        }
        self.guard(now, "remove blocked apps")?;

        self.update(|config| {
            config.blocked_apps.retain(|a| !a.eq_ignore_ascii_case(&app));
            Ok(())
        })?;
        self.block_list_changed();
        Ok(())
    }

    /// Replace the app list; while a session is in force it may only grow
    pub fn set_blocked_apps(&mut self, apps: Vec<String>, now: DateTime<Local>) -> Result<()> {
        let mut next = Vec::with_capacity(apps.len());
        for app in &apps {
            insert_app(&mut next, normalize_app(app)?);
        }

        let drops_any = self
            .config
            .blocked_apps
            .iter()
            .any(|current| !contains_app(&next, current));
        if drops_any {
            self.guard(now, "remove blocked apps")?;
        }

        if next == self.config.blocked_apps {
            return Ok(());
        }
        self.update(|config| {
            config.blocked_apps = next;
            Ok(())
        })?;
        self.block_list_changed();
        Ok(())
    }

    // Blocked sites

    pub fn add_blocked_site(&mut self, site: &str) -> Result<()> {
        self.add_blocked_sites(vec![site.to_string()])
    }

    pub fn add_blocked_sites(&mut self, sites: Vec<String>) -> Result<()> {
        let sites = sites
            .iter()
            .map(|s| normalize_site(s))
            .collect::<Result<Vec<_>>>()?;

        let changed = self.update(|config| {
            let mut changed = false;
            for site in sites {
                changed |= insert_site(&mut config.blocked_sites, site);
            }
            Ok(changed)
        })?;
        if changed {
            self.block_list_changed();
        }
        Ok(())
    }

    pub fn remove_blocked_site(&mut self, site: &str, now: DateTime<Local>) -> Result<()> {
        self.remove_blocked_sites(vec![site.to_string()], now)
    }

    pub fn remove_blocked_sites(&mut self, sites: Vec<String>, now: DateTime<Local>) -> Result<()> {
        let sites = sites
            .iter()
            .map(|s| normalize_site(s))
            .collect::<Result<Vec<_>>>()?;

        if !self.config.blocked_sites.iter().any(|s| sites.contains(s)) {
            return Ok(());
        }
        self.guard(now, "remove blocked sites")?;

        self.update(|config| {
            config.blocked_sites.retain(|s| !sites.contains(s));
            Ok(())
        })?;
        self.block_list_changed();
        Ok(())
    }

    pub fn set_block_common_vpn(&mut self, enabled: bool, now: DateTime<Local>) -> Result<()> {
        if enabled == self.config.block_common_vpn {
            return Ok(());
        }
        if !enabled {
            self.guard(now, "turn off VPN blocking")?;
        }

        self.update(|config| {
            config.block_common_vpn = enabled;
            Ok(())
        })?;
        self.block_list_changed();
        Ok(())
    }

    pub fn effective_blocklist(&self) -> EffectiveBlocklist {
        effective_blocklist(&self.config)
    }

    // Schedules

    pub fn schedules(&self) -> Vec<Schedule> {
        self.config.schedules.clone()
    }

    /// Replace the schedule list.
    ///
    /// While a session is in force, every currently enabled schedule must
    /// still be present and enabled.
    pub fn save_schedules(&mut self, schedules: Vec<Schedule>, now: DateTime<Local>) -> Result<()> {
        let errors = validate_schedules(&schedules);
        if !errors.is_empty() {
            let message = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FocusError::validation(message));
        }

        let weakens = self
            .config
            .schedules
            .iter()
            .filter(|old| old.enabled)
            .any(|old| !schedules.iter().any(|new| new.id == old.id && new.enabled));
        if weakens {
            self.guard(now, "delete or disable schedules")?;
        }

        let count = schedules.len();
        self.update(|config| {
            config.schedules = schedules;
            Ok(())
        })?;

        self.audit(AuditEventType::SchedulesSaved { count });
        self.events.push(CoreEvent::ConfigChanged);
        info!(count, "Schedules saved");
        Ok(())
    }

    // Catalog

    pub async fn installed_apps(&self) -> Result<Vec<AppInfo>> {
        Ok(self.catalog.installed_apps().await?)
    }

    /// Most-blocked apps by accumulated duration, resolved against the
    /// catalog. Entries the catalog does not know are left out.
    pub async fn top_blocked_apps(&self) -> Result<Vec<AppInfo>> {
        let mut ranked: Vec<(&String, u64)> = self
            .config
            .stats
            .blocked_duration
            .iter()
            .map(|(exe, secs)| (exe, *secs))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
        });
        ranked.truncate(TOP_BLOCKED_LIMIT);

        let installed = self.installed_apps().await?;
        Ok(ranked
            .into_iter()
            .filter_map(|(exe, _)| {
                installed
                    .iter()
                    .find(|app| app.exe.eq_ignore_ascii_case(exe))
                    .cloned()
            })
            .collect())
    }

    // Import / export

    pub async fn import_settings(&mut self, data: &str) -> Result<ImportSummary> {
        let document = SettingsDocument::parse(data)?;

        let installed = match self.catalog.installed_apps().await {
            Ok(apps) => apps,
            Err(e) => {
                warn!(error = %e, "App catalog unavailable, importing names as typed");
                Vec::new()
            }
        };

        let summary = self
            .update(|config| merge_document(config, document, &installed))
            .map_err(|e| match e {
                FocusError::ImportError(_) => e,
                other => FocusError::import(other.to_string()),
            })?;

        self.audit(AuditEventType::SettingsImported {
            apps_added: summary.apps_added,
            sites_added: summary.sites_added,
            schedules_added: summary.schedules_added,
        });
        if summary != ImportSummary::default() {
            self.events.push(CoreEvent::ConfigChanged);
        }

        info!(
            apps_added = summary.apps_added,
            sites_added = summary.sites_added,
            schedules_added = summary.schedules_added,
            "Settings imported"
        );
        Ok(summary)
    }

    pub fn export_settings(&self) -> Result<String> {
        SettingsDocument::from_config(&self.config).to_json()
    }

    // Enforcer reports

    /// Count a process kill reported by the enforcer
    pub fn record_kill(&mut self, app: &str) -> Result<()> {
        let app = normalize_app(app)?;
        self.update(|config| {
            *config.stats.kill_counts.entry(app).or_insert(0) += 1;
            Ok(())
        })
    }

    // Health

    pub fn health(&self) -> HealthStatus {
        let store_ok = self.store.is_healthy();
        let catalog_ok = self.catalog.is_healthy();
        HealthStatus {
            live: true,
            ready: store_ok,
            store_ok,
            catalog_ok,
        }
    }

    /// Record a clean stop in the audit log
    pub fn shutdown(&self) {
        self.audit(AuditEventType::ServiceStopped);
    }
}

#[async_trait]
impl FocusBackend for Mutex<FocusService> {
    async fn get_config(&self) -> Result<ConfigSnapshot> {
        Ok(self.lock().await.config().clone())
    }

    async fn start_session(&self, total_seconds: u64) -> Result<DateTime<Local>> {
        self.lock()
            .await
            .start_session(total_seconds, focuslock_util::now())
    }

    async fn emergency_unlock(&self) -> Result<DateTime<Local>> {
        self.lock().await.emergency_unlock(focuslock_util::now())
    }

    async fn add_blocked_app(&self, app: &str) -> Result<()> {
        self.lock().await.add_blocked_app(app)
    }

    async fn remove_blocked_app(&self, app: &str) -> Result<()> {
        self.lock()
            .await
            .remove_blocked_app(app, focuslock_util::now())
    }

    async fn set_blocked_apps(&self, apps: Vec<String>) -> Result<()> {
        self.lock()
            .await
            .set_blocked_apps(apps, focuslock_util::now())
    }

    async fn add_blocked_site(&self, site: &str) -> Result<()> {
        self.lock().await.add_blocked_site(site)
    }

    async fn remove_blocked_site(&self, site: &str) -> Result<()> {
        self.lock()
            .await
            .remove_blocked_site(site, focuslock_util::now())
    }

    async fn add_blocked_sites(&self, sites: Vec<String>) -> Result<()> {
        self.lock().await.add_blocked_sites(sites)
    }

    async fn remove_blocked_sites(&self, sites: Vec<String>) -> Result<()> {
        self.lock()
            .await
            .remove_blocked_sites(sites, focuslock_util::now())
    }

    async fn set_block_common_vpn(&self, enabled: bool) -> Result<()> {
        self.lock()
            .await
            .set_block_common_vpn(enabled, focuslock_util::now())
    }

    async fn get_schedules(&self) -> Result<Vec<Schedule>> {
        Ok(self.lock().await.schedules())
    }

    async fn save_schedules(&self, schedules: Vec<Schedule>) -> Result<()> {
        self.lock()
            .await
            .save_schedules(schedules, focuslock_util::now())
    }

    async fn get_installed_apps(&self) -> Result<Vec<AppInfo>> {
        self.lock().await.installed_apps().await
    }

    async fn get_top_blocked_apps(&self) -> Result<Vec<AppInfo>> {
        self.lock().await.top_blocked_apps().await
    }

    async fn import_settings(&self, data: &str) -> Result<ImportSummary> {
        self.lock().await.import_settings(data).await
    }

    async fn export_settings(&self) -> Result<String> {
        self.lock().await.export_settings()
    }
}
