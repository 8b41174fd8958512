//! Periodic snapshot refresh and countdown
//!
//! Two tasks: a coarse one that re-fetches the snapshot from the backend,
//! and a fine one that re-resolves the state against the latest snapshot.
//! Both publish through `watch` channels and stop when the monitor is shut
//! down or dropped.

use focuslock_api::{ConfigSnapshot, FocusStatus};
use focuslock_config::MonitorConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::{evaluate, FocusBackend};

/// Owns the refresh and countdown tasks
pub struct EngineMonitor {
    snapshot: watch::Receiver<Option<Arc<ConfigSnapshot>>>,
    status: watch::Receiver<Option<FocusStatus>>,
    refresh_task: JoinHandle<()>,
    countdown_task: JoinHandle<()>,
}

impl EngineMonitor {
    /// Spawn both tasks on the current runtime
    pub fn start(
        backend: Arc<dyn FocusBackend>,
        config: MonitorConfig,
        emergency_unlock_limit: u32,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(None);

        let refresh_task = tokio::spawn(refresh_loop(backend, config, snapshot_tx));
        let countdown_task = tokio::spawn(countdown_loop(
            snapshot_rx.clone(),
            config,
            emergency_unlock_limit,
            status_tx,
        ));

        debug!(
            refresh_ms = config.refresh_interval.as_millis() as u64,
            countdown_ms = config.countdown_interval.as_millis() as u64,
            "Engine monitor started"
        );

        Self {
            snapshot: snapshot_rx,
            status: status_rx,
            refresh_task,
            countdown_task,
        }
    }

    /// Status updates, one per countdown tick
    pub fn subscribe(&self) -> watch::Receiver<Option<FocusStatus>> {
        self.status.clone()
    }

    /// Last snapshot fetched successfully
    pub fn snapshot(&self) -> Option<Arc<ConfigSnapshot>> {
        self.snapshot.borrow().clone()
    }

    pub fn status(&self) -> Option<FocusStatus> {
        self.status.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.refresh_task.is_finished() && !self.countdown_task.is_finished()
    }

    /// Stop both tasks
    pub fn shutdown(&self) {
        self.refresh_task.abort();
        self.countdown_task.abort();
        debug!("Engine monitor stopped");
    }
}

impl Drop for EngineMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn refresh_loop(
    backend: Arc<dyn FocusBackend>,
    config: MonitorConfig,
    snapshot_tx: watch::Sender<Option<Arc<ConfigSnapshot>>>,
) {
    let mut ticker = interval(config.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match backend.get_config().await {
            Ok(snapshot) => {
                let changed = snapshot_tx
                    .borrow()
                    .as_deref()
                    .is_none_or(|current| *current != snapshot);
                if changed {
                    snapshot_tx.send_replace(Some(Arc::new(snapshot)));
                }
            }
            // Keep the last good snapshot
            Err(e) => warn!(error = %e, "Failed to refresh configuration"),
        }
    }
}

async fn countdown_loop(
    mut snapshot_rx: watch::Receiver<Option<Arc<ConfigSnapshot>>>,
    config: MonitorConfig,
    emergency_unlock_limit: u32,
    status_tx: watch::Sender<Option<FocusStatus>>,
) {
    let mut ticker = interval(config.countdown_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let snapshot = snapshot_rx.borrow_and_update().clone();
        if let Some(snapshot) = snapshot {
            let status = evaluate(&snapshot, focuslock_util::now(), emergency_unlock_limit);
            status_tx.send_replace(Some(status));
        }
    }
}
