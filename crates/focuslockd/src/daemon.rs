//! Daemon wiring and main loop

use anyhow::{Context, Result};
use focuslock_api::{EnforcementState, ErrorCode, ErrorInfo, Event, EventPayload, Response};
use focuslock_config::Settings;
use focuslock_core::{CoreEvent, FocusService};
use focuslock_host_api::{AppCatalog, StaticCatalog};
use focuslock_ipc::{IpcServer, ServerMessage};
use focuslock_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use focuslock_util::{ClientId, RateLimiter};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::handle_command;

/// Database file inside the data directory
pub const DATABASE_FILE: &str = "focuslock.db";

/// Wired-up daemon, ready to run
pub struct Daemon {
    service: Arc<Mutex<FocusService>>,
    ipc: Arc<IpcServer>,
    store: Arc<dyn Store>,
    messages: mpsc::UnboundedReceiver<ServerMessage>,
    rate_limiter: RateLimiter<ClientId>,
    tick_interval: Duration,
    last_state: Option<EnforcementState>,
}

impl Daemon {
    /// Open the store, load the snapshot and bind the socket
    pub async fn new(settings: &Settings) -> Result<Self> {
        let data_dir = &settings.daemon.data_dir;
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(DATABASE_FILE);
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );
        info!(db_path = %db_path.display(), "Store initialized");

        let catalog: Arc<dyn AppCatalog> = Arc::new(StaticCatalog::new(settings.catalog.clone()));

        let service = FocusService::new(store.clone(), catalog, settings.session)
            .context("Failed to initialize focus service")?;

        let mut ipc = IpcServer::new(&settings.daemon.socket_path);
        ipc.start()
            .await
            .with_context(|| format!("Failed to bind {:?}", settings.daemon.socket_path))?;
        let messages = ipc
            .take_message_receiver()
            .await
            .context("IPC message receiver already taken")?;

        // 30 requests per second per client
        let rate_limiter = RateLimiter::new(30, Duration::from_secs(1));

        Ok(Self {
            service: Arc::new(Mutex::new(service)),
            ipc: Arc::new(ipc),
            store,
            messages,
            rate_limiter,
            tick_interval: settings.daemon.tick_interval,
            last_state: None,
        })
    }

    pub fn socket_path(&self) -> PathBuf {
        self.ipc.socket_path().to_path_buf()
    }

    /// Run until `shutdown` resolves
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let ipc_accept = self.ipc.clone();
        let accept_task = tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        let mut tick_timer = tokio::time::interval(self.tick_interval);
        tick_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        info!("Service running");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }

                // Clear expired locks and report state transitions
                _ = tick_timer.tick() => {
                    self.publish().await;
                }

                Some(msg) = self.messages.recv() => {
                    self.handle_message(msg).await;
                }
            }
        }

        info!("Shutting down focuslockd");

        self.ipc.broadcast_event(Event::new(EventPayload::Shutdown));
        self.service.lock().await.shutdown();

        // Give writers a moment to flush the shutdown event
        tokio::time::sleep(Duration::from_millis(50)).await;
        accept_task.abort();
        self.ipc.disconnect_all().await;
        self.ipc.shutdown();

        info!("Shutdown complete");
        Ok(())
    }

    /// Run housekeeping, then broadcast queued core events and any change
    /// of enforcement state
    async fn publish(&mut self) {
        let now = focuslock_util::now();
        let (events, status) = {
            let mut service = self.service.lock().await;
            if let Err(e) = service.housekeeping(now) {
                warn!(error = %e, "Housekeeping failed");
            }
            (service.drain_events(), service.status(now))
        };

        for event in events {
            if let Some(payload) = event_payload(event) {
                self.ipc.broadcast_event(Event::new(payload));
            }
        }

        let changed = self
            .last_state
            .as_ref()
            .is_none_or(|last| !last.same_kind(&status.state));
        if changed {
            info!(state = ?status.state, "Enforcement state changed");
            self.last_state = Some(status.state.clone());
            self.ipc
                .broadcast_event(Event::new(EventPayload::StateChanged(status)));
        }
    }

    async fn handle_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Request { client_id, request } => {
                if !self.rate_limiter.check(&client_id) {
                    let response = Response::error(
                        request.request_id,
                        ErrorInfo::new(ErrorCode::RateLimited, "Too many requests"),
                    );
                    let _ = self.ipc.send_response(&client_id, response).await;
                    return;
                }

                let Some(info) = self.ipc.get_client_info(&client_id).await else {
                    debug!(client_id = %client_id, "Request from departed client");
                    return;
                };

                let mutation = request.command.is_mutation();
                let response =
                    handle_command(&self.service, &info, request.request_id, request.command).await;

                if let Err(e) = self.ipc.send_response(&client_id, response).await {
                    debug!(client_id = %client_id, error = %e, "Failed to send response");
                }

                if mutation {
                    self.publish().await;
                }
            }

            ServerMessage::ClientConnected { client_id, info } => {
                self.audit(AuditEventType::ClientConnected {
                    client_id: client_id.to_string(),
                    role: format!("{:?}", info.role),
                    uid: info.uid,
                });
            }

            ServerMessage::ClientDisconnected { client_id } => {
                debug!(client_id = %client_id, "Client disconnected");
                self.audit(AuditEventType::ClientDisconnected {
                    client_id: client_id.to_string(),
                });
                self.rate_limiter.remove(&client_id);
            }
        }
    }

    fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }
}

/// Wire form of a core event; expiry is reported through `StateChanged`
fn event_payload(event: CoreEvent) -> Option<EventPayload> {
    match event {
        CoreEvent::SessionStarted {
            lock_end_time,
            total_seconds,
        } => Some(EventPayload::SessionStarted {
            lock_end_time,
            total_seconds,
        }),
        CoreEvent::EmergencyUnlocked {
            paused_until,
            used,
            limit,
        } => Some(EventPayload::EmergencyUnlocked {
            paused_until,
            used,
            limit,
        }),
        CoreEvent::ConfigChanged => Some(EventPayload::ConfigChanged),
        CoreEvent::LockExpired { .. } => None,
    }
}
