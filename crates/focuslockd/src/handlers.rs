//! Command dispatch

use focuslock_api::{
    ClientInfo, Command, ErrorCode, ErrorInfo, Response, ResponsePayload,
};
use focuslock_core::FocusService;
use focuslock_util::FocusError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Execute one client command against the service
pub async fn handle_command(
    service: &Mutex<FocusService>,
    client: &ClientInfo,
    request_id: u64,
    command: Command,
) -> Response {
    if command.is_mutation() && !client.role.can_modify() {
        warn!(client_id = %client.client_id, role = ?client.role, "Mutation refused");
        return denied(request_id, "This client may not change focus settings");
    }
    if matches!(command, Command::RecordKill { .. }) && !client.role.can_report() {
        return denied(request_id, "This client may not report enforcement events");
    }

    debug!(client_id = %client.client_id, request_id, command = ?command, "Handling command");

    let now = focuslock_util::now();
    let mut service = service.lock().await;

    match command {
        Command::GetState => {
            Response::success(request_id, ResponsePayload::State(service.status(now)))
        }

        Command::GetConfig => {
            Response::success(request_id, ResponsePayload::Config(service.config().clone()))
        }

        Command::StartSession { total_seconds } => respond(
            request_id,
            service.start_session(total_seconds, now),
            |lock_end_time| ResponsePayload::SessionStarted { lock_end_time },
        ),

        Command::EmergencyUnlock => match service.emergency_unlock(now) {
            Ok(until) => Response::success(
                request_id,
                ResponsePayload::Paused {
                    until,
                    used: service.config().emergency_unlocks_used,
                    limit: service.policy().emergency_unlock_limit,
                },
            ),
            Err(e) => failure(request_id, &e),
        },

        Command::AddBlockedApp { app } => {
            let result = service.add_blocked_app(&app);
            with_config(request_id, result, &service)
        }

        Command::RemoveBlockedApp { app } => {
            let result = service.remove_blocked_app(&app, now);
            with_config(request_id, result, &service)
        }

        Command::SetBlockedApps { apps } => {
            let result = service.set_blocked_apps(apps, now);
            with_config(request_id, result, &service)
        }

        Command::AddBlockedSite { site } => {
            let result = service.add_blocked_site(&site);
            with_config(request_id, result, &service)
        }

        Command::RemoveBlockedSite { site } => {
            let result = service.remove_blocked_site(&site, now);
            with_config(request_id, result, &service)
        }

        Command::AddBlockedSites { sites } => {
            let result = service.add_blocked_sites(sites);
            with_config(request_id, result, &service)
        }

        Command::RemoveBlockedSites { sites } => {
            let result = service.remove_blocked_sites(sites, now);
            with_config(request_id, result, &service)
        }

        Command::SetBlockCommonVpn { enabled } => {
            let result = service.set_block_common_vpn(enabled, now);
            with_config(request_id, result, &service)
        }

        Command::GetSchedules => Response::success(
            request_id,
            ResponsePayload::Schedules {
                schedules: service.schedules(),
            },
        ),

        Command::SaveSchedules { schedules } => match service.save_schedules(schedules, now) {
            Ok(()) => Response::success(
                request_id,
                ResponsePayload::Schedules {
                    schedules: service.schedules(),
                },
            ),
            Err(e) => failure(request_id, &e),
        },

        Command::GetInstalledApps => respond(request_id, service.installed_apps().await, |apps| {
            ResponsePayload::Apps { apps }
        }),

        Command::GetTopBlockedApps => {
            respond(request_id, service.top_blocked_apps().await, |apps| {
                ResponsePayload::Apps { apps }
            })
        }

        Command::ImportSettings { data } => respond(
            request_id,
            service.import_settings(&data).await,
            ResponsePayload::Imported,
        ),

        Command::ExportSettings => respond(request_id, service.export_settings(), |data| {
            ResponsePayload::Exported { data }
        }),

        Command::GetEffectiveBlocklist => Response::success(
            request_id,
            ResponsePayload::Blocklist(service.effective_blocklist()),
        ),

        Command::RecordKill { app } => respond(request_id, service.record_kill(&app), |()| {
            ResponsePayload::KillRecorded
        }),

        // The IPC layer flips the subscription flag; just acknowledge here
        Command::SubscribeEvents => Response::success(
            request_id,
            ResponsePayload::Subscribed {
                client_id: client.client_id.clone(),
            },
        ),

        Command::UnsubscribeEvents => Response::success(request_id, ResponsePayload::Unsubscribed),

        Command::GetHealth => Response::success(request_id, ResponsePayload::Health(service.health())),

        Command::Ping => Response::success(request_id, ResponsePayload::Pong),
    }
}

fn respond<T>(
    request_id: u64,
    result: Result<T, FocusError>,
    payload: impl FnOnce(T) -> ResponsePayload,
) -> Response {
    match result {
        Ok(value) => Response::success(request_id, payload(value)),
        Err(e) => failure(request_id, &e),
    }
}

/// Block-list edits answer with the updated snapshot
fn with_config(request_id: u64, result: Result<(), FocusError>, service: &FocusService) -> Response {
    respond(request_id, result, |()| {
        ResponsePayload::Config(service.config().clone())
    })
}

fn failure(request_id: u64, err: &FocusError) -> Response {
    debug!(request_id, error = %err, "Command failed");
    Response::error(request_id, ErrorInfo::from(err))
}

fn denied(request_id: u64, message: &str) -> Response {
    Response::error(request_id, ErrorInfo::new(ErrorCode::PermissionDenied, message))
}
