//! DaemonBackend against a live focuslockd

use focuslock_api::EnforcementState;
use focuslock_cli::DaemonBackend;
use focuslock_config::{parse_days, parse_time, Settings};
use focuslock_core::{EngineMonitor, FocusBackend, SessionRequest};
use focuslock_api::Schedule;
use focuslock_util::FocusError;
use focuslockd::Daemon;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

async fn spawn(dir: &std::path::Path) -> (std::path::PathBuf, oneshot::Sender<()>, tokio::task::JoinHandle<anyhow::Result<()>>) {
    let mut settings = Settings::default();
    settings.daemon.socket_path = dir.join("focuslock.sock");
    settings.daemon.data_dir = dir.join("data");
    settings.daemon.tick_interval = Duration::from_millis(20);

    let daemon = Daemon::new(&settings).await.unwrap();
    let socket = daemon.socket_path();
    let (tx, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(daemon.run(async move {
        let _ = rx.await;
    }));
    (socket, tx, task)
}

#[tokio::test]
async fn confirmed_session_locks_and_guards() {
    let dir = tempfile::tempdir().unwrap();
    let (socket, stop, task) = spawn(dir.path()).await;
    let backend = DaemonBackend::connect(&socket).await.unwrap();

    backend.add_blocked_app("steam.exe").await.unwrap();
    backend.add_blocked_sites(vec!["reddit.com".into()]).await.unwrap();

    let mut request = SessionRequest::new();
    request.propose(0, 45).unwrap();
    let end = request.confirm(&backend).await.unwrap();

    let status = backend.status().await.unwrap();
    assert_eq!(status.state, EnforcementState::LockedManual { end_time: end });

    let err = backend.remove_blocked_app("STEAM.EXE").await.unwrap_err();
    assert!(matches!(err, FocusError::SessionActive(_)));
    let err = backend.set_block_common_vpn(false).await.unwrap_err();
    assert!(matches!(err, FocusError::SessionActive(_)));

    // Adding is still allowed
    backend.add_blocked_app("discord.exe").await.unwrap();
    let list = backend.effective_blocklist().await.unwrap();
    assert!(list.apps.iter().any(|a| a == "discord.exe"));

    backend.emergency_unlock().await.unwrap();
    let err = backend.emergency_unlock().await.unwrap_err();
    assert!(err.is_validation());

    let _ = stop.send(());
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn schedules_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (socket, stop, task) = spawn(dir.path()).await;
    let backend = DaemonBackend::connect(&socket).await.unwrap();

    let schedule = Schedule::new(
        "Work",
        parse_days(&["mon", "wed"]).unwrap(),
        parse_time("09:00").unwrap(),
        parse_time("17:00").unwrap(),
    );
    backend.save_schedules(vec![schedule.clone()]).await.unwrap();
    assert_eq!(backend.get_schedules().await.unwrap(), vec![schedule.clone()]);

    // Windows never cross midnight
    let overnight = Schedule::new(
        "Evenings",
        parse_days(&["mon"]).unwrap(),
        parse_time("22:00").unwrap(),
        parse_time("06:00").unwrap(),
    );
    let err = backend
        .save_schedules(vec![schedule.clone(), overnight])
        .await
        .unwrap_err();
    assert!(matches!(err, FocusError::Validation(_)));
    assert_eq!(backend.get_schedules().await.unwrap(), vec![schedule]);

    let health = backend.health().await.unwrap();
    assert!(health.live && health.store_ok);

    let _ = stop.send(());
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn backend_reconnects_after_daemon_restart() {
    let dir = tempfile::tempdir().unwrap();
    let (socket, stop, task) = spawn(dir.path()).await;
    let backend = DaemonBackend::connect(&socket).await.unwrap();
    backend.add_blocked_site("reddit.com").await.unwrap();

    let _ = stop.send(());
    task.await.unwrap().unwrap();

    let (restarted, stop, task) = spawn(dir.path()).await;
    assert_eq!(restarted, socket);

    let config = backend.get_config().await.unwrap();
    assert_eq!(config.blocked_sites, vec!["reddit.com".to_string()]);
    backend.add_blocked_site("youtube.com").await.unwrap();
    assert_eq!(backend.get_config().await.unwrap().blocked_sites.len(), 2);

    let _ = stop.send(());
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn monitor_follows_daemon_state() {
    let dir = tempfile::tempdir().unwrap();
    let (socket, stop, task) = spawn(dir.path()).await;

    let control = DaemonBackend::connect(&socket).await.unwrap();
    let watcher = DaemonBackend::connect(&socket).await.unwrap();

    let mut settings = Settings::default();
    settings.monitor.refresh_interval = Duration::from_millis(20);
    settings.monitor.countdown_interval = Duration::from_millis(20);
    let monitor = EngineMonitor::start(Arc::new(watcher), settings.monitor, 2);
    let mut updates = monitor.subscribe();

    control.start_session(600).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        tokio::time::timeout_at(deadline, updates.changed())
            .await
            .expect("monitor never saw the session")
            .unwrap();
        let locked = updates
            .borrow_and_update()
            .as_ref()
            .is_some_and(|s| matches!(s.state, EnforcementState::LockedManual { .. }));
        if locked {
            break;
        }
    }

    monitor.shutdown();
    let _ = stop.send(());
    task.await.unwrap().unwrap();
}
