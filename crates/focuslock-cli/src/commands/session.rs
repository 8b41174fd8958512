//! status, watch, start and unlock

use anyhow::{bail, Result};
use focuslock_cli::{confirm_with_retry, confirmation_text, countdown_line, describe_status, DaemonBackend};
use focuslock_config::Settings;
use focuslock_core::{EngineMonitor, FocusBackend, SessionRequest};
use focuslock_util::format_clock_time;
use std::io::Write;
use std::sync::Arc;

pub async fn status(backend: &DaemonBackend) -> Result<()> {
    let status = backend.status().await?;
    println!("{}", describe_status(&status));
    if status.session_in_force {
        println!(
            "Emergency unlocks: {}/{}",
            status.emergency_unlocks_used, status.emergency_unlock_limit
        );
    }
    Ok(())
}

pub async fn watch(backend: DaemonBackend, settings: &Settings) -> Result<()> {
    let limit = backend.status().await?.emergency_unlock_limit;
    let monitor = EngineMonitor::start(Arc::new(backend), settings.monitor, limit);
    let mut updates = monitor.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(status) = updates.borrow_and_update().as_ref() {
                    print!("\r{:<32}", countdown_line(status));
                    std::io::stdout().flush()?;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!();
    monitor.shutdown();
    Ok(())
}

pub async fn start(backend: &DaemonBackend, hours: u32, minutes: u32, yes: bool) -> Result<()> {
    let mut request = SessionRequest::new();
    let duration = request.propose(hours, minutes)?;

    let config = backend.get_config().await?;
    let blocklist = backend.effective_blocklist().await?;
    print!(
        "{}",
        confirmation_text(duration, &config, &blocklist, focuslock_util::now())
    );

    if !yes && !ask("Start now? [y/N] ")? {
        request.cancel()?;
        println!("Cancelled.");
        return Ok(());
    }

    let end = confirm_with_retry(&mut request, backend, |e| {
        if yes {
            return false;
        }
        eprintln!("Could not start the session: {}", e);
        ask("Retry? [y/N] ").unwrap_or(false)
    })
    .await?;
    println!("Locked until {}.", format_clock_time(&end));
    Ok(())
}

pub async fn unlock(backend: &DaemonBackend) -> Result<()> {
    let until = backend.emergency_unlock().await?;
    let status = backend.status().await?;
    println!(
        "Paused until {} (emergency unlocks used: {}/{})",
        format_clock_time(&until),
        status.emergency_unlocks_used,
        status.emergency_unlock_limit
    );
    Ok(())
}

fn ask(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer)? == 0 {
        bail!("No answer on stdin; pass --yes to skip the prompt");
    }
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
