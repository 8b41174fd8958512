//! Import, export and health

use anyhow::{Context, Result};
use focuslock_cli::DaemonBackend;
use focuslock_core::FocusBackend;
use std::path::Path;

pub async fn import(backend: &DaemonBackend, file: &Path) -> Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    let summary = backend.import_settings(&data).await?;
    println!(
        "Imported {} app(s), {} site(s), {} schedule(s).",
        summary.apps_added, summary.sites_added, summary.schedules_added
    );
    Ok(())
}

pub async fn export(backend: &DaemonBackend, output: Option<&Path>) -> Result<()> {
    let data = backend.export_settings().await?;
    match output {
        Some(path) => {
            std::fs::write(path, &data).with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Settings written to {}", path.display());
        }
        None => println!("{}", data),
    }
    Ok(())
}

pub async fn health(backend: &DaemonBackend) -> Result<()> {
    let health = backend.health().await?;
    let flag = |ok: bool| if ok { "ok" } else { "FAIL" };
    println!("live:    {}", flag(health.live));
    println!("ready:   {}", flag(health.ready));
    println!("store:   {}", flag(health.store_ok));
    println!("catalog: {}", flag(health.catalog_ok));
    Ok(())
}
