//! Blocked apps, sites, VPN toggle and the app catalog

use anyhow::Result;
use clap::Subcommand;
use focuslock_cli::DaemonBackend;
use focuslock_core::FocusBackend;

#[derive(Subcommand, Debug)]
pub enum AppsAction {
    /// List blocked apps (including VPN clients when enabled)
    List,
    /// Block one or more executables
    Add {
        #[arg(required = true)]
        apps: Vec<String>,
    },
    /// Unblock executables (not allowed during a session)
    Remove {
        #[arg(required = true)]
        apps: Vec<String>,
    },
    /// Replace the blocked app list
    Set { apps: Vec<String> },
}

#[derive(Subcommand, Debug)]
pub enum SitesAction {
    List,
    /// Block one or more sites; URLs are reduced to their host
    Add {
        #[arg(required = true)]
        sites: Vec<String>,
    },
    /// Unblock sites (not allowed during a session)
    Remove {
        #[arg(required = true)]
        sites: Vec<String>,
    },
}

pub async fn apps(backend: &DaemonBackend, action: AppsAction) -> Result<()> {
    match action {
        AppsAction::List => {
            let config = backend.get_config().await?;
            let effective = backend.effective_blocklist().await?;
            for app in &effective.apps {
                let vpn = !config.blocked_apps.iter().any(|a| a.eq_ignore_ascii_case(app));
                println!("{}{}", app, if vpn { "  (vpn)" } else { "" });
            }
        }
        AppsAction::Add { apps } => {
            for app in &apps {
                backend.add_blocked_app(app).await?;
            }
            println!("Blocked {} app(s).", apps.len());
        }
        AppsAction::Remove { apps } => {
            for app in &apps {
                backend.remove_blocked_app(app).await?;
            }
            println!("Unblocked {} app(s).", apps.len());
        }
        AppsAction::Set { apps } => {
            let count = apps.len();
            backend.set_blocked_apps(apps).await?;
            println!("Blocked app list now has {} entries.", count);
        }
    }
    Ok(())
}

pub async fn sites(backend: &DaemonBackend, action: SitesAction) -> Result<()> {
    match action {
        SitesAction::List => {
            for site in backend.get_config().await?.blocked_sites {
                println!("{}", site);
            }
        }
        SitesAction::Add { sites } => {
            backend.add_blocked_sites(sites).await?;
            let config = backend.get_config().await?;
            println!("{} site(s) blocked.", config.blocked_sites.len());
        }
        SitesAction::Remove { sites } => {
            backend.remove_blocked_sites(sites).await?;
            let config = backend.get_config().await?;
            println!("{} site(s) blocked.", config.blocked_sites.len());
        }
    }
    Ok(())
}

pub async fn vpn(backend: &DaemonBackend, enabled: bool) -> Result<()> {
    backend.set_block_common_vpn(enabled).await?;
    println!(
        "Common VPN clients are {}.",
        if enabled { "blocked" } else { "no longer blocked" }
    );
    Ok(())
}

pub async fn catalog(backend: &DaemonBackend, top: bool) -> Result<()> {
    let apps = if top {
        backend.get_top_blocked_apps().await?
    } else {
        backend.get_installed_apps().await?
    };
    if apps.is_empty() {
        println!("(none)");
    }
    for app in apps {
        println!("{:<24} {}", app.name, app.exe);
    }
    Ok(())
}
