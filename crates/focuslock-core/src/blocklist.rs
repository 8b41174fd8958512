//! Block-list normalization and merging

use focuslock_api::{ConfigSnapshot, EffectiveBlocklist};
use focuslock_util::{FocusError, Result};

use crate::vpn::{VPN_DOMAINS, VPN_EXECUTABLES};

/// Trim an app identifier; empty is rejected
pub fn normalize_app(app: &str) -> Result<String> {
    let app = app.trim();
    if app.is_empty() {
        return Err(FocusError::validation("App name cannot be empty"));
    }
    Ok(app.to_string())
}

/// Reduce user input like `https://www.Example.com/path` to `www.example.com`
pub fn normalize_site(site: &str) -> Result<String> {
    let mut s = site.trim();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = s
            .get(..scheme.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .and_then(|_| s.get(scheme.len()..))
        {
            s = rest;
        }
    }
    let host = s.split(['/', '?', '#']).next().unwrap_or_default();
    let host = host.trim_end_matches('.').to_lowercase();

    if host.is_empty() {
        return Err(FocusError::validation("Site cannot be empty"));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(FocusError::validation(format!("Invalid site: {}", site.trim())));
    }
    Ok(host)
}

/// Case-insensitive membership, since executable names are matched that way
pub fn contains_app(apps: &[String], app: &str) -> bool {
    apps.iter().any(|a| a.eq_ignore_ascii_case(app))
}

/// Add an app if not present; returns whether the list changed
pub fn insert_app(apps: &mut Vec<String>, app: String) -> bool {
    if contains_app(apps, &app) {
        return false;
    }
    apps.push(app);
    apps.sort();
    true
}

/// Add a site if not present; returns whether the list changed
pub fn insert_site(sites: &mut Vec<String>, site: String) -> bool {
    if sites.contains(&site) {
        return false;
    }
    sites.push(site);
    sites.sort();
    true
}

/// Block lists the enforcer should apply right now
pub fn effective_blocklist(config: &ConfigSnapshot) -> EffectiveBlocklist {
    let mut apps = config.blocked_apps.clone();
    let mut sites = config.blocked_sites.clone();

    if config.block_common_vpn {
        for exe in VPN_EXECUTABLES {
            insert_app(&mut apps, exe.to_string());
        }
        for domain in VPN_DOMAINS {
            insert_site(&mut sites, domain.to_string());
        }
    }

    EffectiveBlocklist { apps, sites }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_normalization() {
        assert_eq!(normalize_site("Reddit.com").unwrap(), "reddit.com");
        assert_eq!(
            normalize_site(" https://www.YouTube.com/watch?v=1 ").unwrap(),
            "www.youtube.com"
        );
        assert_eq!(normalize_site("HTTP://news.ycombinator.com/").unwrap(), "news.ycombinator.com");
        assert!(normalize_site("   ").is_err());
        assert!(normalize_site("https://").is_err());
        assert!(normalize_site("not a site").is_err());
    }

    #[test]
    fn app_insert_dedupes_case_insensitively() {
        let mut apps = vec!["steam.exe".to_string()];
        assert!(!insert_app(&mut apps, "Steam.EXE".into()));
        assert!(insert_app(&mut apps, "Discord.exe".into()));
        assert_eq!(apps, vec!["Discord.exe".to_string(), "steam.exe".to_string()]);
    }

    #[test]
    fn vpn_lists_only_when_enabled() {
        let mut config = ConfigSnapshot::default();
        config.blocked_apps = vec!["steam.exe".into()];
        config.blocked_sites = vec!["reddit.com".into()];

        let with_vpn = effective_blocklist(&config);
        assert!(contains_app(&with_vpn.apps, "openvpn.exe"));
        assert!(with_vpn.sites.contains(&"mullvad.net".to_string()));
        assert!(contains_app(&with_vpn.apps, "steam.exe"));

        config.block_common_vpn = false;
        let without = effective_blocklist(&config);
        assert_eq!(without.apps, vec!["steam.exe".to_string()]);
        assert_eq!(without.sites, vec!["reddit.com".to_string()]);
    }
}
