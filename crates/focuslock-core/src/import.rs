//! Settings import and export
//!
//! The shareable document format is
//! `{ "blocked": { "apps": [..], "sites": [..] }, "schedules": [{ "name",
//! "activeDays", "startTime", "endTime" }] }`. Schedule ids and enabled flags
//! are not part of it.

use focuslock_api::{AppInfo, ConfigSnapshot, ImportSummary, Schedule};
use focuslock_config::{exe_stem, parse_days, parse_time, validate_schedule};
use focuslock_util::{FocusError, Result};
use serde::{Deserialize, Serialize};

use crate::blocklist::{insert_app, insert_site, normalize_site};

/// Exported settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default)]
    pub blocked: BlockedItems,
    #[serde(default)]
    pub schedules: Vec<DocumentSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedItems {
    #[serde(default)]
    pub apps: Vec<String>,
    #[serde(default)]
    pub sites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSchedule {
    pub name: String,
    pub active_days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
}

impl SettingsDocument {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FocusError::import(format!("invalid JSON format: {}", e)))
    }

    pub fn from_config(config: &ConfigSnapshot) -> Self {
        Self {
            blocked: BlockedItems {
                apps: config.blocked_apps.clone(),
                sites: config.blocked_sites.clone(),
            },
            schedules: config
                .schedules
                .iter()
                .map(|s| DocumentSchedule {
                    name: s.name.clone(),
                    active_days: s.days.iter().map(|d| d.to_string()).collect(),
                    start_time: s.start_time.to_string(),
                    end_time: s.end_time.to_string(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FocusError::internal(format!("failed to export settings: {}", e)))
    }
}

/// Match an imported app name against the catalog.
///
/// Tries, in order: exact executable, exact display name, the input as a
/// substring of a name or executable, then executable stems overlapping the
/// input. Unmatched names are kept as typed.
pub fn resolve_app_name(input: &str, installed: &[AppInfo]) -> String {
    let trimmed = input.trim();
    let needle = trimmed.to_lowercase();
    if needle.is_empty() {
        return trimmed.to_string();
    }

    if let Some(app) = installed.iter().find(|a| a.exe.eq_ignore_ascii_case(trimmed)) {
        return app.exe.clone();
    }

    if let Some(app) = installed.iter().find(|a| a.name.to_lowercase() == needle) {
        return app.exe.clone();
    }

    if let Some(app) = installed.iter().find(|a| {
        a.name.to_lowercase().contains(&needle) || a.exe.to_lowercase().contains(&needle)
    }) {
        return app.exe.clone();
    }

    if let Some(app) = installed.iter().find(|a| {
        let stem = exe_stem(&a.exe).to_lowercase();
        !stem.is_empty() && (needle.contains(&stem) || stem.contains(&needle))
    }) {
        return app.exe.clone();
    }

    trimmed.to_string()
}

/// Merge a document into `config`.
///
/// Everything is validated before `config` is touched; on error it is left
/// unchanged.
pub fn merge_document(
    config: &mut ConfigSnapshot,
    document: SettingsDocument,
    installed: &[AppInfo],
) -> Result<ImportSummary> {
    let mut schedules = Vec::with_capacity(document.schedules.len());
    for imported in &document.schedules {
        schedules.push(convert_schedule(imported)?);
    }

    let mut sites = Vec::with_capacity(document.blocked.sites.len());
    for site in &document.blocked.sites {
        sites.push(normalize_site(site).map_err(|e| FocusError::import(e.to_string()))?);
    }

    let mut summary = ImportSummary::default();

    for app in &document.blocked.apps {
        let resolved = resolve_app_name(app, installed);
        if resolved.is_empty() {
            continue;
        }
        if insert_app(&mut config.blocked_apps, resolved) {
            summary.apps_added += 1;
        }
    }

    for site in sites {
        if insert_site(&mut config.blocked_sites, site) {
            summary.sites_added += 1;
        }
    }

    summary.schedules_added = schedules.len();
    config.schedules.extend(schedules);

    Ok(summary)
}

fn convert_schedule(imported: &DocumentSchedule) -> Result<Schedule> {
    let import_err = |e: &dyn std::fmt::Display| {
        FocusError::import(format!("schedule '{}': {}", imported.name, e))
    };

    let days = parse_days(imported.active_days.as_slice()).map_err(|e| import_err(&e))?;
    let start = parse_time(&imported.start_time).map_err(|e| import_err(&e))?;
    let end = parse_time(&imported.end_time).map_err(|e| import_err(&e))?;

    let schedule = Schedule::new(imported.name.trim(), days, start, end);
    if let Some(err) = validate_schedule(&schedule).into_iter().next() {
        return Err(FocusError::import(err.to_string()));
    }
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use focuslock_util::DayTag;

    fn catalog() -> Vec<AppInfo> {
        vec![
            AppInfo {
                name: "WhatsApp".into(),
                exe: "WhatsApp.exe".into(),
                icon: None,
            },
            AppInfo {
                name: "Steam Client".into(),
                exe: "steam.exe".into(),
                icon: None,
            },
            AppInfo {
                name: "Discord".into(),
                exe: "Discord.exe".into(),
                icon: None,
            },
        ]
    }

    #[test]
    fn fuzzy_resolution_order() {
        let apps = catalog();
        assert_eq!(resolve_app_name("whatsapp.EXE", &apps), "WhatsApp.exe");
        assert_eq!(resolve_app_name("discord", &apps), "Discord.exe");
        assert_eq!(resolve_app_name("steam cl", &apps), "steam.exe");
        assert_eq!(resolve_app_name("steamwebhelper", &apps), "steam.exe");
        assert_eq!(resolve_app_name("notepad.exe", &apps), "notepad.exe");
    }

    #[test]
    fn merge_dedupes_and_sorts() {
        let mut config = ConfigSnapshot::default();
        config.blocked_apps = vec!["Discord.exe".into()];
        config.blocked_sites = vec!["reddit.com".into()];

        let doc = SettingsDocument::parse(
            r#"{
                "blocked": {
                    "apps": ["discord", "WhatsApp", "whatsapp"],
                    "sites": ["reddit.com", "Twitter.com"]
                },
                "schedules": [
                    {"name": "Work", "activeDays": ["Mon", "Fri"], "startTime": "09:00", "endTime": "17:00"}
                ]
            }"#,
        )
        .unwrap();

        let summary = merge_document(&mut config, doc, &catalog()).unwrap();
        assert_eq!(summary.apps_added, 1);
        assert_eq!(summary.sites_added, 1);
        assert_eq!(summary.schedules_added, 1);

        assert_eq!(
            config.blocked_apps,
            vec!["Discord.exe".to_string(), "WhatsApp.exe".to_string()]
        );
        assert_eq!(
            config.blocked_sites,
            vec!["reddit.com".to_string(), "twitter.com".to_string()]
        );
        let schedule = &config.schedules[0];
        assert!(schedule.enabled);
        assert_eq!(schedule.days, vec![DayTag::Mon, DayTag::Fri]);
        assert!(!schedule.id.as_str().is_empty());
    }

    #[test]
    fn invalid_schedule_leaves_config_untouched() {
        let mut config = ConfigSnapshot::default();
        let doc = SettingsDocument::parse(
            r#"{
                "blocked": {"apps": ["steam"]},
                "schedules": [
                    {"name": "Night", "activeDays": ["Mon"], "startTime": "22:00", "endTime": "06:00"}
                ]
            }"#,
        )
        .unwrap();

        let err = merge_document(&mut config, doc, &catalog()).unwrap_err();
        assert!(matches!(err, FocusError::ImportError(_)));
        assert!(config.blocked_apps.is_empty());
        assert!(config.schedules.is_empty());
    }

    #[test]
    fn malformed_json_is_import_error() {
        assert!(matches!(
            SettingsDocument::parse("{not json"),
            Err(FocusError::ImportError(_))
        ));
    }

    #[test]
    fn export_uses_document_field_names() {
        let mut config = ConfigSnapshot::default();
        config.blocked_apps = vec!["steam.exe".into()];
        config.schedules.push(Schedule::new(
            "Study",
            vec![DayTag::Tue],
            parse_time("18:00").unwrap(),
            parse_time("20:00").unwrap(),
        ));

        let json = SettingsDocument::from_config(&config).to_json().unwrap();
        assert!(json.contains("\"activeDays\""));
        assert!(json.contains("\"startTime\": \"18:00\""));
        assert!(!json.contains("\"id\""));

        // Exported text imports cleanly into a fresh config
        let mut fresh = ConfigSnapshot::default();
        let summary = merge_document(&mut fresh, SettingsDocument::parse(&json).unwrap(), &[]).unwrap();
        assert_eq!(summary.schedules_added, 1);
        assert_eq!(fresh.blocked_apps, vec!["steam.exe".to_string()]);
    }
}
