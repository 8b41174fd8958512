//! Configuration and schedule validation

use crate::schema::RawConfig;
use focuslock_api::Schedule;
use focuslock_util::{DayTag, WallClock};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Catalog entry '{exe}': {message}")]
    CatalogError { exe: String, message: String },

    #[error("Duplicate catalog executable: {0}")]
    DuplicateCatalogExe(String),

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("Schedule '{schedule}': {message}")]
    ScheduleError { schedule: String, message: String },

    #[error("Duplicate schedule ID: {0}")]
    DuplicateScheduleId(String),

    #[error("Invalid time format '{value}': {message}")]
    InvalidTimeFormat { value: String, message: String },

    #[error("Invalid day specification: {0}")]
    InvalidDaySpec(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let intervals = [
        ("daemon.tick_interval_ms", config.daemon.tick_interval_ms),
        ("session.pause_seconds", config.session.pause_seconds),
        ("monitor.refresh_interval_ms", config.monitor.refresh_interval_ms),
        ("monitor.countdown_interval_ms", config.monitor.countdown_interval_ms),
    ];
    for (field, value) in intervals {
        if value == Some(0) {
            errors.push(ValidationError::ZeroInterval { field });
        }
    }

    let mut seen_exes = HashSet::new();
    for entry in &config.catalog {
        if entry.exe.trim().is_empty() {
            errors.push(ValidationError::CatalogError {
                exe: entry.exe.clone(),
                message: "exe cannot be empty".into(),
            });
            continue;
        }
        if !seen_exes.insert(entry.exe.to_lowercase()) {
            errors.push(ValidationError::DuplicateCatalogExe(entry.exe.clone()));
        }
    }

    errors
}

/// Validate a single schedule's own invariants
pub fn validate_schedule(schedule: &Schedule) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let label = if schedule.name.trim().is_empty() {
        schedule.id.to_string()
    } else {
        schedule.name.clone()
    };

    if schedule.id.as_str().is_empty() {
        errors.push(ValidationError::ScheduleError {
            schedule: label.clone(),
            message: "id cannot be empty".into(),
        });
    }
    if schedule.name.trim().is_empty() {
        errors.push(ValidationError::ScheduleError {
            schedule: label.clone(),
            message: "name cannot be empty".into(),
        });
    }
    if schedule.days.is_empty() {
        errors.push(ValidationError::ScheduleError {
            schedule: label.clone(),
            message: "at least one day must be selected".into(),
        });
    }
    if schedule.start_time >= schedule.end_time {
        errors.push(ValidationError::ScheduleError {
            schedule: label,
            message: format!(
                "start time {} must be before end time {}",
                schedule.start_time, schedule.end_time
            ),
        });
    }

    errors
}

/// Validate a full schedule list, including id uniqueness
pub fn validate_schedules(schedules: &[Schedule]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_ids = HashSet::new();
    for schedule in schedules {
        if !seen_ids.insert(&schedule.id) {
            errors.push(ValidationError::DuplicateScheduleId(schedule.id.to_string()));
        }
    }

    for schedule in schedules {
        errors.extend(validate_schedule(schedule));
    }

    errors
}

/// Parse HH:MM time format
pub fn parse_time(s: &str) -> Result<WallClock, ValidationError> {
    WallClock::parse(s.trim()).map_err(|message| ValidationError::InvalidTimeFormat {
        value: s.to_string(),
        message,
    })
}

/// Parse a list of day names into calendar-ordered tags without duplicates
pub fn parse_days<S: AsRef<str>>(days: &[S]) -> Result<Vec<DayTag>, ValidationError> {
    let mut tags = Vec::new();
    for day in days {
        let tag: DayTag = day
            .as_ref()
            .parse()
            .map_err(ValidationError::InvalidDaySpec)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags.sort();
    Ok(tags)
}
