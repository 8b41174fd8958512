//! Weekly schedules

use anyhow::{bail, Result};
use clap::Subcommand;
use focuslock_api::Schedule;
use focuslock_cli::{format_schedule, DaemonBackend};
use focuslock_config::{parse_days, parse_time};
use focuslock_core::FocusBackend;

#[derive(Subcommand, Debug)]
pub enum ScheduleAction {
    List,
    /// Add an enabled schedule
    Add {
        #[arg(long)]
        name: String,
        /// Comma-separated days, e.g. mon,tue,wed
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<String>,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM; earlier than start means the window ends the next day
        #[arg(long)]
        end: String,
    },
    /// Delete a schedule (not allowed for enabled schedules during a session)
    Remove { id: String },
    Enable { id: String },
    /// Disable a schedule (not allowed during a session)
    Disable { id: String },
}

pub async fn run(backend: &DaemonBackend, action: ScheduleAction) -> Result<()> {
    let mut schedules = backend.get_schedules().await?;

    match action {
        ScheduleAction::List => {
            if schedules.is_empty() {
                println!("(no schedules)");
            }
            for schedule in &schedules {
                println!("{}", format_schedule(schedule));
            }
            return Ok(());
        }
        ScheduleAction::Add {
            name,
            days,
            start,
            end,
        } => {
            let schedule = Schedule::new(name, parse_days(&days)?, parse_time(&start)?, parse_time(&end)?);
            println!("Added {}", format_schedule(&schedule));
            schedules.push(schedule);
        }
        ScheduleAction::Remove { id } => {
            let before = schedules.len();
            schedules.retain(|s| s.id.as_str() != id);
            if schedules.len() == before {
                bail!("No schedule with id {}", id);
            }
        }
        ScheduleAction::Enable { id } => set_enabled(&mut schedules, &id, true)?,
        ScheduleAction::Disable { id } => set_enabled(&mut schedules, &id, false)?,
    }

    backend.save_schedules(schedules).await?;
    Ok(())
}

fn set_enabled(schedules: &mut [Schedule], id: &str, enabled: bool) -> Result<()> {
    match schedules.iter_mut().find(|s| s.id.as_str() == id) {
        Some(schedule) => {
            schedule.enabled = enabled;
            Ok(())
        }
        None => bail!("No schedule with id {}", id),
    }
}
