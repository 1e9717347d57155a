// Dashboard page commands typed at the prompt
use crate::domain::activity::{Granularity, ParseGranularityError};
use crate::domain::device::DeviceKey;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  r                                   refresh now
  g <minute|hour|day|month>           change activity granularity
  range <YYYY-MM-DD> <HH:MM> <YYYY-MM-DD> <HH:MM>
                                      update the date range and reload
  d <username> <device_id>            open device statistics
  logout                              sign out
  q                                   quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    Refresh,
    Granularity(Granularity),
    Range {
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    },
    OpenDevice(DeviceKey),
    Logout,
    Quit,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Granularity(#[from] ParseGranularityError),
    #[error("Invalid date or time '{0}'")]
    DateTime(String),
}

/// Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<DashboardCommand>, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (name, args) {
        ("r" | "refresh", []) => DashboardCommand::Refresh,
        ("g" | "granularity", [value]) => DashboardCommand::Granularity(value.parse()?),
        ("g" | "granularity", _) => return Err(CommandError::Usage("g <minute|hour|day|month>")),
        ("range", [start_date, start_time, end_date, end_time]) => DashboardCommand::Range {
            start_date: date(start_date)?,
            start_time: time(start_time)?,
            end_date: date(end_date)?,
            end_time: time(end_time)?,
        },
        ("range", _) => {
            return Err(CommandError::Usage(
                "range <YYYY-MM-DD> <HH:MM> <YYYY-MM-DD> <HH:MM>",
            ))
        }
        ("d" | "device", [username, device_id]) => {
            DashboardCommand::OpenDevice(DeviceKey::new(*username, *device_id))
        }
        ("d" | "device", _) => return Err(CommandError::Usage("d <username> <device_id>")),
        ("logout", []) => DashboardCommand::Logout,
        ("q" | "quit", []) => DashboardCommand::Quit,
        ("h" | "help" | "?", _) => DashboardCommand::Help,
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };

    Ok(Some(command))
}

fn date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| CommandError::DateTime(raw.to_string()))
}

fn time(raw: &str) -> Result<NaiveTime, CommandError> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| CommandError::DateTime(raw.to_string()))
}
