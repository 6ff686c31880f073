mod a1c;
mod config_cmd;
mod dashboard;
mod history;
mod meal;

pub use a1c::A1cCommand;
pub use config_cmd::ConfigCommand;
pub use dashboard::DashboardCommand;
pub use history::HistoryCommand;
pub use meal::MealCommand;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::ValueEnum;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses `YYYY-MM-DD` as local noon, so the calendar day survives the
/// conversion to UTC in every time zone.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format: {}. Use YYYY-MM-DD", s))?;
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| format!("Invalid date: {}", s))?;
    Local
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("Date does not exist in local time: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_keeps_calendar_day() {
        let parsed = parse_date("2025-02-14").unwrap();
        assert_eq!(
            parsed.with_timezone(&Local).date_naive(),
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("14/02/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }
}
