use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{A1cReading, Meal};

/// One row of the combined history timeline.
///
/// Serializes as the record's own fields plus a `type` tag of `"a1c"` or
/// `"meal"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum HistoryEntry {
    #[serde(rename = "a1c")]
    A1c(A1cReading),
    #[serde(rename = "meal")]
    Meal(Meal),
}

impl HistoryEntry {
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            HistoryEntry::A1c(reading) => reading.date,
            HistoryEntry::Meal(meal) => meal.date(),
        }
    }
}

/// Merges both collections into a single newest-first timeline.
///
/// Entries with the same timestamp keep meals ahead of readings.
pub fn combined_history(readings: &[A1cReading], meals: &[Meal]) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = meals
        .iter()
        .cloned()
        .map(HistoryEntry::Meal)
        .chain(readings.iter().cloned().map(HistoryEntry::A1c))
        .collect();
    entries.sort_by(|a, b| b.date().cmp(&a.date()));
    entries
}
