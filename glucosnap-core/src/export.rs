//! Comma-separated export of the combined history.

use chrono::TimeZone;

use crate::models::HistoryEntry;

pub const CSV_HEADER: &str = "Type,Date,Value,Units,Items,Calories,Protein(g),Carbs(g),Fat(g),Notes";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders `entries` as CSV with CRLF line endings, one row per entry in the
/// order given. Dates are shown in `tz`.
pub fn history_to_csv<Tz>(entries: &[HistoryEntry], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut csv = String::with_capacity(64 * (entries.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push_str("\r\n");

    for entry in entries {
        let date = entry.date().with_timezone(tz).format(DATE_FORMAT).to_string();
        let row = match entry {
            HistoryEntry::A1c(reading) => [
                "A1c".to_string(),
                date,
                reading.value.to_string(),
                "%".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                quote(reading.notes.as_deref().unwrap_or("")),
            ],
            HistoryEntry::Meal(meal) => {
                let totals = meal.totals();
                [
                    "Meal".to_string(),
                    date,
                    String::new(),
                    String::new(),
                    quote(&meal.item_names("; ")),
                    totals.total_calories.to_string(),
                    totals.total_protein.to_string(),
                    totals.total_carbs.to_string(),
                    totals.total_fat.to_string(),
                    quote(""),
                ]
            }
        };
        csv.push_str(&row.join(","));
        csv.push_str("\r\n");
    }

    csv
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
