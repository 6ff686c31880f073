use chrono::Local;
use clap::Args;
use glucosnap_core::{history_to_csv, HealthStore, HistoryEntry, KeyValueStore};
use std::path::PathBuf;

use super::OutputFormat;

#[derive(Args)]
pub struct HistoryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the history as CSV to this path instead of printing it
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

impl HistoryCommand {
    pub async fn run<S: KeyValueStore>(
        &self,
        store: &HealthStore<S>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let entries = store.history();

        if let Some(path) = &self.csv {
            let csv = history_to_csv(&entries, &Local);
            tokio::fs::write(path, csv)
                .await
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!("Exported {} entries to {}", entries.len(), path.display());
            return Ok(());
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                if entries.is_empty() {
                    println!("No history yet.");
                }
                for entry in &entries {
                    println!("{}", history_line(entry));
                }
            }
        }
        Ok(())
    }
}

fn history_line(entry: &HistoryEntry) -> String {
    let date = entry.date().with_timezone(&Local).format("%Y-%m-%d %H:%M");
    match entry {
        HistoryEntry::A1c(reading) => {
            let mut line = format!("{}  A1c   {}%", date, reading.value);
            if let Some(notes) = &reading.notes {
                line.push_str(&format!("  {}", notes));
            }
            line
        }
        HistoryEntry::Meal(meal) => format!(
            "{}  Meal  {} kcal  {}",
            date,
            meal.total_calories(),
            meal.item_names(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use glucosnap_core::{Meal, MealItem, NewMeal, RecordId};

    #[test]
    fn test_meal_line_lists_items() {
        let meal = Meal::new(
            RecordId::from("m1"),
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            NewMeal::new(vec![
                MealItem::new("Toast", 80.0, 3.0, 15.0, 1.0),
                MealItem::new("Egg", 70.0, 6.0, 0.0, 5.0),
            ]),
        );
        let line = history_line(&HistoryEntry::Meal(meal));
        assert!(line.contains("Meal  150 kcal  Toast, Egg"));
    }
}
