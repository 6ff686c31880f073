use chrono::Utc;
use clap::Args;
use glucosnap_core::{y_domain, A1cZone, HealthStore, KeyValueStore, TrendWindow};

use super::OutputFormat;

const RECENT_MEALS: usize = 3;

#[derive(Args)]
pub struct DashboardCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Trend window for the HbA1c summary (3m, 6m, 1y, all)
    #[arg(long, short, default_value = "1y")]
    pub window: TrendWindow,
}

impl DashboardCommand {
    pub fn run<S: KeyValueStore>(
        &self,
        store: &HealthStore<S>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let OutputFormat::Json = self.format {
            println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
            return Ok(());
        }

        let settings = store.settings();
        println!("GlucoSnap");
        println!("=========\n");

        println!(
            "Today: {} / {} kcal ({} remaining)",
            store.todays_calorie_intake(),
            settings.calorie_target,
            store.calories_remaining()
        );
        println!();

        match store.latest_a1c() {
            Some(latest) => {
                println!(
                    "Latest HbA1c: {}% on {} [{}]",
                    latest.value,
                    latest.date.format("%Y-%m-%d"),
                    A1cZone::classify(latest.value)
                );
            }
            None => println!("Latest HbA1c: none recorded"),
        }
        println!("Target: < {}%", settings.a1c_target);

        let points = store.chart_readings(self.window, Utc::now());
        if !points.is_empty() {
            let (low, high) = y_domain(&points);
            let values: Vec<String> = points.iter().map(|r| format!("{}", r.value)).collect();
            println!(
                "Trend ({}): {}  (range {}-{}%)",
                self.window,
                values.join(" -> "),
                low,
                high
            );
        }
        println!();

        let meals = store.all_meals();
        if meals.is_empty() {
            println!("Recent meals: none logged");
        } else {
            println!("Recent meals:");
            for meal in meals.iter().take(RECENT_MEALS) {
                println!(
                    "  {}  {} ({} kcal)",
                    meal.date().format("%Y-%m-%d %H:%M"),
                    meal.item_names(", "),
                    meal.total_calories()
                );
            }
        }
        Ok(())
    }
}
