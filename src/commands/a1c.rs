use chrono::Utc;
use clap::{Args, Subcommand};
use glucosnap_core::{y_domain, A1cZone, HealthStore, KeyValueStore, NewA1cReading, TrendWindow};

use super::{parse_date, OutputFormat};

#[derive(Args)]
pub struct A1cCommand {
    #[command(subcommand)]
    pub command: A1cSubcommand,
}

#[derive(Subcommand)]
pub enum A1cSubcommand {
    /// Record an HbA1c lab result
    Add {
        /// Result in percent (3.0 - 25.0)
        value: f64,

        /// Date of the test (YYYY-MM-DD), defaults to now
        #[arg(long, short)]
        date: Option<String>,

        /// Free-text notes
        #[arg(long, short)]
        notes: Option<String>,
    },

    /// List readings inside a trend window
    List {
        /// Trend window (3m, 6m, 1y, all)
        #[arg(long, short, default_value = "1y")]
        window: TrendWindow,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl A1cCommand {
    pub async fn run<S: KeyValueStore>(
        &self,
        store: &mut HealthStore<S>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            A1cSubcommand::Add { value, date, notes } => {
                let date = match date {
                    Some(d) => parse_date(d)?,
                    None => Utc::now(),
                };
                let mut reading = NewA1cReading::new(*value, date);
                if let Some(notes) = notes {
                    reading = reading.with_notes(notes.as_str());
                }

                let saved = store.add_a1c_reading(reading).await?;
                println!("Recorded HbA1c {}", saved);
                println!("  Zone: {}", A1cZone::classify(saved.value));
                println!("  ID: {}", saved.id);
                Ok(())
            }
            A1cSubcommand::List { window, format } => {
                let points = store.chart_readings(*window, Utc::now());
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&points)?);
                    }
                    OutputFormat::Text => {
                        if points.is_empty() {
                            println!("No HbA1c readings in the last {}.", window);
                            return Ok(());
                        }
                        let (low, high) = y_domain(&points);
                        println!("HbA1c readings ({}), chart range {}-{}%", window, low, high);
                        println!("{}", "-".repeat(40));
                        for reading in points.iter().rev() {
                            println!("{}  [{}]", reading, A1cZone::classify(reading.value));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
