use clap::{Args, Subcommand};
use glucosnap_core::{HealthStore, KeyValueStore, MealItem, NewMeal};
use std::path::PathBuf;

use super::OutputFormat;
use crate::analysis::analyzer_from_config;
use crate::config::Config;
use crate::photo::EncodedPhoto;

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Estimate the items in a meal photo
    Analyze {
        /// Path to a JPEG, PNG, WebP or HEIC photo
        photo: PathBuf,

        /// Log the meal after review
        #[arg(long)]
        save: bool,

        /// Drop item N (1-based) from the estimate before saving (can be repeated)
        #[arg(long = "drop", value_name = "N")]
        drop: Vec<usize>,
    },

    /// Log a meal from items entered by hand
    Add {
        /// Item as NAME:CALORIES[:PROTEIN[:CARBS[:FAT]]] (can be repeated)
        #[arg(long = "item", value_name = "ITEM", required = true)]
        items: Vec<String>,

        /// Attach a photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// List logged meals, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Maximum number of meals to show
        #[arg(long, short)]
        limit: Option<usize>,
    },
}

impl MealCommand {
    pub async fn run<S: KeyValueStore>(
        &self,
        store: &mut HealthStore<S>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Analyze { photo, save, drop } => {
                self.analyze(photo, *save, drop, store, config).await
            }
            MealSubcommand::Add { items, photo } => {
                let items = items
                    .iter()
                    .map(|s| parse_item(s))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut meal = NewMeal::new(items);
                if let Some(path) = photo {
                    meal = meal.with_photo(EncodedPhoto::read(path).await?.data_url());
                }

                let saved = store.add_meal(meal).await?;
                println!("Logged meal {}", saved.id());
                println!("{}", saved);
                Ok(())
            }
            MealSubcommand::List { format, limit } => {
                let mut meals = store.all_meals();
                if let Some(limit) = limit {
                    meals.truncate(*limit);
                }
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&meals)?);
                    }
                    OutputFormat::Text => {
                        if meals.is_empty() {
                            println!("No meals logged.");
                        }
                        for meal in &meals {
                            println!("{}\n", meal);
                        }
                    }
                }
                Ok(())
            }
        }
    }

    async fn analyze<S: KeyValueStore>(
        &self,
        path: &std::path::Path,
        save: bool,
        drop: &[usize],
        store: &mut HealthStore<S>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let analyzer = analyzer_from_config(&config.analysis)?;
        let photo = EncodedPhoto::read(path).await?;

        println!("Analyzing meal...");
        let items = analyzer
            .analyze(&photo.base64, photo.mime_type)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "meal analysis failed");
                format!("Failed to analyze meal. Please try again. ({})", e)
            })?;

        let mut draft = NewMeal::new(items).with_photo(photo.data_url());
        drop_items(&mut draft, drop)?;

        if draft.items.is_empty() {
            println!("No food items identified.");
            return Ok(());
        }

        println!("Estimated items:");
        for (i, item) in draft.items.iter().enumerate() {
            println!(
                "  {}. {}: {} kcal, {}g protein, {}g carbs, {}g fat",
                i + 1,
                item.name,
                item.calories,
                item.protein,
                item.carbs,
                item.fat
            );
        }

        if save {
            let saved = store.add_meal(draft).await?;
            println!(
                "Logged meal {} ({} kcal)",
                saved.id(),
                saved.total_calories()
            );
        } else {
            println!("\nRe-run with --save to log this meal.");
        }
        Ok(())
    }
}

/// Removes 1-based positions from the draft, highest first so earlier
/// removals do not shift later ones.
fn drop_items(draft: &mut NewMeal, positions: &[usize]) -> Result<(), String> {
    let mut positions = positions.to_vec();
    positions.sort_unstable();
    positions.dedup();
    for &pos in positions.iter().rev() {
        pos.checked_sub(1)
            .and_then(|index| draft.remove_item(index))
            .ok_or_else(|| format!("No item {} to drop", pos))?;
    }
    Ok(())
}

/// Parses `NAME:CALORIES[:PROTEIN[:CARBS[:FAT]]]`; missing macros are zero.
fn parse_item(s: &str) -> Result<MealItem, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 5 {
        return Err(format!(
            "Invalid item '{}'. Use NAME:CALORIES[:PROTEIN[:CARBS[:FAT]]]",
            s
        ));
    }
    if parts[0].is_empty() {
        return Err(format!("Item name is empty in '{}'", s));
    }

    let number = |i: usize| -> Result<f64, String> {
        match parts.get(i) {
            None => Ok(0.0),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| format!("Invalid number '{}' in item '{}'", raw, s)),
        }
    };

    Ok(MealItem::new(
        parts[0],
        number(1)?,
        number(2)?,
        number(3)?,
        number(4)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_full() {
        let item = parse_item("Grilled Salmon:367:39:0:22").unwrap();
        assert_eq!(item, MealItem::new("Grilled Salmon", 367.0, 39.0, 0.0, 22.0));
    }

    #[test]
    fn test_parse_item_defaults_missing_macros() {
        let item = parse_item("Apple:95").unwrap();
        assert_eq!(item.calories, 95.0);
        assert_eq!(item.protein, 0.0);
        assert_eq!(item.fat, 0.0);
    }

    #[test]
    fn test_parse_item_rejects_bad_input() {
        assert!(parse_item("Apple").is_err());
        assert!(parse_item(":95").is_err());
        assert!(parse_item("Apple:lots").is_err());
        assert!(parse_item("Apple:-5").is_err());
        assert!(parse_item("a:1:2:3:4:5").is_err());
    }

    #[test]
    fn test_drop_items_uses_one_based_positions() {
        let mut draft = NewMeal::new(vec![
            MealItem::new("A", 1.0, 0.0, 0.0, 0.0),
            MealItem::new("B", 2.0, 0.0, 0.0, 0.0),
            MealItem::new("C", 3.0, 0.0, 0.0, 0.0),
        ]);
        drop_items(&mut draft, &[1, 3, 3]).unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].name, "B");
    }

    #[test]
    fn test_drop_items_rejects_out_of_range() {
        let mut draft = NewMeal::new(vec![MealItem::new("A", 1.0, 0.0, 0.0, 0.0)]);
        assert!(drop_items(&mut draft, &[0]).is_err());
        assert!(drop_items(&mut draft, &[2]).is_err());
        assert_eq!(draft.items.len(), 1);
    }
}
