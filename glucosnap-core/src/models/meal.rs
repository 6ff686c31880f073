use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::RecordId;

/// One food item in a meal, as estimated by the analysis service or typed in
/// by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    /// kcal
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub calories: f64,
    /// grams
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub protein: f64,
    /// grams
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub carbs: f64,
    /// grams
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub fat: f64,
}

impl MealItem {
    pub fn new(name: impl Into<String>, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            name: name.into(),
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Replaces every non-finite quantity with zero.
    fn into_finite(self) -> Self {
        Self {
            name: self.name,
            calories: finite_or_zero(self.calories),
            protein: finite_or_zero(self.protein),
            carbs: finite_or_zero(self.carbs),
            fat: finite_or_zero(self.fat),
        }
    }
}

fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Missing, null or non-numeric quantities count as zero.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Quantity::deserialize(deserializer)? {
        Quantity::Number(n) => n,
        Quantity::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Quantity::Other(_) => 0.0,
    };
    Ok(finite_or_zero(amount))
}

/// Nutrition totals summed over a meal's items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTotals {
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub total_calories: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub total_protein: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub total_carbs: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub total_fat: f64,
}

impl MealTotals {
    /// Non-finite item quantities count as zero.
    pub fn from_items(items: &[MealItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            total_calories: acc.total_calories + finite_or_zero(item.calories),
            total_protein: acc.total_protein + finite_or_zero(item.protein),
            total_carbs: acc.total_carbs + finite_or_zero(item.carbs),
            total_fat: acc.total_fat + finite_or_zero(item.fat),
        })
    }
}

/// Input for logging a meal. Items stay editable until the meal is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMeal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub items: Vec<MealItem>,
}

impl NewMeal {
    pub fn new(items: Vec<MealItem>) -> Self {
        Self { photo: None, items }
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    /// Removes the item at `index`, returning it if the index was valid.
    pub fn remove_item(&mut self, index: usize) -> Option<MealItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

/// A logged meal.
///
/// Totals are computed once in [`Meal::new`] and the items are only reachable
/// through a shared slice afterwards, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    id: RecordId,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo: Option<String>,
    items: Vec<MealItem>,
    #[serde(flatten)]
    totals: MealTotals,
}

impl Meal {
    pub fn new(id: RecordId, date: DateTime<Utc>, meal: NewMeal) -> Self {
        let items: Vec<MealItem> = meal.items.into_iter().map(MealItem::into_finite).collect();
        let totals = MealTotals::from_items(&items);
        Self {
            id,
            date,
            photo: meal.photo,
            items,
            totals,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn items(&self) -> &[MealItem] {
        &self.items
    }

    pub fn totals(&self) -> &MealTotals {
        &self.totals
    }

    pub fn total_calories(&self) -> f64 {
        self.totals.total_calories
    }

    /// Item names joined for one-line summaries.
    pub fn item_names(&self, separator: &str) -> String {
        self.items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Meal: {}", self.date.format("%Y-%m-%d %H:%M"))?;
        for item in &self.items {
            writeln!(f, "  - {} ({} kcal)", item.name, item.calories)?;
        }
        write!(
            f,
            "  Calories: {}  Protein: {}g  Carbs: {}g  Fat: {}g",
            self.totals.total_calories,
            self.totals.total_protein,
            self.totals.total_carbs,
            self.totals.total_fat
        )
    }
}
