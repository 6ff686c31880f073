//! Demonstration records written on first use of an empty store.

use chrono::{DateTime, Duration, Utc};

use crate::models::{A1cReading, Meal, MealItem, NewMeal, RecordId};

/// (id, days ago, value, notes)
const SEED_A1C: [(&str, i64, f64, &str); 5] = [
    ("1", 380, 7.8, "Annual check-up"),
    ("2", 290, 7.2, "Follow-up test"),
    ("3", 180, 6.9, "Feeling better"),
    ("4", 90, 6.6, "On track"),
    ("5", 10, 6.4, "Goal achieved!"),
];

pub fn seed_a1c_readings(now: DateTime<Utc>) -> Vec<A1cReading> {
    SEED_A1C
        .iter()
        .map(|&(id, days_ago, value, notes)| A1cReading {
            id: RecordId::from(id),
            value,
            date: now - Duration::days(days_ago),
            notes: Some(notes.to_string()),
        })
        .collect()
}

pub fn seed_meals(now: DateTime<Utc>) -> Vec<Meal> {
    vec![
        Meal::new(
            RecordId::from("m1"),
            now - Duration::days(2),
            NewMeal::new(vec![MealItem::new(
                "Grilled Chicken Salad",
                450.0,
                40.0,
                20.0,
                25.0,
            )]),
        ),
        Meal::new(
            RecordId::from("m2"),
            now - Duration::days(1),
            NewMeal::new(vec![MealItem::new(
                "Oatmeal with Berries",
                350.0,
                10.0,
                60.0,
                8.0,
            )]),
        ),
        Meal::new(
            RecordId::from("m3"),
            now,
            NewMeal::new(vec![
                MealItem::new("Salmon with Quinoa", 550.0, 45.0, 40.0, 25.0),
                MealItem::new("Steamed Broccoli", 50.0, 5.0, 10.0, 1.0),
            ]),
        ),
    ]
}
