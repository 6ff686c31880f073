//! End-to-end behaviour of the gateway and store over on-disk storage.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use glucosnap_core::{
    FileStore, HealthStore, MealItem, NewA1cReading, NewMeal, PersistenceGateway, UserSettings,
    A1C_STORAGE_KEY,
};
use tempfile::TempDir;

fn file_gateway(dir: &TempDir) -> Arc<PersistenceGateway<FileStore>> {
    Arc::new(PersistenceGateway::new(FileStore::new(dir.path())))
}

#[tokio::test]
async fn fresh_storage_seeds_then_grows() {
    let dir = TempDir::new().unwrap();
    let gateway = file_gateway(&dir);

    let readings = gateway.get_a1c_readings().await;
    let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![7.8, 7.2, 6.9, 6.6, 6.4]);

    let saved = gateway
        .save_a1c_reading(NewA1cReading::new(6.2, Utc::now()))
        .await
        .unwrap();

    let readings = gateway.get_a1c_readings().await;
    assert_eq!(readings.len(), 6);
    assert!(readings.iter().any(|r| r.id == saved.id && r.value == 6.2));
}

#[tokio::test]
async fn load_twice_returns_identical_collections() {
    let dir = TempDir::new().unwrap();

    let first = HealthStore::open(file_gateway(&dir), UserSettings::default()).await;
    let second = HealthStore::open(file_gateway(&dir), UserSettings::default()).await;

    assert_eq!(first.all_readings(), second.all_readings());
    assert_eq!(first.all_meals(), second.all_meals());
}

#[tokio::test]
async fn every_added_reading_is_stored_once_with_a_distinct_id() {
    let dir = TempDir::new().unwrap();
    let mut store = HealthStore::open(file_gateway(&dir), UserSettings::default()).await;
    let base = Utc::now() - Duration::days(100);

    let mut added = Vec::new();
    for (i, value) in [5.5, 6.0, 4.2, 9.9, 6.0].into_iter().enumerate() {
        let date = base + Duration::days(((i * 37) % 90) as i64);
        added.push(
            store
                .add_a1c_reading(NewA1cReading::new(value, date))
                .await
                .unwrap(),
        );
    }

    let reopened = HealthStore::open(file_gateway(&dir), UserSettings::default()).await;
    let mut stored = reopened.all_readings();
    stored.sort_by_key(|r| r.date);

    for reading in &added {
        assert_eq!(stored.iter().filter(|r| r.id == reading.id).count(), 1);
    }
    let ids: HashSet<_> = stored.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids.len(), stored.len());
    assert_eq!(stored.len(), 5 + added.len());
}

#[tokio::test]
async fn saved_meal_is_persisted_with_totals() {
    let dir = TempDir::new().unwrap();
    let gateway = file_gateway(&dir);

    let meal = gateway
        .save_meal(NewMeal::new(vec![MealItem::new("Egg", 70.0, 6.0, 1.0, 5.0)]))
        .await
        .unwrap();

    assert_eq!(meal.total_calories(), 70.0);
    assert_eq!(meal.totals().total_protein, 6.0);
    assert_eq!(meal.totals().total_carbs, 1.0);
    assert_eq!(meal.totals().total_fat, 5.0);
    assert_eq!(meal.items().len(), 1);

    let raw = std::fs::read_to_string(dir.path().join("gluco_snap_meals.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0]["id"], meal.id().as_str());
    assert_eq!(stored[0]["totalCalories"], 70.0);
}

#[tokio::test]
async fn corrupt_file_loads_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(format!("{}.json", A1C_STORAGE_KEY)),
        "[{\"broken\"",
    )
    .unwrap();

    let store = HealthStore::open(file_gateway(&dir), UserSettings::default()).await;
    assert!(store.all_readings().is_empty());
    assert_eq!(store.all_meals().len(), 3);
}
