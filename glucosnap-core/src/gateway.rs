//! Persistence Gateway: reads and writes the two record collections.
//!
//! Storage layout:
//! ```text
//! gluco_snap_a1c    -> JSON array of A1cReading
//! gluco_snap_meals  -> JSON array of Meal, newest first
//! ```
//!
//! Every operation holds its collection's lock for the whole
//! read-modify-write, so concurrent saves through one gateway never lose
//! updates.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ValidationError;
use crate::models::{A1cReading, Meal, NewA1cReading, NewMeal, RecordId};
use crate::seed::{seed_a1c_readings, seed_meals};
use crate::storage::{KeyValueStore, StorageError};

pub const A1C_STORAGE_KEY: &str = "gluco_snap_a1c";
pub const MEALS_STORAGE_KEY: &str = "gluco_snap_meals";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Stored collection '{key}' is unreadable: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode collection '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub struct PersistenceGateway<S> {
    store: S,
    a1c_lock: Mutex<()>,
    meals_lock: Mutex<()>,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            a1c_lock: Mutex::new(()),
            meals_lock: Mutex::new(()),
        }
    }

    /// Returns the underlying storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns every stored reading, seeding storage on first use.
    ///
    /// Unreadable storage is logged and reported as an empty collection.
    pub async fn get_a1c_readings(&self) -> Vec<A1cReading> {
        fail_open(A1C_STORAGE_KEY, self.try_get_a1c_readings().await)
    }

    /// Like [`get_a1c_readings`](Self::get_a1c_readings) but reports
    /// unreadable storage instead of hiding it.
    pub async fn try_get_a1c_readings(&self) -> Result<Vec<A1cReading>, GatewayError> {
        let _guard = self.a1c_lock.lock().await;
        self.load_or_seed(A1C_STORAGE_KEY, || seed_a1c_readings(Utc::now()))
            .await
    }

    /// Assigns an id and appends the reading to the stored collection.
    ///
    /// Readings outside the accepted range are rejected before storage is
    /// touched.
    pub async fn save_a1c_reading(
        &self,
        reading: NewA1cReading,
    ) -> Result<A1cReading, GatewayError> {
        reading.validate()?;
        let _guard = self.a1c_lock.lock().await;
        let mut readings = self
            .load_or_seed(A1C_STORAGE_KEY, || seed_a1c_readings(Utc::now()))
            .await?;

        let reading = reading.into_reading(RecordId::generate());
        readings.push(reading.clone());
        self.write(A1C_STORAGE_KEY, &readings).await?;

        debug!(id = %reading.id, value = reading.value, "saved a1c reading");
        Ok(reading)
    }

    /// Returns every stored meal, newest first, seeding storage on first use.
    ///
    /// Unreadable storage is logged and reported as an empty collection.
    pub async fn get_meals(&self) -> Vec<Meal> {
        fail_open(MEALS_STORAGE_KEY, self.try_get_meals().await)
    }

    pub async fn try_get_meals(&self) -> Result<Vec<Meal>, GatewayError> {
        let _guard = self.meals_lock.lock().await;
        self.load_or_seed(MEALS_STORAGE_KEY, || seed_meals(Utc::now()))
            .await
    }

    /// Totals the items, stamps the meal with the current time and prepends
    /// it to the stored collection.
    pub async fn save_meal(&self, meal: NewMeal) -> Result<Meal, GatewayError> {
        let _guard = self.meals_lock.lock().await;
        let mut meals = self
            .load_or_seed(MEALS_STORAGE_KEY, || seed_meals(Utc::now()))
            .await?;

        let meal = Meal::new(RecordId::generate(), Utc::now(), meal);
        meals.insert(0, meal.clone());
        self.write(MEALS_STORAGE_KEY, &meals).await?;

        debug!(
            id = %meal.id(),
            items = meal.items().len(),
            calories = meal.total_calories(),
            "saved meal"
        );
        Ok(meal)
    }

    /// Callers must hold the collection's lock.
    async fn load_or_seed<T, F>(&self, key: &'static str, seed: F) -> Result<Vec<T>, GatewayError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        match self.store.get(key).await? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(|source| GatewayError::Corrupt { key, source })
            }
            _ => {
                let records = seed();
                self.write(key, &records).await?;
                info!(key, count = records.len(), "seeded empty collection");
                Ok(records)
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &'static str, records: &[T]) -> Result<(), GatewayError> {
        let json =
            serde_json::to_string(records).map_err(|source| GatewayError::Encode { key, source })?;
        self.store.set(key, &json).await?;
        Ok(())
    }
}

fn fail_open<T>(key: &str, result: Result<Vec<T>, GatewayError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(key, error = %e, "failed to load collection, treating it as empty");
        Vec::new()
    })
}
