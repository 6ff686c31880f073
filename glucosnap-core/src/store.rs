//! Health Data Store: the in-memory snapshot every view reads from.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{HealthError, ValidationError};
use crate::gateway::PersistenceGateway;
use crate::models::{
    combined_history, A1cReading, HistoryEntry, Meal, NewA1cReading, NewMeal, UserSettings,
};
use crate::storage::KeyValueStore;
use crate::trend::{chart_points, y_domain, TrendWindow};

/// Values derived from the store at one point in time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// Newest first.
    pub a1c_readings: Vec<A1cReading>,
    /// Newest first.
    pub meals: Vec<Meal>,
    pub settings: UserSettings,
    pub todays_calorie_intake: f64,
    pub latest_a1c: Option<A1cReading>,
    pub is_loading: bool,
}

/// Holds the canonical copy of both collections for one running application.
///
/// All mutations go through the gateway first; in-memory state only changes
/// once the write has succeeded.
pub struct HealthStore<S> {
    gateway: Arc<PersistenceGateway<S>>,
    settings: UserSettings,
    a1c_readings: Vec<A1cReading>,
    meals: Vec<Meal>,
    is_loading: bool,
}

impl<S: KeyValueStore> HealthStore<S> {
    /// Creates an empty store. Call [`load`](Self::load) to populate it.
    pub fn new(gateway: Arc<PersistenceGateway<S>>, settings: UserSettings) -> Self {
        Self {
            gateway,
            settings,
            a1c_readings: Vec::new(),
            meals: Vec::new(),
            is_loading: true,
        }
    }

    /// Creates a store and performs the initial load.
    pub async fn open(gateway: Arc<PersistenceGateway<S>>, settings: UserSettings) -> Self {
        let mut store = Self::new(gateway, settings);
        store.load().await;
        store
    }

    /// Fetches both collections concurrently.
    ///
    /// Never fails: an unreadable collection is logged by the gateway and
    /// loaded as empty.
    pub async fn load(&mut self) {
        self.is_loading = true;
        let (readings, meals) =
            futures::join!(self.gateway.get_a1c_readings(), self.gateway.get_meals());
        debug!(
            readings = readings.len(),
            meals = meals.len(),
            "loaded health data"
        );
        self.a1c_readings = readings;
        self.meals = meals;
        self.is_loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn gateway(&self) -> &Arc<PersistenceGateway<S>> {
        &self.gateway
    }

    /// Validates and persists a reading, then inserts it into the in-memory
    /// collection, which is kept oldest first.
    pub async fn add_a1c_reading(
        &mut self,
        reading: NewA1cReading,
    ) -> Result<A1cReading, HealthError> {
        reading.validate()?;
        let saved = self.gateway.save_a1c_reading(reading).await?;
        self.a1c_readings.push(saved.clone());
        self.a1c_readings.sort_by_key(|r| r.date);
        Ok(saved)
    }

    /// Persists a meal and prepends it to the in-memory collection.
    pub async fn add_meal(&mut self, meal: NewMeal) -> Result<Meal, HealthError> {
        if meal.items.is_empty() {
            return Err(ValidationError::EmptyMeal.into());
        }
        let saved = self.gateway.save_meal(meal).await?;
        self.meals.insert(0, saved.clone());
        Ok(saved)
    }

    /// Calories from meals logged during the current local calendar day.
    pub fn todays_calorie_intake(&self) -> f64 {
        self.calorie_intake_on(&Local::now())
    }

    /// Calories from meals logged between the midnight that starts `now`'s
    /// day in its time zone and the following midnight.
    pub fn calorie_intake_on<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> f64 {
        let Some((start, end)) = day_bounds(now) else {
            return 0.0;
        };
        self.meals
            .iter()
            .filter(|m| m.date() >= start && m.date() < end)
            .map(Meal::total_calories)
            .sum()
    }

    /// Calorie budget left for today. Negative once the target is exceeded.
    pub fn calories_remaining(&self) -> f64 {
        f64::from(self.settings.calorie_target) - self.todays_calorie_intake()
    }

    /// The reading with the most recent date.
    pub fn latest_a1c(&self) -> Option<&A1cReading> {
        self.a1c_readings.iter().max_by_key(|r| r.date)
    }

    /// All readings, newest first.
    pub fn all_readings(&self) -> Vec<A1cReading> {
        let mut readings = self.a1c_readings.clone();
        readings.sort_by(|a, b| b.date.cmp(&a.date));
        readings
    }

    /// All meals, newest first.
    pub fn all_meals(&self) -> Vec<Meal> {
        let mut meals = self.meals.clone();
        meals.sort_by(|a, b| b.date().cmp(&a.date()));
        meals
    }

    /// Readings within `window` of `now`, oldest first.
    pub fn chart_readings(&self, window: TrendWindow, now: DateTime<Utc>) -> Vec<A1cReading> {
        chart_points(&self.a1c_readings, window, now)
    }

    /// Y-axis bounds for the chart of `window`.
    pub fn chart_y_domain(&self, window: TrendWindow, now: DateTime<Utc>) -> (f64, f64) {
        y_domain(&self.chart_readings(window, now))
    }

    /// Readings and meals merged into one newest-first timeline.
    pub fn history(&self) -> Vec<HistoryEntry> {
        combined_history(&self.a1c_readings, &self.meals)
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            a1c_readings: self.all_readings(),
            meals: self.all_meals(),
            settings: self.settings,
            todays_calorie_intake: self.todays_calorie_intake(),
            latest_a1c: self.latest_a1c().cloned(),
            is_loading: self.is_loading,
        }
    }
}

/// Longest stretch of local time a zone transition can skip.
const MAX_LOCAL_GAP_MINUTES: i64 = 24 * 60;

/// Start (inclusive) and end (exclusive) of the calendar day containing `now`.
fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let tz = now.timezone();
    local_day_bounds(now.date_naive(), |local| {
        tz.from_local_datetime(local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Day bounds for `day`, where `resolve` maps local wall-clock time to an
/// instant and returns `None` for times skipped by a transition.
fn local_day_bounds<F>(day: NaiveDate, resolve: F) -> Option<(DateTime<Utc>, DateTime<Utc>)>
where
    F: Fn(&NaiveDateTime) -> Option<DateTime<Utc>>,
{
    let midnight = day.and_hms_opt(0, 0, 0)?;
    let start = first_existing_instant(midnight, &resolve)?;
    let end = first_existing_instant(midnight + Duration::days(1), &resolve)?;
    Some((start, end))
}

/// The first instant at or after `local` that exists on the local clock.
fn first_existing_instant<F>(local: NaiveDateTime, resolve: &F) -> Option<DateTime<Utc>>
where
    F: Fn(&NaiveDateTime) -> Option<DateTime<Utc>>,
{
    (0..=MAX_LOCAL_GAP_MINUTES).find_map(|minutes| resolve(&(local + Duration::minutes(minutes))))
}
