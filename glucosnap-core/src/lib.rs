//! GlucoSnap Core Library
//!
//! Data model, local persistence and derived views for HbA1c and meal
//! tracking.

pub mod analysis;
pub mod error;
pub mod export;
pub mod gateway;
pub mod models;
pub mod seed;
pub mod storage;
pub mod store;
pub mod trend;

pub use analysis::{parse_analysis_response, AnalysisError, DemoAnalyzer, MealAnalyzer};
pub use error::{HealthError, ValidationError};
pub use export::{history_to_csv, CSV_HEADER};
pub use gateway::{GatewayError, PersistenceGateway, A1C_STORAGE_KEY, MEALS_STORAGE_KEY};
pub use models::{
    combined_history, A1cReading, A1cZone, HistoryEntry, Meal, MealItem, MealTotals,
    NewA1cReading, NewMeal, RecordId, UserSettings,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{HealthSnapshot, HealthStore};
pub use trend::{y_domain, TrendWindow};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
