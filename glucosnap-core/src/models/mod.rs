mod a1c_reading;
mod history;
mod meal;
mod record_id;
mod settings;

pub use a1c_reading::{A1cReading, NewA1cReading, A1C_MAX_VALUE, A1C_MIN_VALUE};
pub use history::{combined_history, HistoryEntry};
pub use meal::{Meal, MealItem, MealTotals, NewMeal};
pub use record_id::RecordId;
pub use settings::{A1cZone, UserSettings, A1C_GOAL_MAX, A1C_NEAR_MAX};
