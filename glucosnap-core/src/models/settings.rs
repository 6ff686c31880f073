use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the "in target" HbA1c band.
pub const A1C_GOAL_MAX: f64 = 6.5;
/// Upper bound of the "near target" HbA1c band.
pub const A1C_NEAR_MAX: f64 = 7.5;

/// Per-user targets. Fixed for the lifetime of a store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub a1c_target: f64,
    pub calorie_target: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            a1c_target: 6.5,
            calorie_target: 2000,
        }
    }
}

/// Band an HbA1c value falls into on the trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum A1cZone {
    Goal,
    Near,
    High,
}

impl A1cZone {
    pub fn classify(value: f64) -> Self {
        if value <= A1C_GOAL_MAX {
            A1cZone::Goal
        } else if value <= A1C_NEAR_MAX {
            A1cZone::Near
        } else {
            A1cZone::High
        }
    }
}

impl fmt::Display for A1cZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            A1cZone::Goal => write!(f, "in target"),
            A1cZone::Near => write!(f, "near target"),
            A1cZone::High => write!(f, "high"),
        }
    }
}
