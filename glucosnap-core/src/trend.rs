//! HbA1c trend windows for charting.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::A1cReading;

/// Y-axis range used when there is nothing to plot.
pub const DEFAULT_Y_DOMAIN: (f64, f64) = (4.0, 10.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendWindow {
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "all")]
    All,
}

impl TrendWindow {
    /// Earliest date included in the window, or `None` for unbounded.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TrendWindow::ThreeMonths => now.checked_sub_months(Months::new(3)),
            TrendWindow::SixMonths => now.checked_sub_months(Months::new(6)),
            TrendWindow::OneYear => now.checked_sub_months(Months::new(12)),
            TrendWindow::All => None,
        }
    }
}

impl fmt::Display for TrendWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendWindow::ThreeMonths => write!(f, "3m"),
            TrendWindow::SixMonths => write!(f, "6m"),
            TrendWindow::OneYear => write!(f, "1y"),
            TrendWindow::All => write!(f, "all"),
        }
    }
}

impl FromStr for TrendWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "3m" => Ok(TrendWindow::ThreeMonths),
            "6m" => Ok(TrendWindow::SixMonths),
            "1y" => Ok(TrendWindow::OneYear),
            "all" => Ok(TrendWindow::All),
            _ => Err(format!(
                "Invalid trend window '{}'. Valid options: 3m, 6m, 1y, all",
                s
            )),
        }
    }
}

/// Readings inside `window`, oldest first.
pub fn chart_points(
    readings: &[A1cReading],
    window: TrendWindow,
    now: DateTime<Utc>,
) -> Vec<A1cReading> {
    let start = window.start(now);
    let mut points: Vec<A1cReading> = readings
        .iter()
        .filter(|r| start.map_or(true, |s| r.date >= s))
        .cloned()
        .collect();
    points.sort_by_key(|r| r.date);
    points
}

/// Whole-number y-axis bounds with one unit of headroom on each side.
pub fn y_domain(points: &[A1cReading]) -> (f64, f64) {
    let mut values = points.iter().map(|r| r.value);
    let Some(first) = values.next() else {
        return DEFAULT_Y_DOMAIN;
    };
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    ((min - 1.0).floor(), (max + 1.0).ceil())
}
