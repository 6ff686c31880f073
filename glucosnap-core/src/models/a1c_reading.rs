use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordId;
use crate::error::ValidationError;

/// Lowest HbA1c percentage accepted from user input.
pub const A1C_MIN_VALUE: f64 = 3.0;
/// Highest HbA1c percentage accepted from user input.
pub const A1C_MAX_VALUE: f64 = 25.0;

/// A single HbA1c lab result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A1cReading {
    pub id: RecordId,
    pub value: f64,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A reading that has not been persisted yet and therefore has no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewA1cReading {
    pub value: f64,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewA1cReading {
    pub fn new(value: f64, date: DateTime<Utc>) -> Self {
        Self {
            value,
            date,
            notes: None,
        }
    }

    /// Blank notes are treated as absent.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() {
            None
        } else {
            Some(notes)
        };
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.value.is_finite() || self.value < A1C_MIN_VALUE || self.value > A1C_MAX_VALUE {
            return Err(ValidationError::A1cOutOfRange {
                value: self.value,
                min: A1C_MIN_VALUE,
                max: A1C_MAX_VALUE,
            });
        }
        Ok(())
    }

    pub(crate) fn into_reading(self, id: RecordId) -> A1cReading {
        A1cReading {
            id,
            value: self.value,
            date: self.date,
            notes: self.notes,
        }
    }
}

impl fmt::Display for A1cReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%  {}", self.value, self.date.format("%Y-%m-%d"))?;
        if let Some(notes) = &self.notes {
            write!(f, "  \"{}\"", notes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(NewA1cReading::new(3.0, date()).validate().is_ok());
        assert!(NewA1cReading::new(25.0, date()).validate().is_ok());
        assert!(NewA1cReading::new(6.4, date()).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(NewA1cReading::new(2.9, date()).validate().is_err());
        assert!(NewA1cReading::new(25.1, date()).validate().is_err());
        assert!(NewA1cReading::new(f64::NAN, date()).validate().is_err());
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let reading = NewA1cReading::new(6.0, date()).with_notes("   ");
        assert!(reading.notes.is_none());

        let reading = NewA1cReading::new(6.0, date()).with_notes("Lab test");
        assert_eq!(reading.notes.as_deref(), Some("Lab test"));
    }

    #[test]
    fn test_reads_javascript_iso_dates() {
        let json = r#"{"id":"1","value":7.8,"date":"2024-10-02T12:00:00.000Z","notes":"Annual check-up"}"#;
        let reading: A1cReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.id.as_str(), "1");
        assert_eq!(reading.value, 7.8);
        assert_eq!(
            reading.date,
            Utc.with_ymd_and_hms(2024, 10, 2, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_display() {
        let reading = NewA1cReading::new(6.4, date())
            .with_notes("Goal achieved!")
            .into_reading(RecordId::from("5"));
        assert_eq!(format!("{}", reading), "6.4%  2025-03-01  \"Goal achieved!\"");
    }
}
