use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier assigned to a record when it is first persisted.
///
/// Stored collections may contain ids from older writers (short literals,
/// timestamps), so the inner value is kept as a string rather than a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = RecordId::from("m1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");

        let parsed: RecordId = serde_json::from_str("\"2025-01-01T00:00:00.000Z\"").unwrap();
        assert_eq!(parsed.as_str(), "2025-01-01T00:00:00.000Z");
    }
}
