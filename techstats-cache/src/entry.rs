//! The persisted cache record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use techstats_core::{EpochMillis, StoreError};

/// A payload plus the instant it was fetched, stored as one JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time in epoch milliseconds.
    pub timestamp: EpochMillis,
    pub data: Value,
}

impl CacheEntry {
    pub fn new(written_at: DateTime<Utc>, data: Value) -> Self {
        Self {
            timestamp: written_at.timestamp_millis(),
            data,
        }
    }

    /// `None` when the stored timestamp is out of chrono's range.
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn encode(&self, key: &str) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse a stored record. Anything that is not a well-formed entry is
    /// reported as [`StoreError::CorruptEntry`].
    pub fn decode(key: &str, raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::CorruptEntry {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_entry_wire_format() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry::new(at, json!([{"date": "2025-W01"}]));
        let raw = entry.encode("repo-counts_weekly").unwrap();
        assert_eq!(
            raw,
            r#"{"timestamp":1735689600000,"data":[{"date":"2025-W01"}]}"#
        );
        let back = CacheEntry::decode("repo-counts_weekly", &raw).unwrap();
        assert_eq!(back.written_at(), Some(at));
    }

    #[test]
    fn test_corrupt_entries_are_typed() {
        for raw in ["not json", "{\"data\": []}", "[1,2,3]", ""] {
            match CacheEntry::decode("k", raw) {
                Err(StoreError::CorruptEntry { key, .. }) => assert_eq!(key, "k"),
                other => panic!("expected corrupt entry for {:?}, got {:?}", raw, other),
            }
        }
    }
}
