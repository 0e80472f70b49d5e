//! Core data models for Halton bus information
//!
//! This module contains the data types shared across the library together
//! with the two accessors that produce them: the delay-feed client and the
//! status-page client.

pub mod delays;
pub mod status;

pub use delays::{DelaysClient, DelaysError};
pub use status::{StatusClient, StatusError};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single bus-delay announcement derived from one feed entry
///
/// Records are built from the cached feed document at read time and are not
/// stored independently of it; re-reading the accessor re-derives them from
/// whatever document is currently cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayRecord {
    /// Announcement text exactly as published in the feed entry
    pub text: String,
    /// When the entry was published, if the feed provided a timestamp
    pub published: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_record_serialization_roundtrip() {
        let record = DelayRecord {
            text: "Route 23 AM run is 20 minutes late".to_string(),
            published: Some(
                DateTime::parse_from_rfc2822("Mon, 02 Feb 2026 06:45:00 -0500").unwrap(),
            ),
        };

        let json = serde_json::to_string(&record).expect("Failed to serialize DelayRecord");
        let deserialized: DelayRecord =
            serde_json::from_str(&json).expect("Failed to deserialize DelayRecord");

        assert_eq!(deserialized, record);
    }

    #[test]
    fn test_delay_record_without_publication_time() {
        let record = DelayRecord {
            text: "Bus 118 delayed".to_string(),
            published: None,
        };

        assert_eq!(record.text, "Bus 118 delayed");
        assert!(record.published.is_none());
    }
}
