//! Cached feed URL record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cached feed URL per class.
///
/// Serialized as `{feedUrl, savedAt, classId}` with `savedAt` in epoch
/// milliseconds. Entries never expire on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub feed_url: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
    pub class_id: String,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(class_id: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            saved_at: Utc::now(),
            class_id: class_id.into(),
        }
    }

    /// Human-readable age as `<days>d <hours>h`.
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let age = now.signed_duration_since(self.saved_at);
        let days = age.num_days();
        let hours = age.num_hours() % 24;
        format!("{days}d {hours}h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn serializes_with_camel_case_millis() {
        let entry = CacheEntry {
            feed_url: "https://ade.example/feed.ics".into(),
            saved_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            class_id: "1234".into(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["feedUrl"], "https://ade.example/feed.ics");
        assert_eq!(json["savedAt"], 1_700_000_000_123_i64);
        assert_eq!(json["classId"], "1234");
    }

    #[test]
    fn age_label_splits_days_and_hours() {
        let saved = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry {
            feed_url: "https://x".into(),
            saved_at: saved,
            class_id: "1".into(),
        };

        let now = saved + Duration::days(3) + Duration::hours(5) + Duration::minutes(59);
        assert_eq!(entry.age_label(now), "3d 5h");
    }
}
