use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepLog {
    pub id: String,
    pub baby_id: String,
    pub sleep_time: DateTime<Utc>,
    /// Absent while the baby is still asleep.
    #[serde(default)]
    pub wake_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quality_rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SleepLog {
    pub fn is_complete(&self) -> bool {
        self.wake_time.is_some()
    }

    /// Hours between falling asleep and waking; never stored.
    pub fn duration_hours(&self) -> Option<f64> {
        let wake = self.wake_time?;
        let seconds = (wake - self.sleep_time).num_seconds();
        (seconds >= 0).then(|| seconds as f64 / 3600.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewSleepLog {
    pub baby_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Draft for NewSleepLog {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.baby_id) {
            missing.push("baby_id");
        }
        if self.sleep_time.is_none() {
            missing.push("sleep_time");
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SleepLogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for SleepLog {
    type Draft = NewSleepLog;
    type Patch = SleepLogPatch;

    const TABLE: &'static str = "sleep_logs";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log(sleep: DateTime<Utc>, wake: Option<DateTime<Utc>>) -> SleepLog {
        SleepLog {
            id: "l".into(),
            baby_id: "b".into(),
            sleep_time: sleep,
            wake_time: wake,
            quality_rating: None,
            notes: None,
            user_id: "u".into(),
            created_at: None,
        }
    }

    #[test]
    fn test_duration_hours() {
        let sleep = Utc.with_ymd_and_hms(2025, 6, 27, 13, 0, 0).unwrap();
        let wake = Utc.with_ymd_and_hms(2025, 6, 27, 14, 45, 0).unwrap();

        assert_eq!(log(sleep, Some(wake)).duration_hours(), Some(1.75));
        assert_eq!(log(sleep, None).duration_hours(), None);
        assert_eq!(log(wake, Some(sleep)).duration_hours(), None);
    }

    #[test]
    fn test_decodes_backend_timestamps() {
        let row = serde_json::json!({
            "id": "l1",
            "baby_id": "b1",
            "sleep_time": "2025-06-27T20:00:00+00:00",
            "wake_time": null,
            "user_id": "u1",
            "created_at": "2025-06-27T20:00:01.123456+00:00"
        });
        let log: SleepLog = serde_json::from_value(row).unwrap();
        assert!(!log.is_complete());
        assert!(log.created_at.is_some());
    }

    #[test]
    fn test_missing_fields() {
        let draft = NewSleepLog::default();
        assert_eq!(draft.missing_fields(), vec!["baby_id", "sleep_time"]);
    }
}
