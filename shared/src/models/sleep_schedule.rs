use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};
use crate::backend::Order;

/// A planned sleep window for one baby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSchedule {
    pub id: String,
    pub baby_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SleepSchedule {
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at < self.end_time
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewSleepSchedule {
    pub baby_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewSleepSchedule {
    /// An end that does not come after the start is rejected before any request.
    pub fn window_error(&self) -> Option<&'static str> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end <= start => Some("End time must be after start time"),
            _ => None,
        }
    }
}

impl Draft for NewSleepSchedule {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.baby_id) {
            missing.push("baby_id");
        }
        if self.start_time.is_none() {
            missing.push("start_time");
        }
        if self.end_time.is_none() {
            missing.push("end_time");
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SleepSchedulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Entity for SleepSchedule {
    type Draft = NewSleepSchedule;
    type Patch = SleepSchedulePatch;

    const TABLE: &'static str = "sleep_schedules";

    fn id(&self) -> &str {
        &self.id
    }

    fn default_order() -> Option<Order> {
        Some(Order::asc("start_time"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 27, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_window() {
        let schedule = SleepSchedule {
            id: "s1".into(),
            baby_id: "b1".into(),
            start_time: at(13),
            end_time: at(15),
            note: None,
            user_id: "u1".into(),
            created_at: None,
        };
        assert_eq!(schedule.duration_hours(), 2.0);
        assert!(schedule.contains(at(13)));
        assert!(schedule.contains(at(14)));
        assert!(!schedule.contains(at(15)));
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = NewSleepSchedule {
            baby_id: "b1".into(),
            start_time: Some(at(20)),
            end_time: Some(at(20)),
            note: None,
        };
        assert!(draft.missing_fields().is_empty());
        assert!(draft.window_error().is_some());

        draft.end_time = Some(at(22));
        assert_eq!(draft.window_error(), None);

        assert_eq!(
            NewSleepSchedule::default().missing_fields(),
            vec!["baby_id", "start_time", "end_time"]
        );
    }

    #[test]
    fn test_draft_omits_empty_note() {
        let draft = NewSleepSchedule {
            baby_id: "b1".into(),
            start_time: Some(at(20)),
            end_time: Some(at(22)),
            note: None,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("note").is_none());
        assert_eq!(value["start_time"], "2025-06-27T20:00:00Z");
    }
}
