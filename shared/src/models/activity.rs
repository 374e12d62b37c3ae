use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};
use crate::backend::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Feeding,
    Diaper,
    Sleep,
    Milestone,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 4] = [
        ActivityKind::Feeding,
        ActivityKind::Diaper,
        ActivityKind::Sleep,
        ActivityKind::Milestone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Feeding => "feeding",
            ActivityKind::Diaper => "diaper",
            ActivityKind::Sleep => "sleep",
            ActivityKind::Milestone => "milestone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Feeding => "Feeding",
            ActivityKind::Diaper => "Diaper Change",
            ActivityKind::Sleep => "Sleep",
            ActivityKind::Milestone => "Milestone",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityKind::Feeding => "🍼",
            ActivityKind::Diaper => "💧",
            ActivityKind::Sleep => "🌙",
            ActivityKind::Milestone => "⭐",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaperType {
    Wet,
    Dirty,
    Both,
}

impl DiaperType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiaperType::Wet => "wet",
            DiaperType::Dirty => "dirty",
            DiaperType::Both => "both",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "wet" => Some(DiaperType::Wet),
            "dirty" => Some(DiaperType::Dirty),
            "both" => Some(DiaperType::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub baby_id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
    /// Minutes.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub diaper_type: Option<DiaperType>,
    #[serde(default)]
    pub milestone_type: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewActivity {
    pub baby_id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diaper_type: Option<DiaperType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_type: Option<String>,
}

impl NewActivity {
    pub fn new(baby_id: impl Into<String>, kind: ActivityKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            baby_id: baby_id.into(),
            kind,
            timestamp,
            duration: None,
            notes: None,
            amount: None,
            unit: None,
            diaper_type: None,
            milestone_type: None,
        }
    }
}

impl Draft for NewActivity {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.baby_id) {
            missing.push("baby_id");
        }
        match self.kind {
            ActivityKind::Diaper if self.diaper_type.is_none() => missing.push("diaper_type"),
            ActivityKind::Milestone
                if self.milestone_type.as_deref().map_or(true, is_blank) =>
            {
                missing.push("milestone_type")
            }
            _ => {}
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl Entity for Activity {
    type Draft = NewActivity;
    type Patch = ActivityPatch;

    const TABLE: &'static str = "baby_activities";

    fn id(&self) -> &str {
        &self.id
    }

    fn default_order() -> Option<Order> {
        Some(Order::desc("timestamp"))
    }
}

/// Per-kind totals shown on the tracker cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    pub feeding: usize,
    pub diaper: usize,
    pub sleep: usize,
    pub milestone: usize,
}

impl ActivityCounts {
    pub fn tally<'a>(activities: impl IntoIterator<Item = &'a Activity>) -> Self {
        let mut counts = Self::default();
        for activity in activities {
            match activity.kind {
                ActivityKind::Feeding => counts.feeding += 1,
                ActivityKind::Diaper => counts.diaper += 1,
                ActivityKind::Sleep => counts.sleep += 1,
                ActivityKind::Milestone => counts.milestone += 1,
            }
        }
        counts
    }

    /// Only the activities logged on `day` (UTC).
    pub fn on_day<'a>(activities: impl IntoIterator<Item = &'a Activity>, day: NaiveDate) -> Self {
        Self::tally(
            activities
                .into_iter()
                .filter(|a| a.timestamp.date_naive() == day),
        )
    }
}

/// "45m" or "1h 30m".
pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

/// "Just now", "5m ago", "3h ago", "2d ago".
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_kind_wire_name() {
        let now = Utc.with_ymd_and_hms(2025, 6, 27, 9, 0, 0).unwrap();
        let mut draft = NewActivity::new("b1", ActivityKind::Diaper, now);
        draft.diaper_type = Some(DiaperType::Both);

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "diaper");
        assert_eq!(value["diaper_type"], "both");
        assert!(value.get("amount").is_none());
    }

    #[test]
    fn test_kind_specific_required_fields() {
        let now = Utc::now();
        assert_eq!(
            NewActivity::new("b1", ActivityKind::Diaper, now).missing_fields(),
            vec!["diaper_type"]
        );
        assert_eq!(
            NewActivity::new("b1", ActivityKind::Milestone, now).missing_fields(),
            vec!["milestone_type"]
        );
        assert!(NewActivity::new("b1", ActivityKind::Feeding, now)
            .missing_fields()
            .is_empty());
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(90), "1h 30m");

        let now = Utc.with_ymd_and_hms(2025, 6, 27, 9, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(20), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::minutes(200), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn test_counts_for_today() {
        let today = Utc.with_ymd_and_hms(2025, 6, 27, 9, 0, 0).unwrap();
        let activity = |kind, at| Activity {
            id: "a".into(),
            baby_id: "b".into(),
            kind,
            timestamp: at,
            duration: None,
            notes: None,
            amount: None,
            unit: None,
            diaper_type: None,
            milestone_type: None,
            user_id: "u".into(),
            created_at: None,
        };
        let activities = vec![
            activity(ActivityKind::Feeding, today),
            activity(ActivityKind::Feeding, today - Duration::days(1)),
            activity(ActivityKind::Diaper, today),
        ];

        let all = ActivityCounts::tally(&activities);
        assert_eq!(all.feeding, 2);
        let todays = ActivityCounts::on_day(&activities, today.date_naive());
        assert_eq!(todays.feeding, 1);
        assert_eq!(todays.diaper, 1);
    }
}
