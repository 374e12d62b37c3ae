use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};
use crate::backend::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Nap,
    Bedtime,
    Feeding,
    Medicine,
    Checkup,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 5] = [
        ReminderKind::Nap,
        ReminderKind::Bedtime,
        ReminderKind::Feeding,
        ReminderKind::Medicine,
        ReminderKind::Checkup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Nap => "nap",
            ReminderKind::Bedtime => "bedtime",
            ReminderKind::Feeding => "feeding",
            ReminderKind::Medicine => "medicine",
            ReminderKind::Checkup => "checkup",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ReminderKind::Nap => "😴",
            ReminderKind::Bedtime => "🌙",
            ReminderKind::Feeding => "🍼",
            ReminderKind::Medicine => "💊",
            ReminderKind::Checkup => "🩺",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ReminderFrequency {
    pub const ALL: [ReminderFrequency; 3] = [
        ReminderFrequency::Daily,
        ReminderFrequency::Weekly,
        ReminderFrequency::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderFrequency::Daily => "daily",
            ReminderFrequency::Weekly => "weekly",
            ReminderFrequency::Monthly => "monthly",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|freq| freq.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabyReminder {
    pub id: String,
    pub baby_id: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub title: String,
    /// Time of day, stored as `HH:MM:SS`.
    pub time: NaiveTime,
    pub frequency: ReminderFrequency,
    #[serde(default)]
    pub is_active: bool,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBabyReminder {
    pub baby_id: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    pub frequency: ReminderFrequency,
    pub is_active: bool,
}

impl NewBabyReminder {
    pub fn new(baby_id: impl Into<String>, kind: ReminderKind) -> Self {
        Self {
            baby_id: baby_id.into(),
            kind,
            title: String::new(),
            time: None,
            frequency: ReminderFrequency::Daily,
            is_active: true,
        }
    }
}

impl Draft for NewBabyReminder {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.baby_id) {
            missing.push("baby_id");
        }
        if is_blank(&self.title) {
            missing.push("title");
        }
        if self.time.is_none() {
            missing.push("time");
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BabyReminderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<ReminderFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Entity for BabyReminder {
    type Draft = NewBabyReminder;
    type Patch = BabyReminderPatch;

    const TABLE: &'static str = "baby_reminders";

    fn id(&self) -> &str {
        &self.id
    }

    fn default_order() -> Option<Order> {
        Some(Order::asc("time"))
    }
}

/// First active reminder at or after `now`, wrapping to the earliest one of
/// the next day. Expects reminders ordered by time.
pub fn next_reminder(reminders: &[BabyReminder], now: NaiveTime) -> Option<&BabyReminder> {
    let mut active = reminders.iter().filter(|r| r.is_active);
    let first = active.clone().next();
    active.find(|r| r.time >= now).or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::access::EntityAccess;
    use crate::backend::{AuthApi, Credentials, Filter};
    use crate::testing::InMemoryBackend;

    fn reminder(id: &str, hour: u32, is_active: bool) -> BabyReminder {
        BabyReminder {
            id: id.into(),
            baby_id: "b".into(),
            kind: ReminderKind::Nap,
            title: format!("Reminder {id}"),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            frequency: ReminderFrequency::Daily,
            is_active,
            user_id: "u".into(),
            created_at: None,
        }
    }

    #[test]
    fn test_decodes_backend_row() {
        let row = serde_json::json!({
            "id": "r1",
            "baby_id": "b1",
            "type": "bedtime",
            "title": "Bath and bed",
            "time": "19:30:00",
            "frequency": "daily",
            "is_active": true,
            "user_id": "u1"
        });
        let reminder: BabyReminder = serde_json::from_value(row).unwrap();
        assert_eq!(reminder.kind, ReminderKind::Bedtime);
        assert_eq!(reminder.time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn test_draft_sends_type_column() {
        let mut draft = NewBabyReminder::new("b1", ReminderKind::Medicine);
        draft.title = "Vitamin D".into();
        draft.time = NaiveTime::from_hms_opt(8, 0, 0);

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "medicine");
        assert_eq!(value["time"], "08:00:00");
        assert!(draft.missing_fields().is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let draft = NewBabyReminder::new("", ReminderKind::Nap);
        assert_eq!(draft.missing_fields(), vec!["baby_id", "title", "time"]);
    }

    #[test]
    fn test_next_reminder_skips_inactive_and_wraps() {
        let reminders = vec![
            reminder("morning", 9, true),
            reminder("noon", 12, false),
            reminder("evening", 19, true),
        ];
        let at = |hour| NaiveTime::from_hms_opt(hour, 0, 0).unwrap();

        assert_eq!(next_reminder(&reminders, at(10)).map(|r| r.id.as_str()), Some("evening"));
        assert_eq!(next_reminder(&reminders, at(9)).map(|r| r.id.as_str()), Some("morning"));
        assert_eq!(next_reminder(&reminders, at(21)).map(|r| r.id.as_str()), Some("morning"));
        assert_eq!(next_reminder(&[reminder("off", 9, false)], at(8)), None);
    }

    #[test]
    fn test_parse_kinds() {
        for kind in ReminderKind::ALL {
            assert_eq!(ReminderKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ReminderFrequency::parse("weekly"), Some(ReminderFrequency::Weekly));
        assert_eq!(ReminderKind::parse("bath"), None);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_time_of_day() {
        let backend = Rc::new(InMemoryBackend::new());
        let user_id = backend.register("parent@example.com", "hunter22");
        backend
            .sign_in_with_password(&Credentials {
                email: "parent@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();

        let access = EntityAccess::<BabyReminder, _>::new(backend.clone())
            .scoped(Filter::eq("baby_id", "b1"));
        for (title, hour, baby) in [("Bedtime", 19, "b1"), ("Nap", 9, "b1"), ("Other baby", 7, "b2")] {
            let mut draft = NewBabyReminder::new(baby, ReminderKind::Nap);
            draft.title = title.into();
            draft.time = NaiveTime::from_hms_opt(hour, 0, 0);
            access.create(&draft, Some(&user_id)).await.unwrap();
        }

        let titles: Vec<_> = access
            .list(Some(&user_id))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Nap", "Bedtime"]);
    }
}
