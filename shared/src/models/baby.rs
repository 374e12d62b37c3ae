use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baby {
    pub id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Baby {
    pub fn age_in_months(&self, today: NaiveDate) -> u32 {
        months_between(self.birth_date, today)
    }

    /// "3 months", "1 year", "2 years 5 months".
    pub fn age_label(&self, today: NaiveDate) -> String {
        let months = self.age_in_months(today);
        let years = months / 12;
        let rest = months % 12;
        let plural = |n: u32, unit: &str| {
            if n == 1 {
                format!("1 {unit}")
            } else {
                format!("{n} {unit}s")
            }
        };
        match (years, rest) {
            (0, m) => plural(m, "month"),
            (y, 0) => plural(y, "year"),
            (y, m) => format!("{} {}", plural(y, "year"), plural(m, "month")),
        }
    }
}

/// Whole calendar months from `from` to `to`, zero if `to` is earlier.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewBaby {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
}

impl Draft for NewBaby {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.name) {
            missing.push("name");
        }
        if self.birth_date.is_none() {
            missing.push("birth_date");
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BabyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
}

impl Entity for Baby {
    type Draft = NewBaby;
    type Patch = BabyPatch;

    const TABLE: &'static str = "babies";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 1, 31)), 0);
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 2, 14)), 0);
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 2, 15)), 1);
        assert_eq!(months_between(date(2023, 11, 30), date(2025, 6, 1)), 18);
        assert_eq!(months_between(date(2025, 6, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn test_age_label() {
        let baby = Baby {
            id: "b".into(),
            name: "Milo".into(),
            birth_date: date(2023, 4, 10),
            user_id: "u".into(),
            created_at: None,
        };
        assert_eq!(baby.age_label(date(2023, 5, 10)), "1 month");
        assert_eq!(baby.age_label(date(2024, 4, 10)), "1 year");
        assert_eq!(baby.age_label(date(2025, 9, 12)), "2 years 5 months");
    }

    #[test]
    fn test_new_baby_serializes_form_fields_only() {
        let draft = NewBaby {
            name: "Milo".into(),
            birth_date: Some(date(2025, 1, 15)),
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({"name": "Milo", "birth_date": "2025-01-15"})
        );
        assert!(draft.missing_fields().is_empty());
    }
}
