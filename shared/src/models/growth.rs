use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};
use crate::backend::Order;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub id: String,
    pub baby_id: String,
    pub date: NaiveDate,
    /// kg
    #[serde(default)]
    pub weight: Option<f64>,
    /// cm
    #[serde(default)]
    pub height: Option<f64>,
    /// cm
    #[serde(default)]
    pub head_circumference: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl GrowthRecord {
    pub fn measure(&self, measure: GrowthMeasure) -> Option<f64> {
        match measure {
            GrowthMeasure::Weight => self.weight,
            GrowthMeasure::Height => self.height,
            GrowthMeasure::HeadCircumference => self.head_circumference,
        }
    }

    /// Age at measurement as (months, days), using 30.44-day months.
    pub fn age_at_measurement(&self, birth_date: NaiveDate) -> (i64, i64) {
        let days = (self.date - birth_date).num_days().abs();
        ((days as f64 / 30.44).floor() as i64, days % 30)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthMeasure {
    Weight,
    Height,
    HeadCircumference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthTrend {
    pub change: f64,
    pub daily_change: f64,
    pub direction: TrendDirection,
}

impl GrowthTrend {
    /// Compare the last two records (oldest first). None without two values.
    pub fn from_records(records: &[GrowthRecord], measure: GrowthMeasure) -> Option<Self> {
        let [previous, current] = records.get(records.len().checked_sub(2)?..)? else {
            return None;
        };
        let change = current.measure(measure)? - previous.measure(measure)?;
        let days = (current.date - previous.date).num_days();
        let daily_change = if days == 0 { 0.0 } else { change / days as f64 };
        let direction = if change > 0.0 {
            TrendDirection::Up
        } else if change < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };
        Some(Self {
            change,
            daily_change,
            direction,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewGrowthRecord {
    pub baby_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_circumference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Draft for NewGrowthRecord {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.baby_id) {
            missing.push("baby_id");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GrowthPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub head_circumference: Option<f64>,
    pub notes: Option<String>,
}

impl Entity for GrowthRecord {
    type Draft = NewGrowthRecord;
    type Patch = GrowthPatch;

    const TABLE: &'static str = "growth_records";

    fn id(&self) -> &str {
        &self.id
    }

    fn default_order() -> Option<Order> {
        Some(Order::asc("date"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: NaiveDate, weight: Option<f64>) -> GrowthRecord {
        GrowthRecord {
            id: "g".into(),
            baby_id: "b".into(),
            date,
            weight,
            height: None,
            head_circumference: None,
            notes: None,
            user_id: "u".into(),
            created_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trend_uses_last_two_records() {
        let records = vec![
            record(date(2025, 3, 1), Some(5.0)),
            record(date(2025, 4, 1), Some(5.6)),
            record(date(2025, 4, 11), Some(6.1)),
        ];
        let trend = GrowthTrend::from_records(&records, GrowthMeasure::Weight).unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!((trend.change - 0.5).abs() < 1e-9);
        assert!((trend.daily_change - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_trend_needs_two_values() {
        assert!(GrowthTrend::from_records(&[], GrowthMeasure::Weight).is_none());
        let records = vec![
            record(date(2025, 3, 1), Some(5.0)),
            record(date(2025, 4, 1), None),
        ];
        assert!(GrowthTrend::from_records(&records, GrowthMeasure::Weight).is_none());
        assert!(GrowthTrend::from_records(&records, GrowthMeasure::Height).is_none());
    }

    #[test]
    fn test_age_at_measurement() {
        let r = record(date(2025, 4, 1), None);
        assert_eq!(r.age_at_measurement(date(2025, 1, 1)), (2, 0));
    }

    #[test]
    fn test_patch_clears_optional_measurements() {
        let patch = GrowthPatch {
            weight: Some(6.2),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["weight"], 6.2);
        assert!(value["height"].is_null());
        assert!(value.get("date").is_none());
    }
}
