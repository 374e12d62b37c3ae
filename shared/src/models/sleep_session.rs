use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};
use crate::backend::Order;

/// One monitored night or nap, as recorded by the sleep monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub id: String,
    pub baby_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub movements: u32,
    #[serde(default)]
    pub cries_detected: u32,
    #[serde(default)]
    pub safety_alerts: u32,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub position_changes: u32,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SleepSession {
    pub fn duration_hours(&self) -> f64 {
        self.duration.unwrap_or(0.0) / 60.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSleepSession {
    pub baby_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    pub movements: u32,
    pub cries_detected: u32,
    pub safety_alerts: u32,
    pub temperature: f64,
    pub humidity: f64,
    pub position_changes: u32,
}

impl Draft for NewSleepSession {
    fn missing_fields(&self) -> Vec<&'static str> {
        if is_blank(&self.baby_id) {
            vec!["baby_id"]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SleepSessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

impl Entity for SleepSession {
    type Draft = NewSleepSession;
    type Patch = SleepSessionPatch;

    const TABLE: &'static str = "sleep_sessions";

    fn id(&self) -> &str {
        &self.id
    }

    fn default_order() -> Option<Order> {
        Some(Order::asc("start_time"))
    }
}
