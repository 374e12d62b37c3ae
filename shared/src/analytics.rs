//! Sleep analytics: chart series, summary statistics and dashboard wake polling.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

use crate::backend::Filter;
use crate::models::{SleepLog, SleepSession};

/// Total hours slept per calendar day of `sleep_time`. Open logs are skipped.
pub fn sleep_hours_per_day(logs: &[SleepLog]) -> BTreeMap<NaiveDate, f64> {
    let mut per_day = BTreeMap::new();
    for log in logs {
        if let Some(hours) = log.duration_hours() {
            *per_day.entry(log.sleep_time.date_naive()).or_insert(0.0) += hours;
        }
    }
    per_day
}

pub fn average_rating(logs: &[SleepLog]) -> Option<f64> {
    let ratings: Vec<f64> = logs
        .iter()
        .filter_map(|log| log.quality_rating.map(f64::from))
        .collect();
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

pub fn quality_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 40.0 {
        "Fair"
    } else {
        "Poor"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

/// Summary over monitored sessions, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepStats {
    pub total_sessions: usize,
    pub total_sleep_hours: f64,
    pub avg_quality: f64,
    pub avg_movements: f64,
    pub total_cries: u32,
    pub total_alerts: u32,
    /// Average quality of the last seven sessions.
    pub recent_avg_quality: f64,
    pub trend: Trend,
}

const RECENT_SESSIONS: usize = 7;

impl SleepStats {
    pub fn from_sessions(sessions: &[SleepSession]) -> Option<Self> {
        if sessions.is_empty() {
            return None;
        }
        let count = sessions.len() as f64;
        let avg_quality_of = |slice: &[SleepSession]| {
            slice
                .iter()
                .map(|s| s.quality_score.unwrap_or(0.0))
                .sum::<f64>()
                / slice.len() as f64
        };

        let avg_quality = avg_quality_of(sessions);
        let recent = &sessions[sessions.len().saturating_sub(RECENT_SESSIONS)..];
        let recent_avg_quality = avg_quality_of(recent);

        Some(Self {
            total_sessions: sessions.len(),
            total_sleep_hours: sessions.iter().map(SleepSession::duration_hours).sum(),
            avg_quality,
            avg_movements: sessions.iter().map(|s| s.movements as f64).sum::<f64>() / count,
            total_cries: sessions.iter().map(|s| s.cries_detected).sum(),
            total_alerts: sessions.iter().map(|s| s.safety_alerts).sum(),
            recent_avg_quality,
            trend: if recent_avg_quality > avg_quality {
                Trend::Up
            } else {
                Trend::Down
            },
        })
    }
}

/// Analytics window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Quarter,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Week, TimeRange::Month, TimeRange::Quarter];

    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "90d",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|range| range.label() == raw)
    }

    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }

    /// `column >= start` list filter.
    pub fn filter(&self, column: &str, now: DateTime<Utc>) -> Filter {
        Filter::gte(
            column,
            self.start(now).to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

/// Detects a newly completed sleep between dashboard polls.
///
/// The first observation only primes the watcher, so opening the dashboard
/// never announces an old wake-up.
#[derive(Debug, Clone, Default)]
pub struct WakeWatcher {
    primed: bool,
    last_seen: Option<String>,
}

impl WakeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Returns the newest completed log if it was not seen on an earlier poll.
    pub fn observe<'a>(&mut self, logs: &'a [SleepLog]) -> Option<&'a SleepLog> {
        let newest = logs
            .iter()
            .filter(|log| log.is_complete())
            .max_by_key(|log| log.wake_time);

        let was_primed = std::mem::replace(&mut self.primed, true);
        let newest = newest?;
        if self.last_seen.as_deref() == Some(newest.id.as_str()) {
            return None;
        }
        self.last_seen = Some(newest.id.clone());
        was_primed.then_some(newest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn log(id: &str, sleep: DateTime<Utc>, wake: Option<DateTime<Utc>>) -> SleepLog {
        SleepLog {
            id: id.into(),
            baby_id: "b".into(),
            sleep_time: sleep,
            wake_time: wake,
            quality_rating: None,
            notes: None,
            user_id: "u".into(),
            created_at: None,
        }
    }

    fn session(quality: f64, minutes: f64) -> SleepSession {
        SleepSession {
            id: "s".into(),
            baby_id: "b".into(),
            start_time: at(1, 20),
            end_time: None,
            duration: Some(minutes),
            quality_score: Some(quality),
            movements: 4,
            cries_detected: 1,
            safety_alerts: 0,
            temperature: 21.0,
            humidity: 50.0,
            position_changes: 2,
            user_id: "u".into(),
            created_at: None,
        }
    }

    #[test]
    fn test_hours_per_day() {
        let logs = vec![
            log("a", at(1, 13), Some(at(1, 15))),
            log("b", at(1, 20), Some(at(2, 6))),
            log("c", at(2, 13), None),
        ];
        let per_day = sleep_hours_per_day(&logs);

        assert_eq!(per_day.len(), 1);
        assert_eq!(per_day[&at(1, 0).date_naive()], 12.0);
    }

    #[test]
    fn test_quality_label_boundaries() {
        assert_eq!(quality_label(80.0), "Excellent");
        assert_eq!(quality_label(79.9), "Good");
        assert_eq!(quality_label(60.0), "Good");
        assert_eq!(quality_label(40.0), "Fair");
        assert_eq!(quality_label(39.0), "Poor");
    }

    #[test]
    fn test_stats_and_trend() {
        assert!(SleepStats::from_sessions(&[]).is_none());

        let mut sessions: Vec<_> = (0..3).map(|_| session(40.0, 600.0)).collect();
        sessions.extend((0..7).map(|_| session(90.0, 600.0)));
        let stats = SleepStats::from_sessions(&sessions).unwrap();

        assert_eq!(stats.total_sessions, 10);
        assert_eq!(stats.total_sleep_hours, 100.0);
        assert_eq!(stats.avg_quality, 75.0);
        assert_eq!(stats.recent_avg_quality, 90.0);
        assert_eq!(stats.trend, Trend::Up);
        assert_eq!(stats.total_cries, 10);
        assert_eq!(stats.avg_movements, 4.0);
    }

    #[test]
    fn test_time_range_filter() {
        let filter = TimeRange::Month.filter("start_time", at(30, 12));
        assert_eq!(filter.to_query_value(), "gte.2025-05-31T12:00:00Z");
        assert_eq!(TimeRange::parse("90d"), Some(TimeRange::Quarter));
    }

    #[test]
    fn test_wake_watcher_reports_each_wake_once() {
        let mut watcher = WakeWatcher::new();
        let mut logs = vec![log("a", at(1, 20), Some(at(2, 6)))];

        // Priming poll.
        assert!(watcher.observe(&logs).is_none());
        assert_eq!(watcher.last_seen(), Some("a"));
        // Nothing new.
        assert!(watcher.observe(&logs).is_none());

        logs.push(log("b", at(2, 13), None));
        assert!(watcher.observe(&logs).is_none());

        logs[1].wake_time = Some(at(2, 15));
        assert_eq!(watcher.observe(&logs).map(|l| l.id.as_str()), Some("b"));
        assert!(watcher.observe(&logs).is_none());
    }

    #[test]
    fn test_wake_watcher_primed_on_empty_list() {
        let mut watcher = WakeWatcher::new();
        assert!(watcher.observe(&[]).is_none());

        let logs = vec![log("a", at(1, 20), Some(at(2, 6)))];
        assert_eq!(watcher.observe(&logs).map(|l| l.id.as_str()), Some("a"));
    }
}
