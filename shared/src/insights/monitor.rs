use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::models::NewSleepSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    FaceCovered,
    Rollover,
    CryDetected,
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafetyAlert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub at: DateTime<Utc>,
    pub resolved: bool,
}

impl SafetyAlert {
    fn new(kind: AlertKind, severity: Severity, message: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity,
            message: message.to_string(),
            at,
            resolved: false,
        }
    }

    /// Cry alerts are tallied as cries, everything else as a safety alert.
    pub fn is_safety(&self) -> bool {
        self.kind != AlertKind::CryDetected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Back,
    Side,
    Tummy,
}

const POSITIONS: [Position; 3] = [Position::Back, Position::Side, Position::Tummy];

/// One simulated sensor reading.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorObservation {
    pub at: DateTime<Utc>,
    pub movement: bool,
    pub position_changed: bool,
    pub temperature: f64,
    pub humidity: f64,
    pub alerts: Vec<SafetyAlert>,
}

impl MonitorObservation {
    pub fn cry_detected(&self) -> bool {
        self.alerts.iter().any(|a| a.kind == AlertKind::CryDetected)
    }
}

pub trait SleepMonitor {
    fn tick(&mut self, now: DateTime<Utc>) -> MonitorObservation;
}

const COMFORT_TEMPERATURE: (f64, f64) = (16.0, 26.0);
const COMFORT_HUMIDITY: (f64, f64) = (30.0, 70.0);

pub struct SimulatedSleepMonitor<R: Rng = StdRng> {
    rng: R,
    temperature: f64,
    humidity: f64,
    position: Position,
}

impl SimulatedSleepMonitor<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for SimulatedSleepMonitor<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedSleepMonitor<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            temperature: 22.0,
            humidity: 50.0,
            position: Position::Back,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }
}

impl<R: Rng> SleepMonitor for SimulatedSleepMonitor<R> {
    fn tick(&mut self, now: DateTime<Utc>) -> MonitorObservation {
        self.temperature += (self.rng.gen::<f64>() - 0.5) * 2.0;
        self.humidity = (self.humidity + (self.rng.gen::<f64>() - 0.5) * 5.0).clamp(0.0, 100.0);

        let mut alerts = Vec::new();

        if self.rng.gen::<f64>() > 0.95 {
            alerts.push(SafetyAlert::new(
                AlertKind::FaceCovered,
                Severity::Critical,
                "Baby's face appears to be covered!",
                now,
            ));
        }

        let position = POSITIONS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Position::Back);
        let position_changed = position != self.position;
        self.position = position;
        if position == Position::Tummy && self.rng.gen::<f64>() > 0.8 {
            alerts.push(SafetyAlert::new(
                AlertKind::Rollover,
                Severity::High,
                "Baby has rolled to tummy position!",
                now,
            ));
        }

        if self.rng.gen_bool(0.15) {
            alerts.push(SafetyAlert::new(
                AlertKind::CryDetected,
                Severity::Medium,
                "Baby is crying - attention needed",
                now,
            ));
        }

        if !(COMFORT_TEMPERATURE.0..=COMFORT_TEMPERATURE.1).contains(&self.temperature) {
            alerts.push(SafetyAlert::new(
                AlertKind::Temperature,
                Severity::Medium,
                "Room temperature is outside the comfortable range",
                now,
            ));
        }
        if !(COMFORT_HUMIDITY.0..=COMFORT_HUMIDITY.1).contains(&self.humidity) {
            alerts.push(SafetyAlert::new(
                AlertKind::Humidity,
                Severity::Low,
                "Room humidity is outside the comfortable range",
                now,
            ));
        }

        MonitorObservation {
            at: now,
            movement: self.rng.gen_bool(0.3),
            position_changed,
            temperature: self.temperature,
            humidity: self.humidity,
            alerts,
        }
    }
}

/// Session score: starts at 100, loses 10 per safety alert, 5 per cry and up to
/// 20 for movement, gains 10 each for an 18-22 °C room and 40-60 % humidity.
pub fn sleep_quality_score(
    safety_alerts: u32,
    cries_detected: u32,
    movements: u32,
    temperature: f64,
    humidity: f64,
) -> f64 {
    let mut score = 100i64;
    score -= i64::from(safety_alerts) * 10;
    score -= i64::from(cries_detected) * 5;
    score -= (i64::from(movements) * 2).min(20);
    if (18.0..=22.0).contains(&temperature) {
        score += 10;
    }
    if (40.0..=60.0).contains(&humidity) {
        score += 10;
    }
    score.clamp(0, 100) as f64
}

/// Accumulates monitor observations into a `sleep_sessions` row.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepSessionRecorder {
    baby_id: String,
    start_time: DateTime<Utc>,
    movements: u32,
    cries_detected: u32,
    safety_alerts: u32,
    position_changes: u32,
    temperature: f64,
    humidity: f64,
}

impl SleepSessionRecorder {
    pub fn start(
        baby_id: impl Into<String>,
        start_time: DateTime<Utc>,
        temperature: f64,
        humidity: f64,
    ) -> Self {
        Self {
            baby_id: baby_id.into(),
            start_time,
            movements: 0,
            cries_detected: 0,
            safety_alerts: 0,
            position_changes: 0,
            temperature,
            humidity,
        }
    }

    pub fn record(&mut self, observation: &MonitorObservation) {
        if observation.movement {
            self.movements += 1;
        }
        if observation.position_changed {
            self.position_changes += 1;
        }
        for alert in &observation.alerts {
            if alert.is_safety() {
                self.safety_alerts += 1;
            } else {
                self.cries_detected += 1;
            }
        }
        self.temperature = observation.temperature;
        self.humidity = observation.humidity;
    }

    pub fn movements(&self) -> u32 {
        self.movements
    }

    pub fn cries_detected(&self) -> u32 {
        self.cries_detected
    }

    pub fn safety_alerts(&self) -> u32 {
        self.safety_alerts
    }

    pub fn current_score(&self) -> f64 {
        sleep_quality_score(
            self.safety_alerts,
            self.cries_detected,
            self.movements,
            self.temperature,
            self.humidity,
        )
    }

    pub fn finish(self, end_time: DateTime<Utc>) -> NewSleepSession {
        let minutes = (end_time - self.start_time).num_seconds().max(0) as f64 / 60.0;
        let quality_score = self.current_score();
        NewSleepSession {
            baby_id: self.baby_id,
            start_time: self.start_time,
            end_time: Some(end_time),
            duration: Some(minutes),
            quality_score: Some(quality_score),
            movements: self.movements,
            cries_detected: self.cries_detected,
            safety_alerts: self.safety_alerts,
            temperature: self.temperature,
            humidity: self.humidity,
            position_changes: self.position_changes,
        }
    }
}
