//! # Simulated intelligence widgets
//!
//! The cry analyzer, the sleep consultant chatbot and the sleep monitor all
//! produce randomized placeholder output. Each sits behind a narrow trait
//! ([`CryClassifier`], [`InsightGenerator`], [`SleepMonitor`]) so views never see
//! weights or random draws, and tests can drive them with a seeded RNG.

mod consultant;
mod cry;
mod monitor;

pub use consultant::{
    guideline_for_age, InsightGenerator, SleepConsultant, SleepGuideline, QUICK_TOPICS,
    SLEEP_GUIDELINES, WELCOME_MESSAGE,
};
pub use cry::{
    CryAnalysis, CryCategory, CryClassifier, CrySample, Intensity, SimulatedCryClassifier,
    WeightedTable, ANALYSIS_DELAY_MS, CRY_WEIGHTS,
};
pub use monitor::{
    sleep_quality_score, AlertKind, MonitorObservation, SafetyAlert, Severity,
    SimulatedSleepMonitor, SleepMonitor, SleepSessionRecorder,
};
