use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Artificial "thinking" time the analyzer view waits before showing a result.
pub const ANALYSIS_DELAY_MS: u32 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryCategory {
    Hunger,
    Tired,
    Pain,
    Discomfort,
    Attention,
    Unknown,
}

/// Selection weights; they sum to 1.
pub const CRY_WEIGHTS: [(CryCategory, f64); 6] = [
    (CryCategory::Hunger, 0.30),
    (CryCategory::Tired, 0.25),
    (CryCategory::Pain, 0.15),
    (CryCategory::Discomfort, 0.20),
    (CryCategory::Attention, 0.08),
    (CryCategory::Unknown, 0.02),
];

impl CryCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CryCategory::Hunger => "Hunger",
            CryCategory::Tired => "Tired",
            CryCategory::Pain => "Pain",
            CryCategory::Discomfort => "Discomfort",
            CryCategory::Attention => "Attention",
            CryCategory::Unknown => "Unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            CryCategory::Hunger => "🍼",
            CryCategory::Tired => "😴",
            CryCategory::Pain => "😣",
            CryCategory::Discomfort => "😖",
            CryCategory::Attention => "👶",
            CryCategory::Unknown => "❓",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CryCategory::Hunger => "Baby needs to be fed",
            CryCategory::Tired => "Baby needs sleep",
            CryCategory::Pain => "Baby is in pain or discomfort",
            CryCategory::Discomfort => "Baby is uncomfortable (wet diaper, gas, etc.)",
            CryCategory::Attention => "Baby wants attention or comfort",
            CryCategory::Unknown => "Unable to determine the cause",
        }
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            CryCategory::Hunger => &[
                "Try feeding your baby",
                "Check if it's been 2-3 hours since the last feeding",
                "Offer breast or bottle",
                "Look for hunger cues (rooting, sucking on hands)",
            ],
            CryCategory::Tired => &[
                "Create a calm environment",
                "Try gentle rocking or swaying",
                "Use white noise or lullabies",
                "Establish a bedtime routine",
                "Check if baby is overtired",
            ],
            CryCategory::Pain => &[
                "Check for signs of illness",
                "Look for diaper rash or irritation",
                "Check for gas or colic",
                "Consider teething if baby is 4+ months",
                "Contact your pediatrician if concerned",
            ],
            CryCategory::Discomfort => &[
                "Check the diaper, it may need changing",
                "Try burping if recently fed",
                "Check clothing for tags or tightness",
                "Ensure a comfortable room temperature",
                "Try a gentle tummy massage for gas",
            ],
            CryCategory::Attention => &[
                "Provide gentle comfort and cuddling",
                "Try skin-to-skin contact",
                "Talk or sing softly to baby",
                "Offer a pacifier",
                "Check if baby needs to be held",
            ],
            CryCategory::Unknown => &[
                "Try different soothing techniques",
                "Check all basic needs (hunger, diaper, sleep)",
                "Consider if baby is overstimulated",
                "Try gentle movement or rocking",
                "Contact your pediatrician if crying persists",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn from_duration(seconds: u32) -> Self {
        if seconds > 30 {
            Intensity::High
        } else if seconds > 15 {
            Intensity::Medium
        } else {
            Intensity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }
}

/// A finished recording handed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CrySample {
    pub duration_secs: u32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CryAnalysis {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub category: CryCategory,
    /// In `[60, 100)`.
    pub confidence_percentage: f64,
    pub intensity: Intensity,
    pub suggestions: Vec<&'static str>,
}

pub trait CryClassifier {
    fn classify(&mut self, sample: &CrySample) -> CryAnalysis;
}

/// Picks an entry by cumulative weight for a uniform draw in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct WeightedTable<T: Copy> {
    entries: Vec<(T, f64)>,
    fallback: T,
}

impl<T: Copy> WeightedTable<T> {
    pub fn new(entries: &[(T, f64)], fallback: T) -> Self {
        Self {
            entries: entries.to_vec(),
            fallback,
        }
    }

    pub fn pick(&self, draw: f64) -> T {
        let mut cumulative = 0.0;
        for (value, weight) in &self.entries {
            cumulative += weight;
            if draw <= cumulative {
                return *value;
            }
        }
        self.fallback
    }
}

pub struct SimulatedCryClassifier<R: Rng = StdRng> {
    rng: R,
    table: WeightedTable<CryCategory>,
}

impl SimulatedCryClassifier<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for SimulatedCryClassifier<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedCryClassifier<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            table: WeightedTable::new(&CRY_WEIGHTS, CryCategory::Unknown),
        }
    }
}

impl<R: Rng> CryClassifier for SimulatedCryClassifier<R> {
    fn classify(&mut self, sample: &CrySample) -> CryAnalysis {
        let category = self.table.pick(self.rng.gen::<f64>());
        let confidence_percentage = self.rng.gen_range(60.0..100.0);

        CryAnalysis {
            id: Uuid::new_v4(),
            recorded_at: sample.recorded_at,
            duration_secs: sample.duration_secs,
            category,
            confidence_percentage,
            intensity: Intensity::from_duration(sample.duration_secs),
            suggestions: category.suggestions().iter().take(3).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample(duration_secs: u32) -> CrySample {
        CrySample {
            duration_secs,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_pick_uses_cumulative_weights() {
        let table = WeightedTable::new(&CRY_WEIGHTS, CryCategory::Unknown);
        assert_eq!(table.pick(0.0), CryCategory::Hunger);
        assert_eq!(table.pick(0.30), CryCategory::Hunger);
        assert_eq!(table.pick(0.31), CryCategory::Tired);
        assert_eq!(table.pick(0.60), CryCategory::Pain);
        assert_eq!(table.pick(0.85), CryCategory::Discomfort);
        assert_eq!(table.pick(0.95), CryCategory::Attention);
        assert_eq!(table.pick(0.999), CryCategory::Unknown);
        assert_eq!(table.pick(1.5), CryCategory::Unknown);
    }

    #[test]
    fn test_category_frequencies_follow_weights() {
        let mut classifier = SimulatedCryClassifier::with_rng(StdRng::seed_from_u64(7));
        let draws = 1000;
        let mut counts: HashMap<CryCategory, usize> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(classifier.classify(&sample(10)).category).or_default() += 1;
        }

        for (category, weight) in CRY_WEIGHTS {
            let observed = counts.get(&category).copied().unwrap_or(0) as f64 / draws as f64;
            assert!(
                (observed - weight).abs() < 0.06,
                "{:?}: observed {} expected {}",
                category,
                observed,
                weight
            );
        }
    }

    #[test]
    fn test_confidence_and_suggestions() {
        let mut classifier = SimulatedCryClassifier::with_rng(StdRng::seed_from_u64(1));
        for _ in 0..200 {
            let analysis = classifier.classify(&sample(20));
            assert!((60.0..100.0).contains(&analysis.confidence_percentage));
            assert_eq!(analysis.suggestions.len(), 3);
            assert_eq!(
                analysis.suggestions.as_slice(),
                &analysis.category.suggestions()[..3]
            );
        }
    }

    #[test]
    fn test_intensity_thresholds() {
        assert_eq!(Intensity::from_duration(15), Intensity::Low);
        assert_eq!(Intensity::from_duration(16), Intensity::Medium);
        assert_eq!(Intensity::from_duration(30), Intensity::Medium);
        assert_eq!(Intensity::from_duration(31), Intensity::High);
    }
}
