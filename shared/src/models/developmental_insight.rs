use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};
use crate::insights::SleepGuideline;

/// A milestone and how it changes sleep, kept per baby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentalInsight {
    pub id: String,
    pub baby_id: String,
    pub age_group: String,
    pub milestone: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub sleep_adjustment: String,
    #[serde(default)]
    pub tips: Vec<String>,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewDevelopmentalInsight {
    pub baby_id: String,
    pub age_group: String,
    pub milestone: String,
    pub impact: String,
    pub sleep_adjustment: String,
    pub tips: Vec<String>,
}

impl NewDevelopmentalInsight {
    /// Seed an insight from the age guideline, leaving the milestone to the parent.
    pub fn from_guideline(baby_id: impl Into<String>, guideline: &SleepGuideline) -> Self {
        Self {
            baby_id: baby_id.into(),
            age_group: guideline.age_group.to_string(),
            milestone: String::new(),
            impact: String::new(),
            sleep_adjustment: format!(
                "Aim for {} total with {} and wake windows of {}",
                guideline.total_sleep, guideline.naps, guideline.wake_windows
            ),
            tips: guideline.tips.iter().map(|tip| tip.to_string()).collect(),
        }
    }
}

impl Draft for NewDevelopmentalInsight {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.baby_id) {
            missing.push("baby_id");
        }
        if is_blank(&self.milestone) {
            missing.push("milestone");
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DevelopmentalInsightPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_adjustment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}

impl Entity for DevelopmentalInsight {
    type Draft = NewDevelopmentalInsight;
    type Patch = DevelopmentalInsightPatch;

    const TABLE: &'static str = "developmental_insights";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One tip per non-empty line.
pub fn parse_tips(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::guideline_for_age;

    #[test]
    fn test_decodes_row_without_tips() {
        let row = serde_json::json!({
            "id": "i1",
            "baby_id": "b1",
            "age_group": "6-8 months",
            "milestone": "Crawling",
            "user_id": "u1"
        });
        let insight: DevelopmentalInsight = serde_json::from_value(row).unwrap();
        assert!(insight.tips.is_empty());
        assert_eq!(insight.impact, "");
    }

    #[test]
    fn test_from_guideline() {
        let guideline = guideline_for_age(4);
        let draft = NewDevelopmentalInsight::from_guideline("b1", guideline);

        assert_eq!(draft.age_group, guideline.age_group);
        assert_eq!(draft.tips.len(), guideline.tips.len());
        assert!(draft.sleep_adjustment.contains(guideline.total_sleep));
        assert_eq!(draft.missing_fields(), vec!["milestone"]);
    }

    #[test]
    fn test_parse_tips() {
        assert_eq!(
            parse_tips("Keep naps early\n\n  Dim the lights  \n"),
            vec!["Keep naps early".to_string(), "Dim the lights".to_string()]
        );
        assert!(parse_tips("   ").is_empty());
    }
}
