use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::access::{Draft, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub referrer_id: String,
    pub referred_email: String,
    pub status: ReferralStatus,
    #[serde(default)]
    pub reward_amount: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An invitation sent by email; completed once the invitee signs up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReferral {
    pub referred_email: String,
    pub status: ReferralStatus,
    pub reward_amount: f64,
}

impl NewReferral {
    pub fn invite(email: impl Into<String>) -> Self {
        Self {
            referred_email: email.into().trim().to_string(),
            status: ReferralStatus::Pending,
            reward_amount: 0.0,
        }
    }
}

impl Draft for NewReferral {
    fn missing_fields(&self) -> Vec<&'static str> {
        if is_blank(&self.referred_email) {
            vec!["referred_email"]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferralPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReferralStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_amount: Option<f64>,
}

impl Entity for Referral {
    type Draft = NewReferral;
    type Patch = ReferralPatch;

    const TABLE: &'static str = "referrals";
    const OWNER_COLUMN: &'static str = "referrer_id";

    fn id(&self) -> &str {
        &self.id
    }
}
