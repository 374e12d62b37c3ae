//! Referral codes, links and reward tiers.

use crate::models::{Referral, ReferralStatus};

const CODE_LEN: usize = 8;

/// The user's shareable code: the first eight characters of their id, upper-cased.
pub fn referral_code(user_id: &str) -> String {
    user_id
        .chars()
        .take(CODE_LEN)
        .collect::<String>()
        .to_uppercase()
}

pub fn referral_link(origin: &str, code: &str) -> String {
    format!("{}/signup?ref={}", origin.trim_end_matches('/'), code)
}

pub fn share_text(origin: &str, code: &str) -> String {
    format!(
        "Join me on BabySleep, the baby sleep tracker! Use my referral code {} to get started. {}",
        code,
        referral_link(origin, code)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    SevenDaysPremium,
    ThirtyDaysPremium,
    LifetimeSleepSounds,
    ThreeMonthsPremiumCustomBadge,
    LifetimePremium,
}

impl Reward {
    pub const TIERS: [Reward; 5] = [
        Reward::SevenDaysPremium,
        Reward::ThirtyDaysPremium,
        Reward::LifetimeSleepSounds,
        Reward::ThreeMonthsPremiumCustomBadge,
        Reward::LifetimePremium,
    ];

    /// Completed referrals needed to unlock this reward.
    pub fn threshold(&self) -> usize {
        match self {
            Reward::SevenDaysPremium => 1,
            Reward::ThirtyDaysPremium => 3,
            Reward::LifetimeSleepSounds => 5,
            Reward::ThreeMonthsPremiumCustomBadge => 10,
            Reward::LifetimePremium => 20,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Reward::SevenDaysPremium => "7_days_premium",
            Reward::ThirtyDaysPremium => "30_days_premium",
            Reward::LifetimeSleepSounds => "lifetime_sleep_sounds",
            Reward::ThreeMonthsPremiumCustomBadge => "3_months_premium_custom_badge",
            Reward::LifetimePremium => "lifetime_premium",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Reward::SevenDaysPremium => "7 Days Free Premium",
            Reward::ThirtyDaysPremium => "30 Days Free Premium",
            Reward::LifetimeSleepSounds => "Lifetime Sleep Sounds",
            Reward::ThreeMonthsPremiumCustomBadge => "3 Months Premium + Custom Badge",
            Reward::LifetimePremium => "Lifetime Premium Access",
        }
    }
}

pub fn unlocked_rewards(completed: usize) -> Vec<Reward> {
    Reward::TIERS
        .into_iter()
        .filter(|reward| completed >= reward.threshold())
        .collect()
}

/// The next locked reward and how many more completed referrals it needs.
pub fn next_reward(completed: usize) -> Option<(Reward, usize)> {
    Reward::TIERS
        .into_iter()
        .find(|reward| completed < reward.threshold())
        .map(|reward| (reward, reward.threshold() - completed))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferralStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub total_reward: f64,
}

impl ReferralStats {
    pub fn from_referrals(referrals: &[Referral]) -> Self {
        let completed = referrals
            .iter()
            .filter(|r| r.status == ReferralStatus::Completed)
            .count();
        Self {
            total: referrals.len(),
            completed,
            pending: referrals.len() - completed,
            total_reward: referrals.iter().map(|r| r.reward_amount).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn referral(status: ReferralStatus, reward: f64) -> Referral {
        Referral {
            id: "r".into(),
            referrer_id: "u".into(),
            referred_email: "friend@example.com".into(),
            status,
            reward_amount: reward,
            created_at: None,
        }
    }

    #[test]
    fn test_code_and_link() {
        let code = referral_code("3f2a9c1b-77aa-4c1e-9d0b-2b8f1e6a4c55");
        assert_eq!(code, "3F2A9C1B");
        assert_eq!(
            referral_link("https://babysleep.app/", &code),
            "https://babysleep.app/signup?ref=3F2A9C1B"
        );
        assert!(share_text("https://babysleep.app", &code).contains("ref=3F2A9C1B"));
    }

    #[test]
    fn test_unlocked_rewards_by_threshold() {
        assert!(unlocked_rewards(0).is_empty());
        assert_eq!(unlocked_rewards(1), vec![Reward::SevenDaysPremium]);
        let keys: Vec<_> = unlocked_rewards(10).iter().map(Reward::key).collect();
        assert_eq!(
            keys,
            vec![
                "7_days_premium",
                "30_days_premium",
                "lifetime_sleep_sounds",
                "3_months_premium_custom_badge"
            ]
        );
        assert_eq!(unlocked_rewards(25).len(), 5);
    }

    #[test]
    fn test_next_reward() {
        assert_eq!(next_reward(0), Some((Reward::SevenDaysPremium, 1)));
        assert_eq!(next_reward(4), Some((Reward::LifetimeSleepSounds, 1)));
        assert_eq!(next_reward(20), None);
    }

    #[test]
    fn test_stats() {
        let stats = ReferralStats::from_referrals(&[
            referral(ReferralStatus::Completed, 5.0),
            referral(ReferralStatus::Completed, 5.0),
            referral(ReferralStatus::Pending, 0.0),
        ]);
        assert_eq!(
            stats,
            ReferralStats {
                total: 3,
                completed: 2,
                pending: 1,
                total_reward: 10.0
            }
        );
    }
}
