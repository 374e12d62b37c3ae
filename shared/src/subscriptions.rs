//! Premium plans and the rules for the signed-in user's current plan.
//!
//! Payment is simulated: subscribing inserts an active `user_subscriptions`
//! row covering one billing period, cancelling flips its status.

use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::Serialize;

use crate::access::{Draft, EntityAccess};
use crate::backend::TableApi;
use crate::error::AccessError;
use crate::models::{SubscriptionPatch, SubscriptionRecord, SubscriptionStatus};

pub const CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingInterval {
    Month,
    Year,
}

impl BillingInterval {
    pub fn period_days(&self) -> i64 {
        match self {
            BillingInterval::Month => 30,
            BillingInterval::Year => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub interval: BillingInterval,
    pub features: &'static [&'static str],
    pub popular: bool,
}

impl Plan {
    pub fn is_free(&self) -> bool {
        self.price == 0.0
    }
}

const PREMIUM_FEATURES: &[&str] = &[
    "🤖 AI Sleep Consultant",
    "📹 Sleep Monitoring",
    "🧠 Cry Analyzer",
    "📊 Advanced Sleep Analytics",
    "📏 Growth & Development Tracking",
    "📱 Comprehensive Baby Tracking",
    "🎁 Referral Rewards Program",
];

pub const FREE_PLAN: Plan = Plan {
    id: "free",
    name: "Free Plan",
    price: 0.0,
    interval: BillingInterval::Month,
    features: &[
        "Basic sleep tracking",
        "Simple sleep logs",
        "Basic baby profile",
        "Limited analytics",
    ],
    popular: false,
};

pub const PREMIUM_MONTHLY: Plan = Plan {
    id: "premium-monthly",
    name: "Premium Monthly",
    price: 9.99,
    interval: BillingInterval::Month,
    features: PREMIUM_FEATURES,
    popular: true,
};

pub const PREMIUM_YEARLY: Plan = Plan {
    id: "premium-yearly",
    name: "Premium Yearly",
    price: 99.99,
    interval: BillingInterval::Year,
    features: PREMIUM_FEATURES,
    popular: false,
};

pub static PLANS: [Plan; 3] = [FREE_PLAN, PREMIUM_MONTHLY, PREMIUM_YEARLY];

pub fn plan_by_id(id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|plan| plan.id == id)
}

/// Insert payload for a new subscription period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionDraft {
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub amount: f64,
    pub currency: String,
}

impl SubscriptionDraft {
    pub fn for_plan(plan: &Plan, now: DateTime<Utc>) -> Self {
        Self {
            plan_id: plan.id.to_string(),
            status: SubscriptionStatus::Active,
            current_period_start: now,
            current_period_end: now + Duration::days(plan.interval.period_days()),
            amount: plan.price,
            currency: CURRENCY.to_string(),
        }
    }
}

impl Draft for SubscriptionDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        if self.plan_id.trim().is_empty() {
            vec!["plan_id"]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CurrentPlan {
    Free,
    Premium {
        plan_id: String,
        period_end: DateTime<Utc>,
    },
}

impl CurrentPlan {
    pub fn is_premium(&self) -> bool {
        matches!(self, CurrentPlan::Premium { .. })
    }
}

/// Premium iff an active subscription whose period has not ended exists.
pub fn current_plan(subscriptions: &[SubscriptionRecord], now: DateTime<Utc>) -> CurrentPlan {
    subscriptions
        .iter()
        .filter(|s| s.is_current(now))
        .max_by_key(|s| s.current_period_end)
        .map(|s| CurrentPlan::Premium {
            plan_id: s.plan_id.clone(),
            period_end: s.current_period_end,
        })
        .unwrap_or(CurrentPlan::Free)
}

pub async fn subscribe<B: TableApi + ?Sized>(
    access: &EntityAccess<SubscriptionRecord, B>,
    plan: &Plan,
    owner: Option<&str>,
    now: DateTime<Utc>,
) -> Result<SubscriptionRecord, AccessError> {
    let record = access
        .create(&SubscriptionDraft::for_plan(plan, now), owner)
        .await?;
    info!("💳 Subscribed to {} until {}", plan.id, record.current_period_end);
    Ok(record)
}

/// Mark every active subscription as cancelled. Returns how many were changed.
pub async fn cancel_active<B: TableApi + ?Sized>(
    access: &EntityAccess<SubscriptionRecord, B>,
    subscriptions: &[SubscriptionRecord],
) -> Result<usize, AccessError> {
    let patch = SubscriptionPatch {
        status: Some(SubscriptionStatus::Cancelled),
    };
    let mut cancelled = 0;
    for subscription in subscriptions
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Active)
    {
        access.update(&subscription.id, &patch).await?;
        cancelled += 1;
    }
    info!("🛑 Cancelled {} subscription(s)", cancelled);
    Ok(cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthApi, Credentials};
    use crate::testing::InMemoryBackend;
    use chrono::TimeZone;
    use std::rc::Rc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 27, 12, 0, 0).unwrap()
    }

    fn record(status: SubscriptionStatus, end: DateTime<Utc>) -> SubscriptionRecord {
        SubscriptionRecord {
            id: "s".into(),
            user_id: "u".into(),
            plan_id: "premium-monthly".into(),
            status,
            current_period_start: end - Duration::days(30),
            current_period_end: end,
            amount: 9.99,
            currency: "USD".into(),
            created_at: None,
        }
    }

    #[test]
    fn test_draft_covers_one_billing_period() {
        let monthly = SubscriptionDraft::for_plan(&PREMIUM_MONTHLY, now());
        assert_eq!(monthly.current_period_end - monthly.current_period_start, Duration::days(30));
        assert_eq!(monthly.amount, 9.99);
        assert_eq!(monthly.currency, "USD");

        let yearly = SubscriptionDraft::for_plan(&PREMIUM_YEARLY, now());
        assert_eq!(yearly.current_period_end - yearly.current_period_start, Duration::days(365));
        assert_eq!(yearly.amount, 99.99);
    }

    #[test]
    fn test_current_plan() {
        assert_eq!(current_plan(&[], now()), CurrentPlan::Free);

        let active = record(SubscriptionStatus::Active, now() + Duration::days(3));
        assert!(current_plan(&[active], now()).is_premium());

        let cancelled = record(SubscriptionStatus::Cancelled, now() + Duration::days(3));
        assert_eq!(current_plan(&[cancelled], now()), CurrentPlan::Free);

        let lapsed = record(SubscriptionStatus::Active, now() - Duration::days(1));
        assert_eq!(current_plan(&[lapsed], now()), CurrentPlan::Free);
    }

    #[test]
    fn test_plan_lookup() {
        assert_eq!(plan_by_id("premium-yearly"), Some(&PREMIUM_YEARLY));
        assert!(plan_by_id("free").unwrap().is_free());
        assert!(plan_by_id("gold").is_none());
    }

    #[tokio::test]
    async fn test_subscribe_then_cancel() {
        let backend = Rc::new(InMemoryBackend::new());
        let user_id = backend.register("parent@example.com", "hunter22");
        backend
            .sign_in_with_password(&Credentials {
                email: "parent@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();
        let access = EntityAccess::<SubscriptionRecord, _>::new(backend);

        subscribe(&access, &PREMIUM_MONTHLY, Some(&user_id), now())
            .await
            .unwrap();
        let subscriptions = access.list(Some(&user_id)).await.unwrap();
        assert!(current_plan(&subscriptions, now()).is_premium());

        assert_eq!(cancel_active(&access, &subscriptions).await.unwrap(), 1);
        let subscriptions = access.list(Some(&user_id)).await.unwrap();
        assert_eq!(current_plan(&subscriptions, now()), CurrentPlan::Free);
    }
}
