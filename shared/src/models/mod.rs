//! Typed rows, drafts and patches for every backend table.
//!
//! Drafts carry only what the user enters; ids, owner columns and
//! `created_at` are filled in by the access layer or the backend.

mod activity;
mod baby;
mod developmental_insight;
mod growth;
mod referral;
mod reminder;
mod sleep_log;
mod sleep_schedule;
mod sleep_session;
mod subscription;

pub use activity::{format_minutes, time_ago, Activity, ActivityCounts, ActivityKind, ActivityPatch, DiaperType, NewActivity};
pub use baby::{months_between, Baby, BabyPatch, NewBaby};
pub use developmental_insight::{parse_tips, DevelopmentalInsight, DevelopmentalInsightPatch, NewDevelopmentalInsight};
pub use growth::{GrowthMeasure, GrowthPatch, GrowthRecord, GrowthTrend, NewGrowthRecord, TrendDirection};
pub use referral::{NewReferral, Referral, ReferralPatch, ReferralStatus};
pub use reminder::{next_reminder, BabyReminder, BabyReminderPatch, NewBabyReminder, ReminderFrequency, ReminderKind};
pub use sleep_log::{NewSleepLog, SleepLog, SleepLogPatch};
pub use sleep_schedule::{NewSleepSchedule, SleepSchedule, SleepSchedulePatch};
pub use sleep_session::{NewSleepSession, SleepSession, SleepSessionPatch};
pub use subscription::{SubscriptionPatch, SubscriptionRecord, SubscriptionStatus};

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
