pub mod activities;
pub mod analytics;
pub mod assistant;
pub mod babies;
pub mod baby_profile;
pub mod cry_analyzer;
pub mod dashboard;
pub mod forgot_password;
pub mod growth;
pub mod landing;
pub mod legal;
pub mod login;
pub mod monitor;
pub mod not_found;
pub mod parent_info;
pub mod referrals;
pub mod reset_password;
pub mod settings;
pub mod signup;
pub mod sleep_logs;
pub mod sleep_schedule;
pub mod sleep_sounds;
pub mod subscription;

pub use activities::ActivitiesPage;
pub use analytics::AnalyticsPage;
pub use assistant::AssistantPage;
pub use babies::BabiesPage;
pub use baby_profile::BabyProfilePage;
pub use cry_analyzer::CryAnalyzerPage;
pub use dashboard::DashboardPage;
pub use forgot_password::ForgotPasswordPage;
pub use growth::GrowthPage;
pub use landing::LandingPage;
pub use legal::{PrivacyPage, TermsPage};
pub use login::LoginPage;
pub use monitor::MonitorPage;
pub use not_found::NotFoundPage;
pub use parent_info::ParentInfoPage;
pub use referrals::ReferralsPage;
pub use reset_password::ResetPasswordPage;
pub use settings::SettingsPage;
pub use signup::SignUpPage;
pub use sleep_logs::SleepLogsPage;
pub use sleep_schedule::SleepSchedulePage;
pub use sleep_sounds::SleepSoundsPage;
pub use subscription::SubscriptionPage;
