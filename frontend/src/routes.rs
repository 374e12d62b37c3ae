use yew_router::prelude::*;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[at("/")]
    Landing,
    #[at("/login")]
    Login,
    #[at("/signup")]
    SignUp,
    #[at("/forgot-password")]
    ForgotPassword,
    #[at("/reset-password")]
    ResetPassword,
    #[at("/terms")]
    Terms,
    #[at("/privacy")]
    Privacy,
    #[at("/dashboard")]
    Dashboard,
    #[at("/babies")]
    Babies,
    #[at("/babies/:id")]
    BabyProfile { id: String },
    #[at("/sleep-logs")]
    SleepLogs,
    #[at("/analytics")]
    Analytics,
    #[at("/growth")]
    Growth,
    #[at("/activities")]
    Activities,
    #[at("/schedule")]
    SleepSchedule,
    #[at("/sounds")]
    SleepSounds,
    #[at("/parent-info")]
    ParentInfo,
    #[at("/cry-analyzer")]
    CryAnalyzer,
    #[at("/assistant")]
    Assistant,
    #[at("/monitor")]
    Monitor,
    #[at("/subscription")]
    Subscription,
    #[at("/referrals")]
    Referrals,
    #[at("/settings")]
    Settings,
    #[not_found]
    #[at("/404")]
    NotFound,
}

/// Signed-in navigation, in header order.
pub const NAV_ITEMS: [(Route, &str); 14] = [
    (Route::Dashboard, "Dashboard"),
    (Route::Babies, "Babies"),
    (Route::SleepLogs, "Sleep Logs"),
    (Route::Analytics, "Analytics"),
    (Route::Growth, "Growth"),
    (Route::Activities, "Activities"),
    (Route::SleepSchedule, "Schedule"),
    (Route::SleepSounds, "Sounds"),
    (Route::ParentInfo, "Parent Info"),
    (Route::CryAnalyzer, "Cry Analyzer"),
    (Route::Assistant, "Assistant"),
    (Route::Monitor, "Monitor"),
    (Route::Subscription, "Premium"),
    (Route::Referrals, "Referrals"),
];
