use shared::analytics::sleep_hours_per_day;
use shared::models::{format_minutes, time_ago, Activity, ActivityCounts, SleepLog};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::{BabySelector, ErrorBanner, NoBabyNotice};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::hooks::use_wake_polling::use_wake_polling;
use crate::routes::Route;
use crate::services::date_utils::{format_time, now_utc, today};

const QUICK_LINKS: [(Route, &str, &str); 4] = [
    (Route::SleepLogs, "😴", "Log Sleep"),
    (Route::Activities, "🍼", "Log Activity"),
    (Route::CryAnalyzer, "🧠", "Analyze a Cry"),
    (Route::Assistant, "🤖", "Ask the Consultant"),
];

#[derive(Properties, PartialEq)]
pub struct DashboardProps {
    pub session: SessionContext,
}

#[function_component(DashboardPage)]
pub fn dashboard_page(props: &DashboardProps) -> Html {
    let baby = use_active_baby(&props.session);
    let scope = baby_scope(baby.active.as_ref());
    let logs = use_entity_list::<SleepLog>(&props.session, scope.clone());
    let activities = use_entity_list::<Activity>(&props.session, scope);
    let woke = use_wake_polling(&props.session, baby.active.as_ref().map(|b| b.id.clone()));

    let Some(active) = baby.active.clone() else {
        return html! {
            <div class="page dashboard">
                <h2>{"Dashboard"}</h2>
                <ErrorBanner message={baby.babies.error.clone()} />
                {if baby.babies.loading { html! {} } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    };

    let now = now_utc();
    let today = today();
    let counts = ActivityCounts::on_day(&activities.state.items, today);
    let hours_today = sleep_hours_per_day(&logs.state.items)
        .get(&today)
        .copied()
        .unwrap_or(0.0);
    let last_sleep = logs.state.items.first();

    html! {
        <div class="page dashboard">
            <div class="page-header">
                <h2>{format!("{}'s Day", active.name)}</h2>
                <BabySelector
                    babies={baby.babies.items.clone()}
                    active={Some(active.id.clone())}
                    on_select={baby.select.clone()}
                />
            </div>

            {if let Some(log) = woke {
                let slept = log.duration_hours().map(|h| format_minutes((h * 60.0).round() as i64));
                html! {
                    <div class="wake-banner">
                        {format!("☀️ {} woke up", active.name)}
                        {slept.map(|s| format!(" after {}", s)).unwrap_or_default()}
                    </div>
                }
            } else {
                html! {}
            }}

            <ErrorBanner message={logs.state.error.clone().or(activities.state.error.clone())} />

            <div class="stat-cards">
                <div class="stat-card">
                    <span class="stat-label">{"Age"}</span>
                    <span class="stat-value">{active.age_label(today)}</span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">{"Sleep today"}</span>
                    <span class="stat-value">{format!("{:.1}h", hours_today)}</span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">{"Last sleep"}</span>
                    <span class="stat-value">
                        {match last_sleep {
                            Some(log) if !log.is_complete() => format!("Asleep since {}", format_time(log.sleep_time)),
                            Some(log) => time_ago(log.wake_time.unwrap_or(log.sleep_time), now),
                            None => "No sleep logged".to_string(),
                        }}
                    </span>
                </div>
            </div>

            <div class="activity-counts">
                <h3>{"Today"}</h3>
                <ul>
                    <li>{format!("🍼 {} feedings", counts.feeding)}</li>
                    <li>{format!("💧 {} diaper changes", counts.diaper)}</li>
                    <li>{format!("🌙 {} naps", counts.sleep)}</li>
                    <li>{format!("⭐ {} milestones", counts.milestone)}</li>
                </ul>
            </div>

            <div class="quick-links">
                {for QUICK_LINKS.iter().map(|(route, icon, label)| html! {
                    <Link<Route> to={route.clone()} classes="quick-link">
                        <span class="quick-link-icon">{*icon}</span>
                        <span>{*label}</span>
                    </Link<Route>>
                })}
            </div>
        </div>
    }
}
