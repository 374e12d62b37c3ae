use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::analytics::{average_rating, quality_label, sleep_hours_per_day, SleepStats, TimeRange, Trend};
use shared::models::{SleepLog, SleepSession};
use yew::prelude::*;

use crate::components::{BabySelector, ErrorBanner, LoadingSpinner, NoBabyNotice, SleepChart};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::{format_date, now_utc};

/// Average over the days that have any recorded sleep.
pub(crate) fn average_daily_hours(per_day: &BTreeMap<NaiveDate, f64>) -> Option<f64> {
    if per_day.is_empty() {
        return None;
    }
    Some(per_day.values().sum::<f64>() / per_day.len() as f64)
}

#[derive(Properties, PartialEq)]
pub struct AnalyticsProps {
    pub session: SessionContext,
}

#[function_component(AnalyticsPage)]
pub fn analytics_page(props: &AnalyticsProps) -> Html {
    let baby = use_active_baby(&props.session);
    // The window start is fixed at mount so the scope stays stable across renders.
    let since = use_memo((), |_| now_utc());

    let mut log_scope = baby_scope(baby.active.as_ref());
    log_scope.push(TimeRange::Quarter.filter("sleep_time", *since));
    let mut session_scope = baby_scope(baby.active.as_ref());
    session_scope.push(TimeRange::Quarter.filter("start_time", *since));

    let logs = use_entity_list::<SleepLog>(&props.session, log_scope);
    let sessions = use_entity_list::<SleepSession>(&props.session, session_scope);

    let Some(active) = baby.active.clone() else {
        return html! {
            <div class="page analytics">
                <h2>{"Analytics"}</h2>
                {if baby.babies.loading { html! { <LoadingSpinner /> } } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    };

    let per_day = sleep_hours_per_day(&logs.state.items);
    let best_day = per_day
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(day, hours)| (*day, *hours));
    let stats = SleepStats::from_sessions(&sessions.state.items);

    html! {
        <div class="page analytics">
            <div class="page-header">
                <h2>{format!("{}'s Sleep Analytics", active.name)}</h2>
                <BabySelector babies={baby.babies.items.clone()} active={Some(active.id.clone())} on_select={baby.select.clone()} />
            </div>

            <ErrorBanner message={logs.state.error.clone().or(sessions.state.error.clone())} />

            <div class="stat-cards">
                <div class="stat-card">
                    <span class="stat-label">{"Logged sleeps (90d)"}</span>
                    <span class="stat-value">{logs.state.items.len()}</span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">{"Average per day"}</span>
                    <span class="stat-value">
                        {average_daily_hours(&per_day).map(|h| format!("{:.1}h", h)).unwrap_or_else(|| "-".to_string())}
                    </span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">{"Average quality"}</span>
                    <span class="stat-value">
                        {average_rating(&logs.state.items).map(|r| format!("{:.1}/5", r)).unwrap_or_else(|| "-".to_string())}
                    </span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">{"Longest day"}</span>
                    <span class="stat-value">
                        {best_day.map(|(day, hours)| format!("{:.1}h on {}", hours, format_date(day))).unwrap_or_else(|| "-".to_string())}
                    </span>
                </div>
            </div>

            <SleepChart logs={logs.state.items.clone()} loading={logs.state.loading} />

            <div class="monitor-stats">
                <h3>{"Monitored sessions"}</h3>
                {match stats {
                    Some(stats) => html! {
                        <div class="stat-cards">
                            <div class="stat-card">
                                <span class="stat-label">{"Sessions"}</span>
                                <span class="stat-value">{stats.total_sessions}</span>
                            </div>
                            <div class="stat-card">
                                <span class="stat-label">{"Total sleep"}</span>
                                <span class="stat-value">{format!("{:.1}h", stats.total_sleep_hours)}</span>
                            </div>
                            <div class="stat-card">
                                <span class="stat-label">{"Quality"}</span>
                                <span class="stat-value">
                                    {format!("{:.0} · {}", stats.avg_quality, quality_label(stats.avg_quality))}
                                </span>
                            </div>
                            <div class="stat-card">
                                <span class="stat-label">{"Last 7 sessions"}</span>
                                <span class="stat-value">
                                    {format!("{:.0} {}", stats.recent_avg_quality, match stats.trend {
                                        Trend::Up => "📈",
                                        Trend::Down => "📉",
                                    })}
                                </span>
                            </div>
                            <div class="stat-card">
                                <span class="stat-label">{"Movements / session"}</span>
                                <span class="stat-value">{format!("{:.1}", stats.avg_movements)}</span>
                            </div>
                            <div class="stat-card">
                                <span class="stat-label">{"Cries · alerts"}</span>
                                <span class="stat-value">{format!("{} · {}", stats.total_cries, stats.total_alerts)}</span>
                            </div>
                        </div>
                    },
                    None => html! { <p class="empty-state">{"No monitored sessions yet. Start one from the Monitor page."}</p> },
                }}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_average_daily_hours() {
        let mut per_day = BTreeMap::new();
        assert_eq!(average_daily_hours(&per_day), None);
        per_day.insert(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 12.0);
        per_day.insert(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), 14.0);
        assert_eq!(average_daily_hours(&per_day), Some(13.0));
    }
}
