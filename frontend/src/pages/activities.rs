use shared::models::{
    format_minutes, time_ago, Activity, ActivityCounts, ActivityKind, DiaperType, NewActivity,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::components::{BabySelector, ErrorBanner, LoadingSpinner, NoBabyNotice};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::{now_utc, parse_datetime_local, to_datetime_local};

const DIAPER_TYPES: [(DiaperType, &str); 3] = [
    (DiaperType::Wet, "Wet"),
    (DiaperType::Dirty, "Dirty"),
    (DiaperType::Both, "Both"),
];

/// One-line detail for the activity list.
pub(crate) fn describe(activity: &Activity) -> String {
    let mut parts = Vec::new();
    if let Some(minutes) = activity.duration {
        parts.push(format_minutes(minutes));
    }
    if let Some(amount) = activity.amount {
        parts.push(format!("{} {}", amount, activity.unit.as_deref().unwrap_or("ml")));
    }
    if let Some(diaper) = activity.diaper_type {
        parts.push(diaper.as_str().to_string());
    }
    if let Some(milestone) = &activity.milestone_type {
        parts.push(milestone.clone());
    }
    if let Some(notes) = &activity.notes {
        parts.push(notes.clone());
    }
    parts.join(" · ")
}

#[derive(Properties, PartialEq)]
pub struct ActivitiesProps {
    pub session: SessionContext,
}

#[function_component(ActivitiesPage)]
pub fn activities_page(props: &ActivitiesProps) -> Html {
    let baby = use_active_baby(&props.session);
    let activities = use_entity_list::<Activity>(&props.session, baby_scope(baby.active.as_ref()));

    let kind = use_state(|| ActivityKind::Feeding);
    let timestamp = use_state(|| to_datetime_local(now_utc()));
    let duration = use_state(String::new);
    let amount = use_state(String::new);
    let diaper_type = use_state(|| Option::<DiaperType>::None);
    let milestone = use_state(String::new);
    let notes = use_state(String::new);
    let is_submitting = use_state(|| false);
    let form_error = use_state(|| Option::<String>::None);

    let bind = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };
    let on_kind_change = {
        let kind = kind.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(parsed) = ActivityKind::parse(&select.value()) {
                kind.set(parsed);
            }
        })
    };
    let on_diaper_change = {
        let diaper_type = diaper_type.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            diaper_type.set(DiaperType::parse(&select.value()));
        })
    };

    let on_submit = {
        let list = activities.list.clone();
        let baby_id = baby.active.as_ref().map(|b| b.id.clone()).unwrap_or_default();
        let kind = kind.clone();
        let timestamp = timestamp.clone();
        let duration = duration.clone();
        let amount = amount.clone();
        let diaper_type = diaper_type.clone();
        let milestone = milestone.clone();
        let notes = notes.clone();
        let is_submitting = is_submitting.clone();
        let form_error = form_error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let at = parse_datetime_local(&timestamp).unwrap_or_else(now_utc);
            let mut draft = NewActivity::new(baby_id.clone(), *kind, at);
            draft.notes = Some(notes.trim().to_string()).filter(|n| !n.is_empty());
            match *kind {
                ActivityKind::Feeding => {
                    draft.duration = duration.trim().parse().ok();
                    draft.amount = amount.trim().parse().ok();
                    draft.unit = draft.amount.map(|_| "ml".to_string());
                }
                ActivityKind::Sleep => draft.duration = duration.trim().parse().ok(),
                ActivityKind::Diaper => draft.diaper_type = *diaper_type,
                ActivityKind::Milestone => {
                    draft.milestone_type = Some(milestone.trim().to_string()).filter(|m| !m.is_empty())
                }
            }

            let list = list.clone();
            let fields = [duration.clone(), amount.clone(), milestone.clone(), notes.clone()];
            let is_submitting = is_submitting.clone();
            let form_error = form_error.clone();
            is_submitting.set(true);
            spawn_local(async move {
                match list.add(&draft).await {
                    Ok(_) => {
                        form_error.set(None);
                        for field in fields {
                            field.set(String::new());
                        }
                    }
                    Err(e) => form_error.set(Some(e.to_string())),
                }
                is_submitting.set(false);
            });
        })
    };

    let on_delete = {
        let list = activities.list.clone();
        let form_error = form_error.clone();
        Callback::from(move |id: String| {
            let list = list.clone();
            let form_error = form_error.clone();
            spawn_local(async move {
                if let Err(e) = list.remove(&id).await {
                    form_error.set(Some(e.to_string()));
                }
            });
        })
    };

    let Some(active) = baby.active.clone() else {
        return html! {
            <div class="page activities">
                <h2>{"Activities"}</h2>
                {if baby.babies.loading { html! { <LoadingSpinner /> } } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    };

    let now = now_utc();
    let state = &activities.state;
    let today = ActivityCounts::on_day(&state.items, now.date_naive());

    html! {
        <div class="page activities">
            <div class="page-header">
                <h2>{format!("{}'s Activities", active.name)}</h2>
                <BabySelector babies={baby.babies.items.clone()} active={Some(active.id.clone())} on_select={baby.select.clone()} />
            </div>

            <div class="stat-cards">
                {for ActivityKind::ALL.iter().map(|k| {
                    let count = match k {
                        ActivityKind::Feeding => today.feeding,
                        ActivityKind::Diaper => today.diaper,
                        ActivityKind::Sleep => today.sleep,
                        ActivityKind::Milestone => today.milestone,
                    };
                    html! {
                        <div class="stat-card">
                            <span class="stat-label">{format!("{} {} today", k.icon(), k.label())}</span>
                            <span class="stat-value">{count}</span>
                        </div>
                    }
                })}
            </div>

            <form class="entry-form" onsubmit={on_submit}>
                <h3>{"Log activity"}</h3>
                <ErrorBanner message={(*form_error).clone()} />
                <div class="form-row">
                    <div class="form-group">
                        <label for="activity-kind">{"Type"}</label>
                        <select id="activity-kind" onchange={on_kind_change} disabled={*is_submitting}>
                            {for ActivityKind::ALL.iter().map(|k| html! {
                                <option value={k.as_str()} selected={*k == *kind}>{format!("{} {}", k.icon(), k.label())}</option>
                            })}
                        </select>
                    </div>
                    <div class="form-group">
                        <label for="activity-time">{"When"}</label>
                        <input id="activity-time" type="datetime-local" value={(*timestamp).clone()}
                            onchange={bind(&timestamp)} disabled={*is_submitting} />
                    </div>
                    {match *kind {
                        ActivityKind::Feeding => html! {
                            <>
                                <div class="form-group">
                                    <label for="activity-duration">{"Duration (min)"}</label>
                                    <input id="activity-duration" type="number" value={(*duration).clone()} onchange={bind(&duration)} />
                                </div>
                                <div class="form-group">
                                    <label for="activity-amount">{"Amount (ml)"}</label>
                                    <input id="activity-amount" type="number" value={(*amount).clone()} onchange={bind(&amount)} />
                                </div>
                            </>
                        },
                        ActivityKind::Sleep => html! {
                            <div class="form-group">
                                <label for="activity-duration">{"Duration (min)"}</label>
                                <input id="activity-duration" type="number" value={(*duration).clone()} onchange={bind(&duration)} />
                            </div>
                        },
                        ActivityKind::Diaper => html! {
                            <div class="form-group">
                                <label for="activity-diaper">{"Diaper"}</label>
                                <select id="activity-diaper" onchange={on_diaper_change}>
                                    <option value="" selected={diaper_type.is_none()}>{"Choose..."}</option>
                                    {for DIAPER_TYPES.iter().map(|(d, label)| html! {
                                        <option value={d.as_str()} selected={*diaper_type == Some(*d)}>{*label}</option>
                                    })}
                                </select>
                            </div>
                        },
                        ActivityKind::Milestone => html! {
                            <div class="form-group">
                                <label for="activity-milestone">{"Milestone"}</label>
                                <input id="activity-milestone" type="text" placeholder="First smile" value={(*milestone).clone()} onchange={bind(&milestone)} />
                            </div>
                        },
                    }}
                </div>
                <div class="form-group">
                    <label for="activity-notes">{"Notes"}</label>
                    <input id="activity-notes" type="text" value={(*notes).clone()} onchange={bind(&notes)} disabled={*is_submitting} />
                </div>
                <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                    {if *is_submitting { "Saving..." } else { "Save Activity" }}
                </button>
            </form>

            <ErrorBanner message={state.error.clone()} />
            {if state.loading && state.items.is_empty() {
                html! { <LoadingSpinner /> }
            } else if state.items.is_empty() {
                html! { <p class="empty-state">{"No activities logged yet."}</p> }
            } else {
                html! {
                    <ul class="activity-list">
                        {for state.items.iter().map(|activity| {
                            let id = activity.id.clone();
                            let on_delete = on_delete.clone();
                            html! {
                                <li key={activity.id.clone()} class="activity-item">
                                    <span class="activity-icon">{activity.kind.icon()}</span>
                                    <span class="activity-label">{activity.kind.label()}</span>
                                    <span class="activity-detail">{describe(activity)}</span>
                                    <span class="activity-time">{time_ago(activity.timestamp, now)}</span>
                                    <button class="btn btn-danger btn-small" onclick={Callback::from(move |_: MouseEvent| on_delete.emit(id.clone()))}>
                                        {"×"}
                                    </button>
                                </li>
                            }
                        })}
                    </ul>
                }
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_describe_feeding() {
        let activity = Activity {
            id: "a".into(),
            baby_id: "b".into(),
            kind: ActivityKind::Feeding,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 27, 9, 0, 0).unwrap(),
            duration: Some(20),
            notes: Some("left side".into()),
            amount: Some(120.0),
            unit: Some("ml".into()),
            diaper_type: None,
            milestone_type: None,
            user_id: "u".into(),
            created_at: None,
        };
        assert_eq!(describe(&activity), "20m · 120 ml · left side");
    }
}
