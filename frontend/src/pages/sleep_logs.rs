use chrono::{DateTime, Utc};
use shared::analytics::average_rating;
use shared::models::{NewSleepLog, SleepLog, SleepLogPatch};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::{BabySelector, ErrorBanner, LoadingSpinner, NoBabyNotice};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::{format_datetime, now_utc, parse_datetime_local, to_datetime_local};

const RATINGS: [(u8, &str); 5] = [
    (1, "1 · Poor"),
    (2, "2 · Fair"),
    (3, "3 · Good"),
    (4, "4 · Very good"),
    (5, "5 · Excellent"),
];

/// A wake time must come strictly after the sleep time.
fn wake_time_error(sleep: Option<DateTime<Utc>>, wake: Option<DateTime<Utc>>) -> Option<&'static str> {
    match (sleep, wake) {
        (Some(sleep), Some(wake)) if wake <= sleep => Some("Wake time must be after sleep time"),
        _ => None,
    }
}

fn stars(rating: u8) -> String {
    "★".repeat(rating as usize) + &"☆".repeat(5usize.saturating_sub(rating as usize))
}

#[derive(Properties, PartialEq)]
pub struct SleepLogsProps {
    pub session: SessionContext,
}

#[function_component(SleepLogsPage)]
pub fn sleep_logs_page(props: &SleepLogsProps) -> Html {
    let baby = use_active_baby(&props.session);
    let logs = use_entity_list::<SleepLog>(&props.session, baby_scope(baby.active.as_ref()));

    let sleep_time = use_state(|| to_datetime_local(now_utc()));
    let wake_time = use_state(String::new);
    let rating = use_state(String::new);
    let notes = use_state(String::new);
    let is_submitting = use_state(|| false);
    let form_error = use_state(|| Option::<String>::None);

    let bind_input = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };
    let on_rating_change = {
        let rating = rating.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            rating.set(select.value());
        })
    };
    let on_notes_change = {
        let notes = notes.clone();
        Callback::from(move |e: Event| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            notes.set(area.value());
        })
    };

    let on_submit = {
        let list = logs.list.clone();
        let baby_id = baby.active.as_ref().map(|b| b.id.clone()).unwrap_or_default();
        let sleep_time = sleep_time.clone();
        let wake_time = wake_time.clone();
        let rating = rating.clone();
        let notes = notes.clone();
        let is_submitting = is_submitting.clone();
        let form_error = form_error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let draft = NewSleepLog {
                baby_id: baby_id.clone(),
                sleep_time: parse_datetime_local(&sleep_time),
                wake_time: parse_datetime_local(&wake_time),
                quality_rating: rating.parse().ok(),
                notes: Some(notes.trim().to_string()).filter(|n| !n.is_empty()),
            };
            if let Some(message) = wake_time_error(draft.sleep_time, draft.wake_time) {
                form_error.set(Some(message.to_string()));
                return;
            }

            let list = list.clone();
            let wake_time = wake_time.clone();
            let rating = rating.clone();
            let notes = notes.clone();
            let is_submitting = is_submitting.clone();
            let form_error = form_error.clone();
            is_submitting.set(true);
            spawn_local(async move {
                match list.add(&draft).await {
                    Ok(_) => {
                        form_error.set(None);
                        wake_time.set(String::new());
                        rating.set(String::new());
                        notes.set(String::new());
                    }
                    Err(e) => form_error.set(Some(e.to_string())),
                }
                is_submitting.set(false);
            });
        })
    };

    let on_wake = {
        let list = logs.list.clone();
        let form_error = form_error.clone();
        Callback::from(move |id: String| {
            let list = list.clone();
            let form_error = form_error.clone();
            let patch = SleepLogPatch {
                wake_time: Some(now_utc()),
                ..SleepLogPatch::default()
            };
            spawn_local(async move {
                if let Err(e) = list.edit(&id, &patch).await {
                    form_error.set(Some(e.to_string()));
                }
            });
        })
    };

    let on_delete = {
        let list = logs.list.clone();
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
            <div class="page sleep-logs">
                <h2>{"Sleep Logs"}</h2>
                {if baby.babies.loading { html! { <LoadingSpinner /> } } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    };

    let state = &logs.state;

    html! {
        <div class="page sleep-logs">
            <div class="page-header">
                <h2>{format!("{}'s Sleep", active.name)}</h2>
                <BabySelector babies={baby.babies.items.clone()} active={Some(active.id.clone())} on_select={baby.select.clone()} />
            </div>

            <form class="entry-form" onsubmit={on_submit}>
                <h3>{"Log sleep"}</h3>
                <ErrorBanner message={(*form_error).clone()} />
                <div class="form-row">
                    <div class="form-group">
                        <label for="sleep-time">{"Fell asleep"}</label>
                        <input id="sleep-time" type="datetime-local" value={(*sleep_time).clone()}
                            onchange={bind_input(&sleep_time)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="wake-time">{"Woke up (leave empty if still asleep)"}</label>
                        <input id="wake-time" type="datetime-local" value={(*wake_time).clone()}
                            onchange={bind_input(&wake_time)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="quality">{"Quality"}</label>
                        <select id="quality" onchange={on_rating_change} disabled={*is_submitting}>
                            <option value="" selected={rating.is_empty()}>{"Not rated"}</option>
                            {for RATINGS.iter().map(|(value, label)| html! {
                                <option value={value.to_string()} selected={*rating == value.to_string()}>{*label}</option>
                            })}
                        </select>
                    </div>
                </div>
                <div class="form-group">
                    <label for="sleep-notes">{"Notes"}</label>
                    <textarea id="sleep-notes" value={(*notes).clone()} onchange={on_notes_change} disabled={*is_submitting} />
                </div>
                <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                    {if *is_submitting { "Saving..." } else { "Save Sleep" }}
                </button>
            </form>

            <div class="list-summary">
                {format!("{} logs", state.items.len())}
                {average_rating(&state.items).map(|avg| format!(" · average quality {:.1}/5", avg)).unwrap_or_default()}
            </div>

            <ErrorBanner message={state.error.clone()} />
            {if state.loading && state.items.is_empty() {
                html! { <LoadingSpinner /> }
            } else if state.items.is_empty() {
                html! { <p class="empty-state">{"No sleep logged yet."}</p> }
            } else {
                html! {
                    <table class="entry-table">
                        <thead>
                            <tr>
                                <th>{"Asleep"}</th>
                                <th>{"Awake"}</th>
                                <th>{"Duration"}</th>
                                <th>{"Quality"}</th>
                                <th>{"Notes"}</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {for state.items.iter().map(|log| {
                                let wake_id = log.id.clone();
                                let delete_id = log.id.clone();
                                let on_wake = on_wake.clone();
                                let on_delete = on_delete.clone();
                                html! {
                                    <tr key={log.id.clone()}>
                                        <td>{format_datetime(log.sleep_time)}</td>
                                        <td>
                                            {match log.wake_time {
                                                Some(wake) => html! { <>{format_datetime(wake)}</> },
                                                None => html! {
                                                    <button class="btn btn-small" onclick={Callback::from(move |_: MouseEvent| on_wake.emit(wake_id.clone()))}>
                                                        {"☀️ Woke up now"}
                                                    </button>
                                                },
                                            }}
                                        </td>
                                        <td>{log.duration_hours().map(|h| format!("{:.1}h", h)).unwrap_or_else(|| "Sleeping".to_string())}</td>
                                        <td>{log.quality_rating.map(stars).unwrap_or_default()}</td>
                                        <td>{log.notes.clone().unwrap_or_default()}</td>
                                        <td>
                                            <button class="btn btn-danger btn-small" onclick={Callback::from(move |_: MouseEvent| on_delete.emit(delete_id.clone()))}>
                                                {"Delete"}
                                            </button>
                                        </td>
                                    </tr>
                                }
                            })}
                        </tbody>
                    </table>
                }
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(5), "★★★★★");
        assert_eq!(stars(7), "★★★★★★★");
    }

    #[wasm_bindgen_test]
    fn test_wake_time_must_follow_sleep_time() {
        let sleep = Utc.with_ymd_and_hms(2025, 6, 27, 20, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 28, 6, 0, 0).unwrap();
        assert_eq!(wake_time_error(Some(sleep), Some(later)), None);
        assert!(wake_time_error(Some(sleep), Some(sleep)).is_some());
        assert!(wake_time_error(Some(later), Some(sleep)).is_some());
        assert_eq!(wake_time_error(Some(sleep), None), None);
    }
}
