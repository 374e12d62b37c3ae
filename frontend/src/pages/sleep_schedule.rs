use shared::models::{NewSleepSchedule, SleepSchedule};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::{BabySelector, ErrorBanner, LoadingSpinner, NoBabyNotice};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::{format_datetime, now_utc, parse_datetime_local};

/// "2h 30m"
fn window_length(schedule: &SleepSchedule) -> String {
    let minutes = (schedule.duration_hours() * 60.0).round() as i64;
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

#[derive(Properties, PartialEq)]
pub struct SleepScheduleProps {
    pub session: SessionContext,
}

#[function_component(SleepSchedulePage)]
pub fn sleep_schedule_page(props: &SleepScheduleProps) -> Html {
    let baby = use_active_baby(&props.session);
    let schedules = use_entity_list::<SleepSchedule>(&props.session, baby_scope(baby.active.as_ref()));

    let start_time = use_state(String::new);
    let end_time = use_state(String::new);
    let note = use_state(String::new);
    let is_submitting = use_state(|| false);
    let form_error = use_state(|| Option::<String>::None);

    let bind = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };

    let on_submit = {
        let list = schedules.list.clone();
        let baby_id = baby.active.as_ref().map(|b| b.id.clone()).unwrap_or_default();
        let start_time = start_time.clone();
        let end_time = end_time.clone();
        let note = note.clone();
        let is_submitting = is_submitting.clone();
        let form_error = form_error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let draft = NewSleepSchedule {
                baby_id: baby_id.clone(),
                start_time: parse_datetime_local(&start_time),
                end_time: parse_datetime_local(&end_time),
                note: Some(note.trim().to_string()).filter(|n| !n.is_empty()),
            };
            if let Some(message) = draft.window_error() {
                form_error.set(Some(message.to_string()));
                return;
            }

            let list = list.clone();
            let fields = [start_time.clone(), end_time.clone(), note.clone()];
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
        let list = schedules.list.clone();
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
            <div class="page sleep-schedule">
                <h2>{"Sleep Schedule"}</h2>
                {if baby.babies.loading { html! { <LoadingSpinner /> } } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    };

    let state = &schedules.state;
    let now = now_utc();

    html! {
        <div class="page sleep-schedule">
            <div class="page-header">
                <h2>{format!("{}'s Sleep Schedule", active.name)}</h2>
                <BabySelector babies={baby.babies.items.clone()} active={Some(active.id.clone())} on_select={baby.select.clone()} />
            </div>

            <form class="entry-form" onsubmit={on_submit}>
                <h3>{"Plan a sleep window"}</h3>
                <ErrorBanner message={(*form_error).clone()} />
                <div class="form-row">
                    <div class="form-group">
                        <label for="schedule-start">{"Start"}</label>
                        <input id="schedule-start" type="datetime-local" value={(*start_time).clone()} onchange={bind(&start_time)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="schedule-end">{"End"}</label>
                        <input id="schedule-end" type="datetime-local" value={(*end_time).clone()} onchange={bind(&end_time)} disabled={*is_submitting} />
                    </div>
                </div>
                <div class="form-group">
                    <label for="schedule-note">{"Note"}</label>
                    <input id="schedule-note" type="text" value={(*note).clone()} onchange={bind(&note)} disabled={*is_submitting} />
                </div>
                <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                    {if *is_submitting { "Saving..." } else { "Add Schedule" }}
                </button>
            </form>

            <ErrorBanner message={state.error.clone()} />
            {if state.loading && state.items.is_empty() {
                html! { <LoadingSpinner /> }
            } else if state.items.is_empty() {
                html! { <p class="empty-state">{"No sleep windows planned yet."}</p> }
            } else {
                html! {
                    <table class="entry-table">
                        <thead>
                            <tr>
                                <th>{"From"}</th>
                                <th>{"To"}</th>
                                <th>{"Length"}</th>
                                <th>{"Note"}</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {for state.items.iter().map(|schedule| {
                                let id = schedule.id.clone();
                                let on_delete = on_delete.clone();
                                let is_now = schedule.contains(now);
                                html! {
                                    <tr key={schedule.id.clone()} class={classes!(is_now.then_some("active"))}>
                                        <td>{format_datetime(schedule.start_time)}</td>
                                        <td>{format_datetime(schedule.end_time)}</td>
                                        <td>{window_length(schedule)}</td>
                                        <td>{schedule.note.clone().unwrap_or_default()}</td>
                                        <td>
                                            <button class="btn btn-danger btn-small" onclick={Callback::from(move |_: MouseEvent| on_delete.emit(id.clone()))}>
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
    use chrono::{TimeZone, Utc};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn schedule(start_min: u32, end_hour: u32, end_min: u32) -> SleepSchedule {
        SleepSchedule {
            id: "s".into(),
            baby_id: "b".into(),
            start_time: Utc.with_ymd_and_hms(2025, 6, 27, 13, start_min, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 27, end_hour, end_min, 0).unwrap(),
            note: None,
            user_id: "u".into(),
            created_at: None,
        }
    }

    #[wasm_bindgen_test]
    fn test_window_length() {
        assert_eq!(window_length(&schedule(0, 15, 30)), "2h 30m");
        assert_eq!(window_length(&schedule(0, 15, 0)), "2h");
        assert_eq!(window_length(&schedule(15, 13, 45)), "30m");
    }
}
