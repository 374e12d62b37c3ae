use shared::insights::guideline_for_age;
use shared::models::{
    next_reminder, parse_tips, BabyReminder, BabyReminderPatch, DevelopmentalInsight, NewBabyReminder,
    NewDevelopmentalInsight, ReminderFrequency, ReminderKind,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::{BabySelector, ErrorBanner, LoadingSpinner, NoBabyNotice};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::{format_clock, local_time_now, parse_time_input, today};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Guidelines,
    Reminders,
    Insights,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Guidelines, Tab::Reminders, Tab::Insights];

    fn label(&self) -> &'static str {
        match self {
            Tab::Guidelines => "Sleep Guidelines",
            Tab::Reminders => "Reminders",
            Tab::Insights => "Developmental Insights",
        }
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds a reminder draft from the raw form fields.
pub(crate) fn reminder_draft(
    baby_id: &str,
    kind: &str,
    title: &str,
    time: &str,
    frequency: &str,
) -> Result<NewBabyReminder, String> {
    let kind = ReminderKind::parse(kind).ok_or_else(|| format!("Unknown reminder type '{}'", kind))?;
    let frequency =
        ReminderFrequency::parse(frequency).ok_or_else(|| format!("Unknown frequency '{}'", frequency))?;
    let time = parse_time_input(time).ok_or_else(|| "Pick a time for the reminder".to_string())?;

    let mut draft = NewBabyReminder::new(baby_id, kind);
    draft.title = title.trim().to_string();
    draft.time = Some(time);
    draft.frequency = frequency;
    Ok(draft)
}

#[derive(Properties, PartialEq)]
pub struct ParentInfoProps {
    pub session: SessionContext,
}

#[function_component(ParentInfoPage)]
pub fn parent_info_page(props: &ParentInfoProps) -> Html {
    let baby = use_active_baby(&props.session);
    let scope = baby_scope(baby.active.as_ref());
    let reminders = use_entity_list::<BabyReminder>(&props.session, scope.clone());
    let insights = use_entity_list::<DevelopmentalInsight>(&props.session, scope);

    let tab = use_state(|| Tab::Guidelines);
    let action_error = use_state(|| Option::<String>::None);

    let reminder_kind = use_state(|| ReminderKind::Nap.as_str().to_string());
    let reminder_title = use_state(String::new);
    let reminder_time = use_state(String::new);
    let reminder_frequency = use_state(|| ReminderFrequency::Daily.as_str().to_string());

    let milestone = use_state(String::new);
    let impact = use_state(String::new);
    let adjustment = use_state(String::new);
    let tips = use_state(String::new);

    let bind_input = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };
    let bind_select = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            handle.set(select.value());
        })
    };
    let bind_area = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            handle.set(area.value());
        })
    };

    let baby_id = baby.active.as_ref().map(|b| b.id.clone()).unwrap_or_default();

    let on_add_reminder = {
        let list = reminders.list.clone();
        let baby_id = baby_id.clone();
        let kind = reminder_kind.clone();
        let title = reminder_title.clone();
        let time = reminder_time.clone();
        let frequency = reminder_frequency.clone();
        let action_error = action_error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let draft = match reminder_draft(&baby_id, &kind, &title, &time, &frequency) {
                Ok(draft) => draft,
                Err(message) => {
                    action_error.set(Some(message));
                    return;
                }
            };
            let list = list.clone();
            let title = title.clone();
            let time = time.clone();
            let action_error = action_error.clone();
            spawn_local(async move {
                match list.add(&draft).await {
                    Ok(_) => {
                        action_error.set(None);
                        title.set(String::new());
                        time.set(String::new());
                    }
                    Err(e) => action_error.set(Some(e.to_string())),
                }
            });
        })
    };

    let on_toggle_reminder = {
        let list = reminders.list.clone();
        let action_error = action_error.clone();
        Callback::from(move |(id, is_active): (String, bool)| {
            let list = list.clone();
            let action_error = action_error.clone();
            let patch = BabyReminderPatch {
                is_active: Some(!is_active),
                ..BabyReminderPatch::default()
            };
            spawn_local(async move {
                if let Err(e) = list.edit(&id, &patch).await {
                    action_error.set(Some(e.to_string()));
                }
            });
        })
    };

    let on_delete_reminder = {
        let list = reminders.list.clone();
        let action_error = action_error.clone();
        Callback::from(move |id: String| {
            let list = list.clone();
            let action_error = action_error.clone();
            spawn_local(async move {
                if let Err(e) = list.remove(&id).await {
                    action_error.set(Some(e.to_string()));
                }
            });
        })
    };

    let on_add_insight = {
        let list = insights.list.clone();
        let baby_id = baby_id.clone();
        let age_group = baby
            .active
            .as_ref()
            .map(|b| guideline_for_age(b.age_in_months(today())).age_group.to_string())
            .unwrap_or_default();
        let fields = [milestone.clone(), impact.clone(), adjustment.clone(), tips.clone()];
        let action_error = action_error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let [milestone, impact, adjustment, tips] = &fields;
            let draft = NewDevelopmentalInsight {
                baby_id: baby_id.clone(),
                age_group: age_group.clone(),
                milestone: milestone.trim().to_string(),
                impact: impact.trim().to_string(),
                sleep_adjustment: adjustment.trim().to_string(),
                tips: parse_tips(tips),
            };
            let list = list.clone();
            let fields = fields.clone();
            let action_error = action_error.clone();
            spawn_local(async move {
                match list.add(&draft).await {
                    Ok(_) => {
                        action_error.set(None);
                        for field in fields {
                            field.set(String::new());
                        }
                    }
                    Err(e) => action_error.set(Some(e.to_string())),
                }
            });
        })
    };

    let on_prefill_insight = {
        let baby = baby.active.clone();
        let adjustment = adjustment.clone();
        let tips = tips.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(baby) = &baby {
                let seed = NewDevelopmentalInsight::from_guideline(
                    baby.id.clone(),
                    guideline_for_age(baby.age_in_months(today())),
                );
                adjustment.set(seed.sleep_adjustment);
                tips.set(seed.tips.join("\n"));
            }
        })
    };

    let on_delete_insight = {
        let list = insights.list.clone();
        let action_error = action_error.clone();
        Callback::from(move |id: String| {
            let list = list.clone();
            let action_error = action_error.clone();
            spawn_local(async move {
                if let Err(e) = list.remove(&id).await {
                    action_error.set(Some(e.to_string()));
                }
            });
        })
    };

    let Some(active) = baby.active.clone() else {
        return html! {
            <div class="page parent-info">
                <h2>{"Parent Information"}</h2>
                {if baby.babies.loading { html! { <LoadingSpinner /> } } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    };

    let guideline = guideline_for_age(active.age_in_months(today()));

    let tabs = html! {
        <div class="tabs">
            {for Tab::ALL.iter().map(|t| {
                let tab = tab.clone();
                let t = *t;
                html! {
                    <button
                        class={classes!("tab", (*tab == t).then_some("active"))}
                        onclick={Callback::from(move |_: MouseEvent| tab.set(t))}
                    >
                        {t.label()}
                    </button>
                }
            })}
        </div>
    };

    let body = match *tab {
        Tab::Guidelines => html! {
            <div class="guideline-card">
                <h3>{format!("{} guidelines", guideline.age_group)}</h3>
                <ul>
                    <li>{format!("Total sleep: {}", guideline.total_sleep)}</li>
                    <li>{format!("Night sleep: {}", guideline.night_sleep)}</li>
                    <li>{format!("Naps: {} ({})", guideline.naps, guideline.nap_duration)}</li>
                    <li>{format!("Wake windows: {}", guideline.wake_windows)}</li>
                </ul>
                <h4>{"Tips"}</h4>
                <ul>
                    {for guideline.tips.iter().map(|tip| html! { <li>{*tip}</li> })}
                </ul>
            </div>
        },
        Tab::Reminders => {
            let state = &reminders.state;
            let upcoming = next_reminder(&state.items, local_time_now());
            html! {
                <>
                    {if let Some(next) = upcoming {
                        html! {
                            <div class="reminder-banner">
                                {format!("Next: {} {} at {}", next.kind.icon(), next.title, format_clock(next.time))}
                            </div>
                        }
                    } else {
                        html! {}
                    }}
                    <form class="entry-form" onsubmit={on_add_reminder}>
                        <h3>{"Add reminder"}</h3>
                        <div class="form-row">
                            <div class="form-group">
                                <label for="reminder-type">{"Type"}</label>
                                <select id="reminder-type" onchange={bind_select(&reminder_kind)}>
                                    {for ReminderKind::ALL.iter().map(|kind| html! {
                                        <option value={kind.as_str()} selected={*reminder_kind == kind.as_str()}>
                                            {format!("{} {}", kind.icon(), capitalize(kind.as_str()))}
                                        </option>
                                    })}
                                </select>
                            </div>
                            <div class="form-group">
                                <label for="reminder-title">{"Title"}</label>
                                <input id="reminder-title" type="text" value={(*reminder_title).clone()} onchange={bind_input(&reminder_title)} />
                            </div>
                            <div class="form-group">
                                <label for="reminder-time">{"Time"}</label>
                                <input id="reminder-time" type="time" value={(*reminder_time).clone()} onchange={bind_input(&reminder_time)} />
                            </div>
                            <div class="form-group">
                                <label for="reminder-frequency">{"Repeats"}</label>
                                <select id="reminder-frequency" onchange={bind_select(&reminder_frequency)}>
                                    {for ReminderFrequency::ALL.iter().map(|freq| html! {
                                        <option value={freq.as_str()} selected={*reminder_frequency == freq.as_str()}>
                                            {capitalize(freq.as_str())}
                                        </option>
                                    })}
                                </select>
                            </div>
                        </div>
                        <button type="submit" class="btn btn-primary">{"Add Reminder"}</button>
                    </form>

                    <ErrorBanner message={state.error.clone()} />
                    {if state.loading && state.items.is_empty() {
                        html! { <LoadingSpinner /> }
                    } else if state.items.is_empty() {
                        html! { <p class="empty-state">{"No reminders set yet. Set up reminders for naps, bedtime and important activities."}</p> }
                    } else {
                        html! {
                            <div class="card-grid">
                                {for state.items.iter().map(|reminder| {
                                    let id = reminder.id.clone();
                                    let is_active = reminder.is_active;
                                    let on_toggle = on_toggle_reminder.clone();
                                    let on_delete = on_delete_reminder.clone();
                                    let toggle_id = id.clone();
                                    html! {
                                        <div class="card" key={reminder.id.clone()}>
                                            <h4>{format!("{} {}", reminder.kind.icon(), reminder.title)}</h4>
                                            <p>{format_clock(reminder.time)}</p>
                                            <p class="muted">{capitalize(reminder.frequency.as_str())}</p>
                                            <button
                                                class={classes!("badge", is_active.then_some("badge-active"))}
                                                onclick={Callback::from(move |_: MouseEvent| on_toggle.emit((toggle_id.clone(), is_active)))}
                                            >
                                                {if is_active { "Active" } else { "Inactive" }}
                                            </button>
                                            <button class="btn btn-danger btn-small" onclick={Callback::from(move |_: MouseEvent| on_delete.emit(id.clone()))}>
                                                {"Delete"}
                                            </button>
                                        </div>
                                    }
                                })}
                            </div>
                        }
                    }}
                </>
            }
        }
        Tab::Insights => {
            let state = &insights.state;
            html! {
                <>
                    <form class="entry-form" onsubmit={on_add_insight}>
                        <h3>{"Record a milestone"}</h3>
                        <div class="form-group">
                            <label for="insight-milestone">{"Milestone"}</label>
                            <input id="insight-milestone" type="text" placeholder="Rolling over" value={(*milestone).clone()} onchange={bind_input(&milestone)} />
                        </div>
                        <div class="form-group">
                            <label for="insight-impact">{"Impact on sleep"}</label>
                            <input id="insight-impact" type="text" value={(*impact).clone()} onchange={bind_input(&impact)} />
                        </div>
                        <div class="form-group">
                            <label for="insight-adjustment">{"Sleep adjustment"}</label>
                            <input id="insight-adjustment" type="text" value={(*adjustment).clone()} onchange={bind_input(&adjustment)} />
                        </div>
                        <div class="form-group">
                            <label for="insight-tips">{"Tips (one per line)"}</label>
                            <textarea id="insight-tips" value={(*tips).clone()} onchange={bind_area(&tips)} />
                        </div>
                        <div class="modal-buttons">
                            <button type="submit" class="btn btn-primary">{"Save Insight"}</button>
                            <button type="button" class="btn btn-secondary" onclick={on_prefill_insight}>
                                {"Use age guideline"}
                            </button>
                        </div>
                    </form>

                    <ErrorBanner message={state.error.clone()} />
                    {if state.loading && state.items.is_empty() {
                        html! { <LoadingSpinner /> }
                    } else if state.items.is_empty() {
                        html! { <p class="empty-state">{"No insights yet."}</p> }
                    } else {
                        html! {
                            <div class="insight-list">
                                {for state.items.iter().map(|insight| {
                                    let id = insight.id.clone();
                                    let on_delete = on_delete_insight.clone();
                                    html! {
                                        <div class="card" key={insight.id.clone()}>
                                            <h4>{&insight.milestone}</h4>
                                            <p class="muted">{&insight.age_group}</p>
                                            <p>{&insight.impact}</p>
                                            {if insight.sleep_adjustment.is_empty() {
                                                html! {}
                                            } else {
                                                html! { <p><strong>{"Sleep adjustment: "}</strong>{&insight.sleep_adjustment}</p> }
                                            }}
                                            <ul>
                                                {for insight.tips.iter().map(|tip| html! { <li>{tip.clone()}</li> })}
                                            </ul>
                                            <button class="btn btn-danger btn-small" onclick={Callback::from(move |_: MouseEvent| on_delete.emit(id.clone()))}>
                                                {"Delete"}
                                            </button>
                                        </div>
                                    }
                                })}
                            </div>
                        }
                    }}
                </>
            }
        }
    };

    html! {
        <div class="page parent-info">
            <div class="page-header">
                <h2>{format!("Parent Information for {}", active.name)}</h2>
                <BabySelector babies={baby.babies.items.clone()} active={Some(active.id.clone())} on_select={baby.select.clone()} />
            </div>
            <ErrorBanner message={(*action_error).clone()} />
            {tabs}
            {body}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use shared::Draft;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_reminder_draft_from_form() {
        let draft = reminder_draft("b1", "bedtime", " Bath and bed ", "19:30", "weekly").unwrap();
        assert_eq!(draft.kind, ReminderKind::Bedtime);
        assert_eq!(draft.title, "Bath and bed");
        assert_eq!(draft.time, NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(draft.frequency, ReminderFrequency::Weekly);
        assert!(draft.is_active);
        assert!(draft.missing_fields().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_reminder_draft_rejects_bad_fields() {
        assert!(reminder_draft("b1", "nap", "Nap", "", "daily").is_err());
        assert!(reminder_draft("b1", "bath", "Bath", "19:00", "daily").is_err());
        assert!(reminder_draft("b1", "nap", "Nap", "13:00", "hourly").is_err());
    }

    #[wasm_bindgen_test]
    fn test_capitalize() {
        assert_eq!(capitalize("checkup"), "Checkup");
        assert_eq!(capitalize(""), "");
    }
}
