use shared::models::{GrowthMeasure, GrowthRecord, GrowthTrend, NewGrowthRecord, TrendDirection};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::{BabySelector, ErrorBanner, LoadingSpinner, NoBabyNotice};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::{format_date, parse_date_input, today};

const MEASURES: [(GrowthMeasure, &str, &str); 3] = [
    (GrowthMeasure::Weight, "Weight", "kg"),
    (GrowthMeasure::Height, "Height", "cm"),
    (GrowthMeasure::HeadCircumference, "Head", "cm"),
];

/// Empty input means "not measured"; anything unparsable is rejected.
pub(crate) fn parse_measurement(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value > 0.0 => Ok(Some(value)),
        _ => Err(format!("'{}' is not a valid measurement", raw)),
    }
}

fn trend_text(trend: &GrowthTrend, unit: &str) -> String {
    let arrow = match trend.direction {
        TrendDirection::Up => "↑",
        TrendDirection::Down => "↓",
        TrendDirection::Stable => "→",
    };
    format!("{} {:+.2} {} ({:+.3}/day)", arrow, trend.change, unit, trend.daily_change)
}

#[derive(Properties, PartialEq)]
pub struct GrowthProps {
    pub session: SessionContext,
}

#[function_component(GrowthPage)]
pub fn growth_page(props: &GrowthProps) -> Html {
    let baby = use_active_baby(&props.session);
    let records = use_entity_list::<GrowthRecord>(&props.session, baby_scope(baby.active.as_ref()));

    let date = use_state(|| today().format("%Y-%m-%d").to_string());
    let weight = use_state(String::new);
    let height = use_state(String::new);
    let head = use_state(String::new);
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

    let on_submit = {
        let list = records.list.clone();
        let baby_id = baby.active.as_ref().map(|b| b.id.clone()).unwrap_or_default();
        let date = date.clone();
        let weight = weight.clone();
        let height = height.clone();
        let head = head.clone();
        let notes = notes.clone();
        let is_submitting = is_submitting.clone();
        let form_error = form_error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let measurements = (|| {
                Ok::<_, String>((
                    parse_measurement(&weight)?,
                    parse_measurement(&height)?,
                    parse_measurement(&head)?,
                ))
            })();
            let (weight_kg, height_cm, head_cm) = match measurements {
                Ok(values) => values,
                Err(message) => {
                    form_error.set(Some(message));
                    return;
                }
            };
            let draft = NewGrowthRecord {
                baby_id: baby_id.clone(),
                date: parse_date_input(&date),
                weight: weight_kg,
                height: height_cm,
                head_circumference: head_cm,
                notes: Some(notes.trim().to_string()).filter(|n| !n.is_empty()),
            };

            let list = list.clone();
            let fields = [weight.clone(), height.clone(), head.clone(), notes.clone()];
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
        let list = records.list.clone();
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
            <div class="page growth">
                <h2>{"Growth"}</h2>
                {if baby.babies.loading { html! { <LoadingSpinner /> } } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    };

    let state = &records.state;

    html! {
        <div class="page growth">
            <div class="page-header">
                <h2>{format!("{}'s Growth", active.name)}</h2>
                <BabySelector babies={baby.babies.items.clone()} active={Some(active.id.clone())} on_select={baby.select.clone()} />
            </div>

            <div class="stat-cards">
                {for MEASURES.iter().map(|(measure, label, unit)| {
                    let latest = state.items.iter().rev().find_map(|r| r.measure(*measure));
                    let trend = GrowthTrend::from_records(&state.items, *measure);
                    html! {
                        <div class="stat-card">
                            <span class="stat-label">{*label}</span>
                            <span class="stat-value">
                                {latest.map(|v| format!("{:.2} {}", v, unit)).unwrap_or_else(|| "-".to_string())}
                            </span>
                            <span class="stat-trend">
                                {trend.map(|t| trend_text(&t, unit)).unwrap_or_default()}
                            </span>
                        </div>
                    }
                })}
            </div>

            <form class="entry-form" onsubmit={on_submit}>
                <h3>{"Add measurement"}</h3>
                <ErrorBanner message={(*form_error).clone()} />
                <div class="form-row">
                    <div class="form-group">
                        <label for="growth-date">{"Date"}</label>
                        <input id="growth-date" type="date" value={(*date).clone()} onchange={bind(&date)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="growth-weight">{"Weight (kg)"}</label>
                        <input id="growth-weight" type="number" step="0.01" value={(*weight).clone()} onchange={bind(&weight)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="growth-height">{"Height (cm)"}</label>
                        <input id="growth-height" type="number" step="0.1" value={(*height).clone()} onchange={bind(&height)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="growth-head">{"Head (cm)"}</label>
                        <input id="growth-head" type="number" step="0.1" value={(*head).clone()} onchange={bind(&head)} disabled={*is_submitting} />
                    </div>
                </div>
                <div class="form-group">
                    <label for="growth-notes">{"Notes"}</label>
                    <input id="growth-notes" type="text" value={(*notes).clone()} onchange={bind(&notes)} disabled={*is_submitting} />
                </div>
                <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                    {if *is_submitting { "Saving..." } else { "Save Measurement" }}
                </button>
            </form>

            <ErrorBanner message={state.error.clone()} />
            {if state.loading && state.items.is_empty() {
                html! { <LoadingSpinner /> }
            } else if state.items.is_empty() {
                html! { <p class="empty-state">{"No measurements yet."}</p> }
            } else {
                html! {
                    <table class="entry-table">
                        <thead>
                            <tr>
                                <th>{"Date"}</th>
                                <th>{"Age"}</th>
                                <th>{"Weight"}</th>
                                <th>{"Height"}</th>
                                <th>{"Head"}</th>
                                <th>{"Notes"}</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {for state.items.iter().rev().map(|record| {
                                let (months, days) = record.age_at_measurement(active.birth_date);
                                let id = record.id.clone();
                                let on_delete = on_delete.clone();
                                html! {
                                    <tr key={record.id.clone()}>
                                        <td>{format_date(record.date)}</td>
                                        <td>{format!("{}m {}d", months, days)}</td>
                                        <td>{record.weight.map(|v| format!("{:.2} kg", v)).unwrap_or_default()}</td>
                                        <td>{record.height.map(|v| format!("{:.1} cm", v)).unwrap_or_default()}</td>
                                        <td>{record.head_circumference.map(|v| format!("{:.1} cm", v)).unwrap_or_default()}</td>
                                        <td>{record.notes.clone().unwrap_or_default()}</td>
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
