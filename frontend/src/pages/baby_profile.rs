use shared::backend::Filter;
use shared::insights::guideline_for_age;
use shared::models::{Baby, BabyPatch, GrowthRecord, SleepLog};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::{ErrorBanner, LoadingSpinner};
use crate::contexts::SessionContext;
use crate::hooks::use_entity_list::use_entity_list;
use crate::routes::Route;
use crate::services::date_utils::{format_date, format_datetime, parse_date_input, today};

#[derive(Properties, PartialEq)]
pub struct BabyProfileProps {
    pub session: SessionContext,
    pub id: String,
}

#[function_component(BabyProfilePage)]
pub fn baby_profile_page(props: &BabyProfileProps) -> Html {
    let navigator = use_navigator();
    let babies = use_entity_list::<Baby>(&props.session, vec![Filter::eq("id", props.id.as_str())]);
    let scope = vec![Filter::eq("baby_id", props.id.as_str())];
    let logs = use_entity_list::<SleepLog>(&props.session, scope.clone());
    let growth = use_entity_list::<GrowthRecord>(&props.session, scope);

    let name = use_state(String::new);
    let birth_date = use_state(String::new);
    let message = use_state(|| Option::<String>::None);
    let error = use_state(|| Option::<String>::None);

    let baby = babies.state.items.first().cloned();

    // Fill the edit form once the row arrives.
    {
        let name = name.clone();
        let birth_date = birth_date.clone();
        use_effect_with(baby.clone(), move |baby| {
            if let Some(baby) = baby {
                name.set(baby.name.clone());
                birth_date.set(baby.birth_date.format("%Y-%m-%d").to_string());
            }
            || ()
        });
    }

    let on_name_change = {
        let name = name.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };
    let on_birth_date_change = {
        let birth_date = birth_date.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            birth_date.set(input.value());
        })
    };

    let on_save = {
        let list = babies.list.clone();
        let id = props.id.clone();
        let name = name.clone();
        let birth_date = birth_date.clone();
        let message = message.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let patch = BabyPatch {
                name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
                birth_date: parse_date_input(&birth_date),
            };
            let list = list.clone();
            let id = id.clone();
            let message = message.clone();
            let error = error.clone();
            spawn_local(async move {
                match list.edit(&id, &patch).await {
                    Ok(_) => {
                        error.set(None);
                        message.set(Some("Profile saved".to_string()));
                    }
                    Err(e) => error.set(Some(e.to_string())),
                }
            });
        })
    };

    let on_delete = {
        let list = babies.list.clone();
        let id = props.id.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            let list = list.clone();
            let id = id.clone();
            let error = error.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                match list.remove(&id).await {
                    Ok(()) => {
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Babies);
                        }
                    }
                    Err(e) => error.set(Some(e.to_string())),
                }
            });
        })
    };

    let Some(baby) = baby else {
        return if babies.state.loading || babies.state.error.is_some() {
            html! {
                <div class="page baby-profile">
                    <ErrorBanner message={babies.state.error.clone()} />
                    <LoadingSpinner />
                </div>
            }
        } else {
            html! {
                <div class="page baby-profile">
                    <p class="empty-state">{"This baby profile doesn't exist."}</p>
                    <Link<Route> to={Route::Babies}>{"← All babies"}</Link<Route>>
                </div>
            }
        };
    };

    let today = today();
    let guideline = guideline_for_age(baby.age_in_months(today));
    let latest_growth = growth.state.items.last();

    html! {
        <div class="page baby-profile">
            <Link<Route> to={Route::Babies}>{"← All babies"}</Link<Route>>
            <h2>{&baby.name}</h2>
            <p class="baby-meta">
                {format!("{} old · born {}", baby.age_label(today), format_date(baby.birth_date))}
            </p>

            <ErrorBanner message={(*error).clone()} />
            {if let Some(message) = (*message).clone() {
                html! { <div class="form-success">{message}</div> }
            } else {
                html! {}
            }}

            <form class="profile-form" onsubmit={on_save}>
                <div class="form-group">
                    <label for="profile-name">{"Name"}</label>
                    <input id="profile-name" type="text" value={(*name).clone()} onchange={on_name_change} />
                </div>
                <div class="form-group">
                    <label for="profile-birth-date">{"Birth date"}</label>
                    <input id="profile-birth-date" type="date" value={(*birth_date).clone()} onchange={on_birth_date_change} />
                </div>
                <div class="form-buttons">
                    <button type="submit" class="btn btn-primary">{"Save"}</button>
                    <button type="button" class="btn btn-danger" onclick={on_delete}>{"Delete Profile"}</button>
                </div>
            </form>

            <div class="guideline-card">
                <h3>{format!("Sleep guide: {}", guideline.age_group)}</h3>
                <ul>
                    <li>{format!("Total sleep: {}", guideline.total_sleep)}</li>
                    <li>{format!("Night sleep: {}", guideline.night_sleep)}</li>
                    <li>{format!("Naps: {} ({})", guideline.naps, guideline.nap_duration)}</li>
                    <li>{format!("Wake windows: {}", guideline.wake_windows)}</li>
                </ul>
            </div>

            <div class="profile-summary">
                <h3>{"Recent sleep"}</h3>
                {if logs.state.items.is_empty() {
                    html! { <p>{"No sleep logged yet."}</p> }
                } else {
                    html! {
                        <ul>
                            {for logs.state.items.iter().take(5).map(|log| html! {
                                <li>
                                    {format_datetime(log.sleep_time)}
                                    {match log.duration_hours() {
                                        Some(hours) => format!(" · {:.1}h", hours),
                                        None => " · still asleep".to_string(),
                                    }}
                                </li>
                            })}
                        </ul>
                    }
                }}
                <h3>{"Latest measurement"}</h3>
                {match latest_growth {
                    Some(record) => html! {
                        <p>
                            {format_date(record.date)}
                            {record.weight.map(|w| format!(" · {:.2} kg", w)).unwrap_or_default()}
                            {record.height.map(|h| format!(" · {:.1} cm", h)).unwrap_or_default()}
                        </p>
                    },
                    None => html! { <p>{"No growth records yet."}</p> },
                }}
            </div>
        </div>
    }
}
