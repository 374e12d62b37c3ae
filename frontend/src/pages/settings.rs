use shared::models::SubscriptionRecord;
use shared::subscriptions::{current_plan, plan_by_id, CurrentPlan};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::ErrorBanner;
use crate::contexts::SessionContext;
use crate::hooks::use_entity_list::use_entity_list;
use crate::routes::Route;
use crate::services::date_utils::now_utc;

#[derive(Properties, PartialEq)]
pub struct SettingsProps {
    pub session: SessionContext,
}

#[function_component(SettingsPage)]
pub fn settings_page(props: &SettingsProps) -> Html {
    let navigator = use_navigator();
    let subs = use_entity_list::<SubscriptionRecord>(&props.session, vec![]);

    let password = use_state(String::new);
    let confirmation = use_state(String::new);
    let is_saving = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);
    let saved = use_state(|| false);

    let bind = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };

    let on_update_password = {
        let store = props.session.store.clone();
        let password = password.clone();
        let confirmation = confirmation.clone();
        let is_saving = is_saving.clone();
        let error_message = error_message.clone();
        let saved = saved.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let store = store.clone();
            let password = password.clone();
            let confirmation = confirmation.clone();
            let is_saving = is_saving.clone();
            let error_message = error_message.clone();
            let saved = saved.clone();
            is_saving.set(true);
            saved.set(false);
            spawn_local(async move {
                match store.update_password(&password, &confirmation).await {
                    Ok(()) => {
                        error_message.set(None);
                        saved.set(true);
                        password.set(String::new());
                        confirmation.set(String::new());
                    }
                    Err(e) => error_message.set(Some(e.to_string())),
                }
                is_saving.set(false);
            });
        })
    };

    let on_sign_out = {
        let store = props.session.store.clone();
        Callback::from(move |_: MouseEvent| {
            let store = store.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                store.sign_out().await;
                if let Some(navigator) = navigator {
                    navigator.push(&Route::Landing);
                }
            });
        })
    };

    let email = props
        .session
        .snapshot
        .identity
        .as_ref()
        .and_then(|identity| identity.email.clone())
        .unwrap_or_default();
    let plan_name = match current_plan(&subs.state.items, now_utc()) {
        CurrentPlan::Free => "Free Plan",
        CurrentPlan::Premium { plan_id, .. } => plan_by_id(&plan_id).map(|p| p.name).unwrap_or("Premium"),
    };

    html! {
        <div class="page settings">
            <h2>{"⚙️ Settings"}</h2>

            <section class="settings-section">
                <h3>{"Account"}</h3>
                <p>{"Email: "}<strong>{email}</strong></p>
                <p>
                    {"Plan: "}<strong>{plan_name}</strong>{" · "}
                    <Link<Route> to={Route::Subscription}>{"Manage plan"}</Link<Route>>
                </p>
            </section>

            <section class="settings-section">
                <h3>{"Change password"}</h3>
                <ErrorBanner message={(*error_message).clone()} />
                {if *saved { html! { <div class="success-message">{"Password updated."}</div> } } else { html! {} }}
                <form onsubmit={on_update_password}>
                    <input type="password" placeholder="New password" value={(*password).clone()} onchange={bind(&password)} />
                    <input type="password" placeholder="Confirm new password" value={(*confirmation).clone()} onchange={bind(&confirmation)} />
                    <button type="submit" class="btn btn-primary" disabled={*is_saving}>
                        {if *is_saving { "Saving..." } else { "Update Password" }}
                    </button>
                </form>
            </section>

            <section class="settings-section">
                <button class="btn btn-secondary" onclick={on_sign_out}>{"Sign Out"}</button>
            </section>
        </div>
    }
}
