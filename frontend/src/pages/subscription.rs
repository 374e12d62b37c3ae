use shared::subscriptions::{self, cancel_active, current_plan, plan_by_id, CurrentPlan, Plan, CURRENCY, PLANS};
use shared::models::SubscriptionRecord;
use shared::EntityAccess;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::ErrorBanner;
use crate::contexts::SessionContext;
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::api::ApiClient;
use crate::services::date_utils::{format_date, now_utc};

pub(crate) fn price_text(plan: &Plan) -> String {
    if plan.is_free() {
        "Free".to_string()
    } else {
        format!("${:.2} {} / {}", plan.price, CURRENCY, plan.interval.label())
    }
}

/// Whether `plan` is the one the user is on right now.
pub(crate) fn is_current(plan: &Plan, current: &CurrentPlan) -> bool {
    match current {
        CurrentPlan::Free => plan.is_free(),
        CurrentPlan::Premium { plan_id, .. } => plan.id == plan_id,
    }
}

#[derive(Properties, PartialEq)]
pub struct SubscriptionProps {
    pub session: SessionContext,
}

#[function_component(SubscriptionPage)]
pub fn subscription_page(props: &SubscriptionProps) -> Html {
    let subs = use_entity_list::<SubscriptionRecord>(&props.session, vec![]);
    let is_working = use_state(|| false);
    let action_error = use_state(|| Option::<String>::None);

    let current = current_plan(&subs.state.items, now_utc());

    let on_choose = {
        let client = props.session.client.clone();
        let owner = props.session.user_id();
        let refresh = subs.refresh.clone();
        let is_working = is_working.clone();
        let action_error = action_error.clone();
        Callback::from(move |plan_id: &'static str| {
            let Some(plan) = plan_by_id(plan_id) else {
                return;
            };
            let access = EntityAccess::<SubscriptionRecord, ApiClient>::new(client.clone());
            let owner = owner.clone();
            let refresh = refresh.clone();
            let is_working = is_working.clone();
            let action_error = action_error.clone();
            is_working.set(true);
            spawn_local(async move {
                match subscriptions::subscribe(&access, plan, owner.as_deref(), now_utc()).await {
                    Ok(_) => action_error.set(None),
                    Err(e) => action_error.set(Some(e.to_string())),
                }
                is_working.set(false);
                refresh.emit(());
            });
        })
    };

    let on_cancel = {
        let client = props.session.client.clone();
        let items = subs.state.items.clone();
        let refresh = subs.refresh.clone();
        let is_working = is_working.clone();
        let action_error = action_error.clone();
        Callback::from(move |_: MouseEvent| {
            let access = EntityAccess::<SubscriptionRecord, ApiClient>::new(client.clone());
            let items = items.clone();
            let refresh = refresh.clone();
            let is_working = is_working.clone();
            let action_error = action_error.clone();
            is_working.set(true);
            spawn_local(async move {
                match cancel_active(&access, &items).await {
                    Ok(_) => action_error.set(None),
                    Err(e) => action_error.set(Some(e.to_string())),
                }
                is_working.set(false);
                refresh.emit(());
            });
        })
    };

    html! {
        <div class="page subscription">
            <h2>{"⭐ BabySleep Premium"}</h2>
            <ErrorBanner message={(*action_error).clone().or_else(|| subs.state.error.clone())} />

            {match &current {
                CurrentPlan::Free => html! {
                    <p class="plan-status">{"You're on the Free Plan."}</p>
                },
                CurrentPlan::Premium { plan_id, period_end } => html! {
                    <div class="plan-status premium">
                        <p>
                            {format!(
                                "You're on {} until {}.",
                                plan_by_id(plan_id).map(|p| p.name).unwrap_or("Premium"),
                                format_date(period_end.date_naive())
                            )}
                        </p>
                        <button class="btn btn-secondary" onclick={on_cancel} disabled={*is_working}>{"Cancel Subscription"}</button>
                    </div>
                },
            }}

            <div class="plan-grid">
                {for PLANS.iter().map(|plan| {
                    let selected = is_current(plan, &current);
                    let on_choose = on_choose.clone();
                    let plan_id = plan.id;
                    let classes = classes!("plan-card", plan.popular.then_some("popular"), selected.then_some("current"));
                    html! {
                        <div key={plan.id} class={classes}>
                            {if plan.popular { html! { <span class="plan-badge">{"Most Popular"}</span> } } else { html! {} }}
                            <h3>{plan.name}</h3>
                            <p class="plan-price">{price_text(plan)}</p>
                            <ul>
                                {for plan.features.iter().map(|f| html! { <li>{*f}</li> })}
                            </ul>
                            {if selected {
                                html! { <button class="btn" disabled=true>{"Current Plan"}</button> }
                            } else if plan.is_free() {
                                html! {}
                            } else {
                                html! {
                                    <button class="btn btn-primary" disabled={*is_working}
                                        onclick={Callback::from(move |_: MouseEvent| on_choose.emit(plan_id))}>
                                        {"Upgrade"}
                                    </button>
                                }
                            }}
                        </div>
                    }
                })}
            </div>
            <p class="disclaimer">{"Payments are simulated. No card is charged."}</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::subscriptions::{FREE_PLAN, PREMIUM_MONTHLY, PREMIUM_YEARLY};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_price_text() {
        assert_eq!(price_text(&FREE_PLAN), "Free");
        assert_eq!(price_text(&PREMIUM_MONTHLY), "$9.99 USD / month");
    }

    #[wasm_bindgen_test]
    fn test_is_current() {
        assert!(is_current(&FREE_PLAN, &CurrentPlan::Free));
        let premium = CurrentPlan::Premium {
            plan_id: "premium-yearly".into(),
            period_end: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        assert!(is_current(&PREMIUM_YEARLY, &premium));
        assert!(!is_current(&FREE_PLAN, &premium));
    }
}
