use serde::{Deserialize, Serialize};
use shared::guard::{guard, GuardDecision};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::SessionContext;
use crate::routes::Route;
use crate::services::logging::Logger;

/// `?from=` carried to the login view so it can bounce back after sign-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

pub(crate) fn requested_path(path: &str, query: &str) -> String {
    format!("{}{}", path, query)
}

#[derive(Properties, PartialEq)]
pub struct ProtectedRouteProps {
    pub session: SessionContext,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(ProtectedRoute)]
pub fn protected_route(props: &ProtectedRouteProps) -> Html {
    let location = use_location();
    let navigator = use_navigator();

    let path = location
        .map(|location| requested_path(location.path(), location.query_str()))
        .unwrap_or_else(|| "/".to_string());
    let decision = guard(&path, &props.session.snapshot);

    use_effect_with(decision.clone(), move |decision| {
        if let (GuardDecision::Redirect { to, from }, Some(navigator)) = (decision, navigator) {
            Logger::info_with_component(
                "protected-route",
                &format!("🔒 {} requires sign-in, redirecting to {}", from, to),
            );
            let target = Route::recognize(to).unwrap_or(Route::Login);
            let query = LoginQuery {
                from: Some(from.clone()),
            };
            if let Err(e) = navigator.replace_with_query(&target, &query) {
                Logger::error_with_component("protected-route", &format!("❌ Redirect failed: {}", e));
            }
        }
        || ()
    });

    match decision {
        GuardDecision::Render => props.children.clone(),
        GuardDecision::Loading => html! {
            <div class="page-loading">
                <div class="loading-spinner"></div>
                <p>{"Loading..."}</p>
            </div>
        },
        GuardDecision::Redirect { .. } => html! {},
    }
}
