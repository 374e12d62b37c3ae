use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;

#[derive(Properties, PartialEq)]
pub struct ErrorBannerProps {
    pub message: Option<String>,
}

#[function_component(ErrorBanner)]
pub fn error_banner(props: &ErrorBannerProps) -> Html {
    match &props.message {
        Some(message) => html! { <div class="form-error">{"⚠️ "}{message}</div> },
        None => html! {},
    }
}

/// Shown by the per-baby trackers until a baby profile exists.
#[function_component(NoBabyNotice)]
pub fn no_baby_notice() -> Html {
    html! {
        <div class="empty-state">
            <p>{"👶 Add a baby profile to start tracking."}</p>
            <Link<Route> to={Route::Babies} classes="btn btn-primary">{"Add a Baby"}</Link<Route>>
        </div>
    }
}

#[function_component(LoadingSpinner)]
pub fn loading_spinner() -> Html {
    html! {
        <div class="page-loading">
            <div class="loading-spinner"></div>
        </div>
    }
}
