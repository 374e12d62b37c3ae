use serde::Deserialize;
use shared::backend::Credentials;
use shared::session::{confirm_password, SignUpStatus};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::SessionContext;
use crate::routes::Route;

#[derive(Debug, Default, Deserialize)]
struct SignUpQuery {
    #[serde(default, rename = "ref")]
    referral: Option<String>,
}

#[derive(Properties, PartialEq)]
pub struct SignUpProps {
    pub session: SessionContext,
}

#[function_component(SignUpPage)]
pub fn sign_up_page(props: &SignUpProps) -> Html {
    let navigator = use_navigator();
    let referral = use_location()
        .and_then(|location| location.query::<SignUpQuery>().ok())
        .and_then(|query| query.referral)
        .unwrap_or_default();

    let email = use_state(String::new);
    let password = use_state(String::new);
    let confirmation = use_state(String::new);
    let referral_code = use_state(|| referral);
    let is_submitting = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);
    let awaiting_confirmation = use_state(|| false);

    let bind = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };

    let on_submit = {
        let store = props.session.store.clone();
        let email = email.clone();
        let password = password.clone();
        let confirmation = confirmation.clone();
        let referral_code = referral_code.clone();
        let is_submitting = is_submitting.clone();
        let error_message = error_message.clone();
        let awaiting_confirmation = awaiting_confirmation.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if let Err(e) = confirm_password(&password, &confirmation) {
                error_message.set(Some(e.to_string()));
                return;
            }

            let credentials = Credentials {
                email: email.trim().to_string(),
                password: (*password).clone(),
            };
            let code = (*referral_code).clone();
            let store = store.clone();
            let is_submitting = is_submitting.clone();
            let error_message = error_message.clone();
            let awaiting_confirmation = awaiting_confirmation.clone();
            let navigator = navigator.clone();

            is_submitting.set(true);
            error_message.set(None);
            spawn_local(async move {
                match store.sign_up(&credentials, Some(code.as_str())).await {
                    Ok(SignUpStatus::SignedIn(_)) => {
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Dashboard);
                        }
                    }
                    Ok(SignUpStatus::ConfirmationRequired) => awaiting_confirmation.set(true),
                    Err(e) => error_message.set(Some(e.to_string())),
                }
                is_submitting.set(false);
            });
        })
    };

    if *awaiting_confirmation {
        return html! {
            <div class="auth-page">
                <div class="auth-card">
                    <h2>{"📧 Check your email"}</h2>
                    <p>{"We sent you a confirmation link. Open it, then sign in."}</p>
                    <Link<Route> to={Route::Login} classes="btn btn-primary">{"Go to Sign In"}</Link<Route>>
                </div>
            </div>
        };
    }

    html! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>{"Create your account"}</h2>

                {if let Some(error) = (*error_message).clone() {
                    html! { <div class="form-error">{error}</div> }
                } else {
                    html! {}
                }}

                <form class="auth-form" onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="signup-email">{"Email"}</label>
                        <input id="signup-email" type="email" value={(*email).clone()}
                            onchange={bind(&email)} disabled={*is_submitting} autofocus=true />
                    </div>
                    <div class="form-group">
                        <label for="signup-password">{"Password"}</label>
                        <input id="signup-password" type="password" value={(*password).clone()}
                            onchange={bind(&password)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="signup-confirm">{"Confirm password"}</label>
                        <input id="signup-confirm" type="password" value={(*confirmation).clone()}
                            onchange={bind(&confirmation)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="signup-referral">{"Referral code (optional)"}</label>
                        <input id="signup-referral" type="text" value={(*referral_code).clone()}
                            onchange={bind(&referral_code)} disabled={*is_submitting} />
                    </div>
                    <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                        {if *is_submitting { "Creating account..." } else { "Sign Up" }}
                    </button>
                </form>

                <p class="auth-legal">
                    {"By signing up you agree to our "}
                    <Link<Route> to={Route::Terms}>{"Terms"}</Link<Route>>
                    {" and "}
                    <Link<Route> to={Route::Privacy}>{"Privacy Policy"}</Link<Route>>
                    {"."}
                </p>
                <div class="auth-links">
                    <span>
                        {"Already have an account? "}
                        <Link<Route> to={Route::Login}>{"Sign in"}</Link<Route>>
                    </span>
                </div>
            </div>
        </div>
    }
}
