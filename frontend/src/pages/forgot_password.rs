use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::SessionContext;
use crate::routes::Route;

#[derive(Properties, PartialEq)]
pub struct ForgotPasswordProps {
    pub session: SessionContext,
}

#[function_component(ForgotPasswordPage)]
pub fn forgot_password_page(props: &ForgotPasswordProps) -> Html {
    let email = use_state(String::new);
    let is_submitting = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);
    let sent = use_state(|| false);

    let on_email_change = {
        let email = email.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_submit = {
        let store = props.session.store.clone();
        let email = email.clone();
        let is_submitting = is_submitting.clone();
        let error_message = error_message.clone();
        let sent = sent.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let store = store.clone();
            let email = (*email).clone();
            let is_submitting = is_submitting.clone();
            let error_message = error_message.clone();
            let sent = sent.clone();

            is_submitting.set(true);
            error_message.set(None);
            spawn_local(async move {
                match store.request_password_reset(&email).await {
                    Ok(()) => sent.set(true),
                    Err(e) => error_message.set(Some(e.to_string())),
                }
                is_submitting.set(false);
            });
        })
    };

    html! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>{"Reset your password"}</h2>
                {if *sent {
                    html! {
                        <p class="form-success">
                            {"If an account exists for that email, a reset link is on its way."}
                        </p>
                    }
                } else {
                    html! {
                        <>
                            {if let Some(error) = (*error_message).clone() {
                                html! { <div class="form-error">{error}</div> }
                            } else {
                                html! {}
                            }}
                            <form class="auth-form" onsubmit={on_submit}>
                                <div class="form-group">
                                    <label for="forgot-email">{"Email"}</label>
                                    <input id="forgot-email" type="email" value={(*email).clone()}
                                        onchange={on_email_change} disabled={*is_submitting} />
                                </div>
                                <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                                    {if *is_submitting { "Sending..." } else { "Send Reset Link" }}
                                </button>
                            </form>
                        </>
                    }
                }}
                <div class="auth-links">
                    <Link<Route> to={Route::Login}>{"Back to sign in"}</Link<Route>>
                </div>
            </div>
        </div>
    }
}
