use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::SessionContext;
use crate::routes::Route;

/// Landing point of the emailed reset link. The link signs the user in, so the
/// new password is set on the current session.
#[derive(Properties, PartialEq)]
pub struct ResetPasswordProps {
    pub session: SessionContext,
}

#[function_component(ResetPasswordPage)]
pub fn reset_password_page(props: &ResetPasswordProps) -> Html {
    let navigator = use_navigator();
    let password = use_state(String::new);
    let confirmation = use_state(String::new);
    let is_submitting = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);

    let bind = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            handle.set(input.value());
        })
    };

    let on_submit = {
        let store = props.session.store.clone();
        let password = password.clone();
        let confirmation = confirmation.clone();
        let is_submitting = is_submitting.clone();
        let error_message = error_message.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let store = store.clone();
            let password = (*password).clone();
            let confirmation = (*confirmation).clone();
            let is_submitting = is_submitting.clone();
            let error_message = error_message.clone();
            let navigator = navigator.clone();

            is_submitting.set(true);
            error_message.set(None);
            spawn_local(async move {
                match store.update_password(&password, &confirmation).await {
                    Ok(()) => {
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Dashboard);
                        }
                    }
                    Err(e) => error_message.set(Some(e.to_string())),
                }
                is_submitting.set(false);
            });
        })
    };

    if !props.session.snapshot.is_loading && !props.session.snapshot.is_authenticated() {
        return html! {
            <div class="auth-page">
                <div class="auth-card">
                    <h2>{"Reset link expired"}</h2>
                    <p>{"Open the latest link from your email, or request a new one."}</p>
                    <Link<Route> to={Route::ForgotPassword} classes="btn btn-primary">{"Request a new link"}</Link<Route>>
                </div>
            </div>
        };
    }

    html! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>{"Choose a new password"}</h2>
                {if let Some(error) = (*error_message).clone() {
                    html! { <div class="form-error">{error}</div> }
                } else {
                    html! {}
                }}
                <form class="auth-form" onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="reset-password">{"New password"}</label>
                        <input id="reset-password" type="password" value={(*password).clone()}
                            onchange={bind(&password)} disabled={*is_submitting} />
                    </div>
                    <div class="form-group">
                        <label for="reset-confirm">{"Confirm new password"}</label>
                        <input id="reset-confirm" type="password" value={(*confirmation).clone()}
                            onchange={bind(&confirmation)} disabled={*is_submitting} />
                    </div>
                    <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                        {if *is_submitting { "Saving..." } else { "Update Password" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
