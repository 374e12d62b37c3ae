use shared::backend::Credentials;
use shared::guard::post_login_target;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::protected_route::LoginQuery;
use crate::contexts::SessionContext;
use crate::routes::Route;
use crate::services::logging::Logger;

/// Route for the bounce-back target, falling back to the dashboard.
pub(crate) fn target_route(from: Option<&str>) -> Route {
    let target = post_login_target(from);
    let path = target.split(['?', '#']).next().unwrap_or(&target);
    match Route::recognize(path) {
        Some(Route::NotFound) | None => Route::Dashboard,
        Some(route) => route,
    }
}

#[derive(Properties, PartialEq)]
pub struct LoginProps {
    pub session: SessionContext,
}

#[function_component(LoginPage)]
pub fn login_page(props: &LoginProps) -> Html {
    let navigator = use_navigator();
    let from = use_location()
        .and_then(|location| location.query::<LoginQuery>().ok())
        .and_then(|query| query.from);

    let email = use_state(String::new);
    let password = use_state(String::new);
    let is_submitting = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);

    // Already signed in (or just signed in): leave the login view.
    {
        let navigator = navigator.clone();
        let from = from.clone();
        use_effect_with(props.session.snapshot.is_authenticated(), move |authenticated| {
            if *authenticated {
                if let Some(navigator) = navigator {
                    navigator.replace(&target_route(from.as_deref()));
                }
            }
            || ()
        });
    }

    let on_email_change = {
        let email = email.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_password_change = {
        let password = password.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            password.set(input.value());
        })
    };

    let on_submit = {
        let store = props.session.store.clone();
        let email = email.clone();
        let password = password.clone();
        let is_submitting = is_submitting.clone();
        let error_message = error_message.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let credentials = Credentials {
                email: email.trim().to_string(),
                password: (*password).clone(),
            };
            let store = store.clone();
            let is_submitting = is_submitting.clone();
            let error_message = error_message.clone();

            is_submitting.set(true);
            error_message.set(None);
            spawn_local(async move {
                if let Err(e) = store.sign_in(&credentials).await {
                    Logger::warn_with_component("login", &format!("⚠️ Sign-in failed: {}", e));
                    error_message.set(Some(e.to_string()));
                }
                is_submitting.set(false);
            });
        })
    };

    html! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>{"Welcome back"}</h2>
                <p class="auth-subtitle">{"Sign in to continue tracking your baby's sleep."}</p>

                {if let Some(error) = (*error_message).clone() {
                    html! { <div class="form-error">{error}</div> }
                } else {
                    html! {}
                }}

                <form class="auth-form" onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="login-email">{"Email"}</label>
                        <input id="login-email" type="email" value={(*email).clone()}
                            onchange={on_email_change} disabled={*is_submitting} autofocus=true />
                    </div>
                    <div class="form-group">
                        <label for="login-password">{"Password"}</label>
                        <input id="login-password" type="password" value={(*password).clone()}
                            onchange={on_password_change} disabled={*is_submitting} />
                    </div>
                    <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                        {if *is_submitting { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>

                <div class="auth-links">
                    <Link<Route> to={Route::ForgotPassword}>{"Forgot your password?"}</Link<Route>>
                    <span>
                        {"New here? "}
                        <Link<Route> to={Route::SignUp}>{"Create an account"}</Link<Route>>
                    </span>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_target_route() {
        assert_eq!(target_route(None), Route::Dashboard);
        assert_eq!(target_route(Some("/growth")), Route::Growth);
        assert_eq!(target_route(Some("/analytics?range=30d")), Route::Analytics);
        assert_eq!(
            target_route(Some("/babies/b1")),
            Route::BabyProfile { id: "b1".into() }
        );
        assert_eq!(target_route(Some("/login")), Route::Dashboard);
        assert_eq!(target_route(Some("https://evil.example")), Route::Dashboard);
        assert_eq!(target_route(Some("/no-such-page")), Route::Dashboard);
    }
}
