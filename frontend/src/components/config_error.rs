use shared::config::{ANON_KEY_VAR, BACKEND_URL_VAR};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ConfigErrorProps {
    pub message: String,
}

/// Shown instead of the app when the backend settings were not compiled in.
#[function_component(ConfigErrorScreen)]
pub fn config_error_screen(props: &ConfigErrorProps) -> Html {
    html! {
        <div class="config-error">
            <h2>{"⚠️ BabySleep is not configured"}</h2>
            <p class="config-error-message">{&props.message}</p>
            <p>
                {"Rebuild the app with "}
                <code>{BACKEND_URL_VAR}</code>
                {" and "}
                <code>{ANON_KEY_VAR}</code>
                {" set."}
            </p>
        </div>
    }
}
