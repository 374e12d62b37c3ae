use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::SessionContext;
use crate::routes::{Route, NAV_ITEMS};

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub session: SessionContext,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let navigator = use_navigator();
    let current = use_route::<Route>();
    let signing_out = use_state(|| false);

    let on_sign_out = {
        let store = props.session.store.clone();
        let signing_out = signing_out.clone();
        Callback::from(move |_: MouseEvent| {
            let store = store.clone();
            let signing_out = signing_out.clone();
            let navigator = navigator.clone();
            signing_out.set(true);
            spawn_local(async move {
                store.sign_out().await;
                signing_out.set(false);
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

    html! {
        <header class="header">
            <div class="container">
                <Link<Route> to={Route::Dashboard} classes="brand">
                    <h1>{"🌙 BabySleep"}</h1>
                </Link<Route>>
                <nav class="header-nav">
                    {for NAV_ITEMS.iter().map(|(route, label)| {
                        let classes = if current.as_ref() == Some(route) {
                            "nav-link active"
                        } else {
                            "nav-link"
                        };
                        html! {
                            <Link<Route> to={route.clone()} classes={classes}>{*label}</Link<Route>>
                        }
                    })}
                </nav>
                <div class="header-right">
                    <Link<Route> to={Route::Settings} classes="user-email">{email}</Link<Route>>
                    <button class="btn btn-secondary" onclick={on_sign_out} disabled={*signing_out}>
                        {if *signing_out { "Signing out..." } else { "Sign Out" }}
                    </button>
                </div>
            </div>
        </header>
    }
}
