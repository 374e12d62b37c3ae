use std::rc::Rc;

use gloo::events::EventListener;
use shared::session::{AuthEvent, SessionSnapshot, SessionStore};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::hooks::use_session_expiry::use_session_expiry;
use crate::services::api::{ApiClient, SESSION_STORAGE_KEY};
use crate::services::logging::Logger;

const COMPONENT: &str = "session";

/// What every view gets from the application root.
#[derive(Clone)]
pub struct SessionContext {
    pub client: Rc<ApiClient>,
    pub store: SessionStore<ApiClient>,
    pub snapshot: SessionSnapshot,
}

impl PartialEq for SessionContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client) && self.snapshot == other.snapshot
    }
}

impl SessionContext {
    pub fn user_id(&self) -> Option<String> {
        self.snapshot.user_id().map(str::to_string)
    }
}

fn event_for_storage_change(signed_in: bool) -> AuthEvent {
    if signed_in {
        AuthEvent::SignedIn
    } else {
        AuthEvent::SignedOut
    }
}

#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub client: Rc<ApiClient>,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let store = use_memo(props.client.clone(), |client| SessionStore::new(client.clone()));
    let snapshot = use_state(|| store.current());

    // Subscribe before resolving the persisted session so InitialSession is seen.
    {
        let store = store.clone();
        let snapshot = snapshot.clone();
        let client = props.client.clone();
        use_effect_with((), move |_| {
            let subscription = store.subscribe({
                let snapshot = snapshot.clone();
                move |event, next| {
                    Logger::debug_with_component(
                        COMPONENT,
                        &format!("🔔 {:?}: authenticated={}", event, next.is_authenticated()),
                    );
                    snapshot.set(next.clone());
                }
            });

            spawn_local({
                let store = (*store).clone();
                async move { store.initialize().await }
            });

            // Sign-in and sign-out in another tab rewrite the persisted session.
            let storage_listener = EventListener::new(&gloo::utils::window(), "storage", {
                let store = (*store).clone();
                move |event| {
                    let Some(event) = event.dyn_ref::<web_sys::StorageEvent>() else {
                        return;
                    };
                    if event.key().as_deref() != Some(SESSION_STORAGE_KEY) {
                        return;
                    }
                    let session = client.reload_from_storage();
                    Logger::info_with_component(COMPONENT, "🔁 Session changed in another tab");
                    store.apply_external_change(event_for_storage_change(session.is_some()), session);
                }
            });

            move || {
                drop(subscription);
                drop(storage_listener);
            }
        });
    }

    use_session_expiry(&store);

    let context = SessionContext {
        client: props.client.clone(),
        store: (*store).clone(),
        snapshot: (*snapshot).clone(),
    };

    html! {
        <ContextProvider<SessionContext> context={context}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}
