use std::rc::Rc;

use gloo::timers::callback::Interval;
use shared::SessionStore;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::date_utils::now_unix_secs;

pub const EXPIRY_CHECK_INTERVAL_MS: u32 = 30_000;

/// Keeps the access token fresh while the app is open.
#[hook]
pub fn use_session_expiry(store: &Rc<SessionStore<ApiClient>>) {
    let store = store.clone();
    use_effect_with((), move |_| {
        let interval = Interval::new(EXPIRY_CHECK_INTERVAL_MS, move || {
            let store = (*store).clone();
            spawn_local(async move {
                store.refresh_if_expiring(now_unix_secs()).await;
            });
        });
        move || drop(interval)
    });
}
