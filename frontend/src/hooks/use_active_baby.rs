use gloo::storage::{LocalStorage, Storage};
use shared::backend::Filter;
use shared::models::Baby;
use shared::ListState;
use yew::prelude::*;

use crate::contexts::SessionContext;
use crate::hooks::use_entity_list::{use_entity_list, ListHandle};

pub const ACTIVE_BABY_STORAGE_KEY: &str = "babysleep.active_baby";

/// The remembered baby if it still exists, otherwise the first one listed.
pub(crate) fn resolve_active<'a>(babies: &'a [Baby], remembered: Option<&str>) -> Option<&'a Baby> {
    remembered
        .and_then(|id| babies.iter().find(|baby| baby.id == id))
        .or_else(|| babies.first())
}

/// List scope for one baby's records; unscoped while no baby exists.
pub fn baby_scope(active: Option<&Baby>) -> Vec<Filter> {
    active
        .map(|baby| vec![Filter::eq("baby_id", baby.id.as_str())])
        .unwrap_or_default()
}

pub struct UseActiveBabyResult {
    pub babies: ListState<Baby>,
    pub list: ListHandle<Baby>,
    pub active: Option<Baby>,
    pub select: Callback<String>,
}

/// Baby selection shared by the per-baby trackers; survives reloads.
#[hook]
pub fn use_active_baby(session: &SessionContext) -> UseActiveBabyResult {
    let babies = use_entity_list::<Baby>(session, Vec::new());
    let remembered = use_state(|| LocalStorage::get::<String>(ACTIVE_BABY_STORAGE_KEY).ok());

    let select = {
        let remembered = remembered.clone();
        use_callback((), move |baby_id: String, _| {
            if let Err(e) = LocalStorage::set(ACTIVE_BABY_STORAGE_KEY, &baby_id) {
                gloo::console::warn!("Could not remember selected baby:", e.to_string());
            }
            remembered.set(Some(baby_id));
        })
    };

    let active = resolve_active(&babies.state.items, remembered.as_deref()).cloned();

    UseActiveBabyResult {
        babies: babies.state,
        list: babies.list,
        active,
        select,
    }
}
