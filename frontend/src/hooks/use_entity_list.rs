use std::ops::Deref;
use std::rc::Rc;

use shared::backend::Filter;
use shared::{Entity, EntityAccess, EntityList, ListState, RequestSequence};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::contexts::SessionContext;
use crate::services::api::ApiClient;

/// Shared handle to a live list; equal only to itself so it can travel in props.
pub struct ListHandle<E>(Rc<EntityList<E, ApiClient>>);

impl<E> Clone for ListHandle<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E> PartialEq for ListHandle<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> Deref for ListHandle<E> {
    type Target = EntityList<E, ApiClient>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct UseEntityListResult<E: Entity> {
    pub state: ListState<E>,
    /// Mutations go through here so the list refreshes itself afterwards.
    pub list: ListHandle<E>,
    pub refresh: Callback<()>,
}

/// Owner-scoped list of one table, re-fetched whenever the signed-in user or
/// the extra scope filters change.
#[hook]
pub fn use_entity_list<E>(session: &SessionContext, scope: Vec<Filter>) -> UseEntityListResult<E>
where
    E: Entity,
{
    let state = use_state(ListState::<E>::default);
    // Shared by every list this hook builds, so a replaced list's late reply is dropped.
    let sequence = use_memo((), |_| RequestSequence::default());
    let owner = session.user_id();

    let list = {
        let client = session.client.clone();
        let state = state.clone();
        let sequence = (*sequence).clone();
        use_memo((owner.clone(), scope.clone()), move |(owner, scope)| {
            let access = scope
                .iter()
                .cloned()
                .fold(EntityAccess::<E, ApiClient>::new(client), EntityAccess::scoped);
            EntityList::new(access, owner.clone())
                .sharing_sequence(sequence)
                .on_change(move |next| state.set(next.clone()))
        })
    };

    let refresh = {
        let list = list.clone();
        Callback::from(move |_: ()| {
            let list = list.clone();
            spawn_local(async move {
                list.refresh().await;
            });
        })
    };

    {
        let refresh = refresh.clone();
        use_effect_with((owner, scope), move |(owner, _)| {
            if owner.is_some() {
                refresh.emit(());
            }
            || ()
        });
    }

    UseEntityListResult {
        state: (*state).clone(),
        list: ListHandle(list),
        refresh,
    }
}
