use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use shared::models::Baby;
use shared::ListState;

use crate::components::{CreateBabyForm, CreateBabyModal, ErrorBanner, LoadingSpinner};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::use_active_baby;
use crate::routes::Route;
use crate::services::date_utils::{format_date, today};
use crate::services::logging::Logger;

/// What the babies page body shows for a given list state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BabiesView {
    Loading,
    /// No babies yet: the create form is shown inline.
    Empty,
    Cards,
}

fn babies_view(state: &ListState<Baby>) -> BabiesView {
    match (state.items.is_empty(), state.loading) {
        (true, true) => BabiesView::Loading,
        (true, false) => BabiesView::Empty,
        (false, _) => BabiesView::Cards,
    }
}

#[derive(Properties, PartialEq)]
pub struct BabiesProps {
    pub session: SessionContext,
}

#[function_component(BabiesPage)]
pub fn babies_page(props: &BabiesProps) -> Html {
    let baby = use_active_baby(&props.session);
    let show_modal = use_state(|| false);
    let action_error = use_state(|| Option::<String>::None);

    let open_modal = {
        let show_modal = show_modal.clone();
        Callback::from(move |_: MouseEvent| show_modal.set(true))
    };
    let close_modal = {
        let show_modal = show_modal.clone();
        Callback::from(move |_: ()| show_modal.set(false))
    };
    let on_created = {
        let show_modal = show_modal.clone();
        let select = baby.select.clone();
        Callback::from(move |created: Baby| {
            Logger::info_with_component("babies-page", &format!("👶 Added {}", created.name));
            select.emit(created.id);
            show_modal.set(false);
        })
    };

    let on_delete = {
        let list = baby.list.clone();
        let action_error = action_error.clone();
        Callback::from(move |id: String| {
            let list = list.clone();
            let action_error = action_error.clone();
            spawn_local(async move {
                match list.remove(&id).await {
                    Ok(()) => action_error.set(None),
                    Err(e) => action_error.set(Some(e.to_string())),
                }
            });
        })
    };

    let today = today();
    let state = &baby.babies;

    html! {
        <div class="page babies">
            <div class="page-header">
                <h2>{"Babies"}</h2>
                <button class="btn btn-primary" onclick={open_modal}>{"+ Add Baby"}</button>
            </div>

            <ErrorBanner message={state.error.clone().or((*action_error).clone())} />

            {match babies_view(state) {
                BabiesView::Loading => html! { <LoadingSpinner /> },
                BabiesView::Empty => html! {
                    <div class="card">
                        <p class="empty-state">{"No babies yet. Add your first baby to get started."}</p>
                        <CreateBabyForm list={baby.list.clone()} on_success={on_created.clone()} />
                    </div>
                },
                BabiesView::Cards => html! {
                    <div class="baby-cards">
                        {for state.items.iter().map(|b| {
                            let id = b.id.clone();
                            let on_delete = on_delete.clone();
                            let is_active = baby.active.as_ref().map(|a| a.id == b.id).unwrap_or(false);
                            html! {
                                <div class={classes!("baby-card", is_active.then_some("active"))}>
                                    <Link<Route> to={Route::BabyProfile { id: b.id.clone() }} classes="baby-card-name">
                                        {&b.name}
                                    </Link<Route>>
                                    <span class="baby-card-age">{b.age_label(today)}</span>
                                    <span class="baby-card-birth">{format!("Born {}", format_date(b.birth_date))}</span>
                                    <button class="btn btn-danger" onclick={Callback::from(move |_: MouseEvent| on_delete.emit(id.clone()))}>
                                        {"Delete"}
                                    </button>
                                </div>
                            }
                        })}
                    </div>
                },
            }}

            <CreateBabyModal
                is_open={*show_modal}
                list={baby.list.clone()}
                on_success={on_created}
                on_close={close_modal}
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn state(items: Vec<Baby>, loading: bool) -> ListState<Baby> {
        ListState { items, loading, error: None }
    }

    #[wasm_bindgen_test]
    fn test_empty_account_gets_the_inline_form() {
        assert_eq!(babies_view(&state(vec![], true)), BabiesView::Loading);
        assert_eq!(babies_view(&state(vec![], false)), BabiesView::Empty);
    }

    #[wasm_bindgen_test]
    fn test_loaded_babies_show_cards() {
        let baby = Baby {
            id: "b1".into(),
            name: "Ada".into(),
            birth_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            user_id: "u".into(),
            created_at: None,
        };
        assert_eq!(babies_view(&state(vec![baby.clone()], false)), BabiesView::Cards);
        assert_eq!(babies_view(&state(vec![baby], true)), BabiesView::Cards);
    }
}
