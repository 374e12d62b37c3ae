use shared::models::{Baby, NewBaby};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, MouseEvent};
use yew::prelude::*;

use crate::hooks::use_entity_list::ListHandle;
use crate::services::date_utils::parse_date_input;

#[derive(Properties, PartialEq)]
pub struct CreateBabyFormProps {
    pub list: ListHandle<Baby>,
    pub on_success: Callback<Baby>,
    /// Shows a Cancel button when set.
    #[prop_or_default]
    pub on_cancel: Option<Callback<()>>,
}

/// Name and birth date form. Mounted fresh each time it is shown, so it always
/// starts empty.
#[function_component(CreateBabyForm)]
pub fn create_baby_form(props: &CreateBabyFormProps) -> Html {
    let name = use_state(String::new);
    let birth_date = use_state(String::new);
    let is_submitting = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);

    let on_name_change = {
        let name = name.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };

    let on_birth_date_change = {
        let birth_date = birth_date.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            birth_date.set(input.value());
        })
    };

    let on_submit = {
        let name = name.clone();
        let birth_date = birth_date.clone();
        let is_submitting = is_submitting.clone();
        let error_message = error_message.clone();
        let on_success = props.on_success.clone();
        let list = props.list.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let draft = NewBaby {
                name: name.trim().to_string(),
                birth_date: parse_date_input(&birth_date),
            };

            is_submitting.set(true);
            error_message.set(None);

            let name = name.clone();
            let birth_date = birth_date.clone();
            let is_submitting = is_submitting.clone();
            let error_message = error_message.clone();
            let on_success = on_success.clone();
            let list = list.clone();

            spawn_local(async move {
                match list.add(&draft).await {
                    Ok(baby) => {
                        is_submitting.set(false);
                        name.set(String::new());
                        birth_date.set(String::new());
                        on_success.emit(baby);
                    }
                    Err(e) => {
                        is_submitting.set(false);
                        error_message.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let cancel_button = props.on_cancel.clone().map(|on_cancel| {
        html! {
            <button
                type="button"
                class="btn btn-secondary"
                onclick={Callback::from(move |_: MouseEvent| on_cancel.emit(()))}
                disabled={*is_submitting}
            >
                {"Cancel"}
            </button>
        }
    });

    html! {
        <>
            {if let Some(error) = (*error_message).clone() {
                html! { <div class="form-error">{error}</div> }
            } else {
                html! {}
            }}

            <form class="modal-form" onsubmit={on_submit}>
                <div class="form-group">
                    <label for="baby-name">{"Name"}</label>
                    <input
                        id="baby-name"
                        type="text"
                        placeholder="Baby's name"
                        value={(*name).clone()}
                        onchange={on_name_change}
                        disabled={*is_submitting}
                        autofocus=true
                    />
                </div>

                <div class="form-group">
                    <label for="baby-birth-date">{"Birth date"}</label>
                    <input
                        id="baby-birth-date"
                        type="date"
                        value={(*birth_date).clone()}
                        onchange={on_birth_date_change}
                        disabled={*is_submitting}
                    />
                </div>

                <div class="modal-buttons">
                    <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                        {if *is_submitting { "Adding..." } else { "Add Baby" }}
                    </button>
                    {for cancel_button}
                </div>
            </form>
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct CreateBabyModalProps {
    pub is_open: bool,
    pub list: ListHandle<Baby>,
    pub on_success: Callback<Baby>,
    pub on_close: Callback<()>,
}

#[function_component(CreateBabyModal)]
pub fn create_baby_modal(props: &CreateBabyModalProps) -> Html {
    let on_backdrop_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_close.emit(());
        })
    };

    let on_modal_click = Callback::from(|e: MouseEvent| {
        e.stop_propagation();
    });

    if !props.is_open {
        return html! {};
    }

    html! {
        <div class="modal-backdrop" onclick={on_backdrop_click}>
            <div class="modal" onclick={on_modal_click}>
                <h3 class="modal-title">{"👶 Add Baby"}</h3>
                <CreateBabyForm
                    list={props.list.clone()}
                    on_success={props.on_success.clone()}
                    on_cancel={Some(props.on_close.clone())}
                />
            </div>
        </div>
    }
}
