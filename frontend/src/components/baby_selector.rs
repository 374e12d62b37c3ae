use shared::models::Baby;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct BabySelectorProps {
    pub babies: Vec<Baby>,
    pub active: Option<String>,
    pub on_select: Callback<String>,
}

#[function_component(BabySelector)]
pub fn baby_selector(props: &BabySelectorProps) -> Html {
    let on_change = {
        let on_select = props.on_select.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_select.emit(select.value());
        })
    };

    if props.babies.is_empty() {
        return html! {};
    }

    html! {
        <div class="baby-selector">
            <label for="baby-select">{"👶 Baby"}</label>
            <select id="baby-select" onchange={on_change}>
                {for props.babies.iter().map(|baby| html! {
                    <option
                        value={baby.id.clone()}
                        selected={props.active.as_deref() == Some(baby.id.as_str())}
                    >
                        {&baby.name}
                    </option>
                })}
            </select>
        </div>
    }
}
