use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <div class="not-found">
            <h2>{"404"}</h2>
            <p>{"This page doesn't exist."}</p>
            <Link<Route> to={Route::Landing} classes="btn btn-primary">{"Go Home"}</Link<Route>>
        </div>
    }
}
