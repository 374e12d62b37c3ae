use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;

const TERMS: [(&str, &str); 5] = [
    ("Use of the service", "BabySleep helps parents record and review their baby's sleep and daily care. It is not a medical device."),
    ("Your account", "You are responsible for keeping your credentials safe and for the information you enter."),
    ("Simulated features", "Cry analysis, the sleep consultant and the sleep monitor give general guidance only. Always consult your pediatrician about health concerns."),
    ("Subscriptions", "Premium plans renew each billing period until cancelled. Cancelling keeps premium access until the period ends."),
    ("Changes", "We may update these terms. Continued use after a change means you accept the updated terms."),
];

const PRIVACY: [(&str, &str); 4] = [
    ("What we store", "Your email address and the baby profiles, sleep logs, activities and growth records you create."),
    ("Who can see it", "Every record is tied to your account and is only readable by you."),
    ("Audio", "The cry analyzer asks for microphone access only while you record and does not upload audio."),
    ("Deleting data", "You can delete any record at any time from the page where it is listed."),
];

fn sections(items: &[(&str, &str)]) -> Html {
    html! {
        <>
            {for items.iter().map(|(title, body)| html! {
                <section class="legal-section">
                    <h3>{*title}</h3>
                    <p>{*body}</p>
                </section>
            })}
        </>
    }
}

#[function_component(TermsPage)]
pub fn terms_page() -> Html {
    html! {
        <div class="legal-page">
            <h2>{"Terms of Service"}</h2>
            {sections(&TERMS)}
            <Link<Route> to={Route::Landing}>{"← Back"}</Link<Route>>
        </div>
    }
}

#[function_component(PrivacyPage)]
pub fn privacy_page() -> Html {
    html! {
        <div class="legal-page">
            <h2>{"Privacy Policy"}</h2>
            {sections(&PRIVACY)}
            <Link<Route> to={Route::Landing}>{"← Back"}</Link<Route>>
        </div>
    }
}
