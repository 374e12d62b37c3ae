use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::SessionContext;
use crate::routes::Route;

const FEATURES: [(&str, &str, &str); 6] = [
    ("😴", "Sleep Logs", "Record every nap and night and see how long your baby really sleeps."),
    ("📊", "Analytics", "Daily sleep totals and quality trends at a glance."),
    ("🧠", "Cry Analyzer", "Get a best guess at what a cry means and what to try next."),
    ("🤖", "Sleep Consultant", "Age-appropriate guidance on schedules, naps and bedtime."),
    ("📹", "Sleep Monitor", "Movement, room climate and safety alerts while your baby sleeps."),
    ("📏", "Growth Tracking", "Weight, height and head circumference over time."),
];

#[derive(Properties, PartialEq)]
pub struct LandingProps {
    pub session: SessionContext,
}

#[function_component(LandingPage)]
pub fn landing_page(props: &LandingProps) -> Html {
    let signed_in = props.session.snapshot.is_authenticated();

    html! {
        <div class="landing">
            <section class="hero">
                <h1>{"🌙 BabySleep"}</h1>
                <p class="hero-subtitle">{"Better sleep for your baby, and for you."}</p>
                <div class="hero-actions">
                    {if signed_in {
                        html! {
                            <Link<Route> to={Route::Dashboard} classes="btn btn-primary">{"Go to Dashboard"}</Link<Route>>
                        }
                    } else {
                        html! {
                            <>
                                <Link<Route> to={Route::SignUp} classes="btn btn-primary">{"Get Started"}</Link<Route>>
                                <Link<Route> to={Route::Login} classes="btn btn-secondary">{"Sign In"}</Link<Route>>
                            </>
                        }
                    }}
                </div>
            </section>

            <section class="features">
                {for FEATURES.iter().map(|(icon, title, text)| html! {
                    <div class="feature-card">
                        <div class="feature-icon">{*icon}</div>
                        <h3>{*title}</h3>
                        <p>{*text}</p>
                    </div>
                })}
            </section>

            <footer class="landing-footer">
                <Link<Route> to={Route::Terms}>{"Terms of Service"}</Link<Route>>
                <Link<Route> to={Route::Privacy}>{"Privacy Policy"}</Link<Route>>
            </footer>
        </div>
    }
}
