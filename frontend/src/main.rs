use shared::config::BackendConfig;
use yew::prelude::*;
use yew_router::prelude::*;

mod components;
mod contexts;
mod hooks;
mod pages;
mod routes;
mod services;

use components::{ConfigErrorScreen, Header, ProtectedRoute};
use contexts::{SessionContext, SessionProvider};
use pages::*;
use routes::Route;
use services::api::ApiClient;
use services::logging::Logger;

/// Wrap a signed-in view in the guard and the app chrome.
fn protected(session: &SessionContext, page: Html) -> Html {
    html! {
        <ProtectedRoute session={session.clone()}>
            <Header session={session.clone()} />
            <main class="main-content">{page}</main>
        </ProtectedRoute>
    }
}

fn switch(route: Route, session: &SessionContext) -> Html {
    let s = session.clone();
    match route {
        Route::Landing => html! { <LandingPage session={s} /> },
        Route::Login => html! { <LoginPage session={s} /> },
        Route::SignUp => html! { <SignUpPage session={s} /> },
        Route::ForgotPassword => html! { <ForgotPasswordPage session={s} /> },
        Route::ResetPassword => html! { <ResetPasswordPage session={s} /> },
        Route::Terms => html! { <TermsPage /> },
        Route::Privacy => html! { <PrivacyPage /> },
        Route::NotFound => html! { <NotFoundPage /> },
        Route::Dashboard => protected(session, html! { <DashboardPage session={s} /> }),
        Route::Babies => protected(session, html! { <BabiesPage session={s} /> }),
        Route::BabyProfile { id } => protected(session, html! { <BabyProfilePage session={s} {id} /> }),
        Route::SleepLogs => protected(session, html! { <SleepLogsPage session={s} /> }),
        Route::Analytics => protected(session, html! { <AnalyticsPage session={s} /> }),
        Route::Growth => protected(session, html! { <GrowthPage session={s} /> }),
        Route::Activities => protected(session, html! { <ActivitiesPage session={s} /> }),
        Route::SleepSchedule => protected(session, html! { <SleepSchedulePage session={s} /> }),
        Route::SleepSounds => protected(session, html! { <SleepSoundsPage session={s} /> }),
        Route::ParentInfo => protected(session, html! { <ParentInfoPage session={s} /> }),
        Route::CryAnalyzer => protected(session, html! { <CryAnalyzerPage session={s} /> }),
        Route::Assistant => protected(session, html! { <AssistantPage session={s} /> }),
        Route::Monitor => protected(session, html! { <MonitorPage session={s} /> }),
        Route::Subscription => protected(session, html! { <SubscriptionPage session={s} /> }),
        Route::Referrals => protected(session, html! { <ReferralsPage session={s} /> }),
        Route::Settings => protected(session, html! { <SettingsPage session={s} /> }),
    }
}

#[function_component(AppRoutes)]
fn app_routes() -> Html {
    let Some(session) = use_context::<SessionContext>() else {
        return html! {};
    };
    html! {
        <Switch<Route> render={move |route| switch(route, &session)} />
    }
}

#[derive(Properties, PartialEq)]
struct ConfiguredAppProps {
    config: BackendConfig,
}

#[function_component(ConfiguredApp)]
fn configured_app(props: &ConfiguredAppProps) -> Html {
    let client = use_memo(props.config.clone(), |config| ApiClient::new(config.clone()));

    html! {
        <SessionProvider {client}>
            <BrowserRouter>
                <div class="app">
                    <AppRoutes />
                </div>
            </BrowserRouter>
        </SessionProvider>
    }
}

#[function_component(App)]
fn app() -> Html {
    let config = use_memo((), |_| {
        BackendConfig::from_values(
            option_env!("BABYSLEEP_BACKEND_URL"),
            option_env!("BABYSLEEP_ANON_KEY"),
        )
    });

    match &*config {
        Ok(config) => html! { <ConfiguredApp config={config.clone()} /> },
        Err(e) => {
            Logger::error_with_component("app", &format!("❌ {}", e));
            html! { <ConfigErrorScreen message={e.to_string()} /> }
        }
    }
}

fn main() {
    Logger::init();
    yew::Renderer::<App>::new().render();
}
