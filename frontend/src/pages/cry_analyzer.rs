use std::rc::Rc;

use gloo::timers::callback::Interval;
use gloo::timers::future::TimeoutFuture;
use shared::insights::{CryAnalysis, CryClassifier, CrySample, SimulatedCryClassifier, ANALYSIS_DELAY_MS};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{MediaStream, MediaStreamConstraints, MediaStreamTrack};
use yew::prelude::*;

use crate::contexts::SessionContext;
use crate::services::date_utils::{format_time, now_utc};
use crate::services::logging::Logger;

const COMPONENT: &str = "cry-analyzer";
const HISTORY_LEN: usize = 10;

pub(crate) const PERMISSION_DENIED: &str =
    "Microphone access was denied. Allow microphone access in your browser settings to analyze cries.";

pub(crate) fn elapsed_secs(started_ms: f64, now_ms: f64) -> u32 {
    ((now_ms - started_ms).max(0.0) / 1000.0).floor() as u32
}

async fn request_microphone() -> Result<MediaStream, String> {
    let devices = gloo::utils::window()
        .navigator()
        .media_devices()
        .map_err(|_| "This browser cannot record audio.".to_string())?;
    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|_| PERMISSION_DENIED.to_string())?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|_| PERMISSION_DENIED.to_string())?;
    stream
        .dyn_into::<MediaStream>()
        .map_err(|_| "The browser returned an unexpected media stream.".to_string())
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// Newest first, capped.
#[derive(Default, PartialEq)]
struct CryHistory {
    analyses: Vec<CryAnalysis>,
}

impl Reducible for CryHistory {
    type Action = CryAnalysis;

    fn reduce(self: Rc<Self>, analysis: Self::Action) -> Rc<Self> {
        let mut analyses = Vec::with_capacity(HISTORY_LEN);
        analyses.push(analysis);
        analyses.extend(self.analyses.iter().take(HISTORY_LEN - 1).cloned());
        Rc::new(Self { analyses })
    }
}

#[derive(Properties, PartialEq)]
pub struct CryAnalyzerProps {
    pub session: SessionContext,
}

#[function_component(CryAnalyzerPage)]
pub fn cry_analyzer_page(_props: &CryAnalyzerProps) -> Html {
    let classifier = use_mut_ref(SimulatedCryClassifier::new);
    let stream = use_mut_ref(|| Option::<MediaStream>::None);
    let ticker = use_mut_ref(|| Option::<Interval>::None);
    let history = use_reducer(CryHistory::default);

    let started_at = use_state(|| Option::<f64>::None);
    let now_ms = use_state(js_sys::Date::now);
    let analyzing = use_state(|| false);
    let permission_error = use_state(|| Option::<String>::None);

    // Release the microphone when leaving the page.
    {
        let stream = stream.clone();
        let ticker = ticker.clone();
        use_effect_with((), move |_| {
            move || {
                if let Some(stream) = stream.borrow_mut().take() {
                    stop_tracks(&stream);
                }
                ticker.borrow_mut().take();
            }
        });
    }

    let on_start = {
        let stream = stream.clone();
        let ticker = ticker.clone();
        let started_at = started_at.clone();
        let now_ms = now_ms.clone();
        let permission_error = permission_error.clone();
        Callback::from(move |_: MouseEvent| {
            let stream = stream.clone();
            let ticker = ticker.clone();
            let started_at = started_at.clone();
            let now_ms = now_ms.clone();
            let permission_error = permission_error.clone();
            spawn_local(async move {
                match request_microphone().await {
                    Ok(granted) => {
                        permission_error.set(None);
                        *stream.borrow_mut() = Some(granted);
                        let start = js_sys::Date::now();
                        started_at.set(Some(start));
                        now_ms.set(start);
                        *ticker.borrow_mut() = Some(Interval::new(1_000, move || {
                            now_ms.set(js_sys::Date::now());
                        }));
                        Logger::info_with_component(COMPONENT, "🎙️ Recording started");
                    }
                    Err(message) => {
                        Logger::warn_with_component(COMPONENT, &format!("⚠️ {}", message));
                        permission_error.set(Some(message));
                    }
                }
            });
        })
    };

    let on_stop = {
        let classifier = classifier.clone();
        let stream = stream.clone();
        let ticker = ticker.clone();
        let started_at = started_at.clone();
        let analyzing = analyzing.clone();
        let history = history.dispatcher();
        Callback::from(move |_: MouseEvent| {
            let Some(started) = *started_at else {
                return;
            };
            if let Some(active) = stream.borrow_mut().take() {
                stop_tracks(&active);
            }
            ticker.borrow_mut().take();
            started_at.set(None);
            analyzing.set(true);

            let sample = CrySample {
                duration_secs: elapsed_secs(started, js_sys::Date::now()),
                recorded_at: now_utc(),
            };
            let classifier = classifier.clone();
            let analyzing = analyzing.clone();
            let history = history.clone();
            spawn_local(async move {
                TimeoutFuture::new(ANALYSIS_DELAY_MS).await;
                let analysis = classifier.borrow_mut().classify(&sample);
                Logger::info_with_component(
                    COMPONENT,
                    &format!("🧠 {} ({:.0}%)", analysis.category.label(), analysis.confidence_percentage),
                );
                history.dispatch(analysis);
                analyzing.set(false);
            });
        })
    };

    let recording_secs = started_at.map(|started| elapsed_secs(started, *now_ms));
    let latest = history.analyses.first().cloned();

    html! {
        <div class="page cry-analyzer">
            <h2>{"🧠 Cry Analyzer"}</h2>
            <p class="page-subtitle">{"Record your baby's cry and get a best guess at what they need."}</p>

            {if let Some(message) = (*permission_error).clone() {
                html! { <div class="permission-banner">{"🎙️ "}{message}</div> }
            } else {
                html! {}
            }}

            <div class="recorder">
                {match (recording_secs, *analyzing) {
                    (_, true) => html! {
                        <div class="analyzing">
                            <div class="loading-spinner"></div>
                            <p>{"Analyzing cry pattern..."}</p>
                        </div>
                    },
                    (Some(secs), false) => html! {
                        <>
                            <div class="recording-indicator">{format!("🔴 Recording {}s", secs)}</div>
                            <button class="btn btn-danger btn-large" onclick={on_stop}>{"⏹ Stop & Analyze"}</button>
                        </>
                    },
                    (None, false) => html! {
                        <button class="btn btn-primary btn-large" onclick={on_start}>{"🎙️ Start Recording"}</button>
                    },
                }}
            </div>

            {if let Some(analysis) = latest {
                html! {
                    <div class="analysis-result">
                        <div class="analysis-header">
                            <span class="analysis-icon">{analysis.category.icon()}</span>
                            <h3>{analysis.category.label()}</h3>
                            <span class="analysis-confidence">{format!("{:.0}% confidence", analysis.confidence_percentage)}</span>
                        </div>
                        <p>{analysis.category.description()}</p>
                        <p class="analysis-meta">
                            {format!("Intensity: {} · {}s recorded", analysis.intensity.label(), analysis.duration_secs)}
                        </p>
                        <h4>{"Try this"}</h4>
                        <ul>
                            {for analysis.suggestions.iter().map(|s| html! { <li>{*s}</li> })}
                        </ul>
                    </div>
                }
            } else {
                html! {}
            }}

            {if history.analyses.len() > 1 {
                html! {
                    <div class="analysis-history">
                        <h3>{"Earlier analyses"}</h3>
                        <ul>
                            {for history.analyses.iter().skip(1).map(|a| html! {
                                <li key={a.id.to_string()}>
                                    {format!("{} {} · {:.0}% · {}", a.category.icon(), a.category.label(), a.confidence_percentage, format_time(a.recorded_at))}
                                </li>
                            })}
                        </ul>
                    </div>
                }
            } else {
                html! {}
            }}

            <p class="disclaimer">{"Cry analysis is a rough guide and never a substitute for medical advice."}</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::insights::{CryCategory, Intensity};
    use uuid::Uuid;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn analysis(category: CryCategory) -> CryAnalysis {
        CryAnalysis {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            duration_secs: 10,
            category,
            confidence_percentage: 80.0,
            intensity: Intensity::Low,
            suggestions: vec![],
        }
    }

    #[wasm_bindgen_test]
    fn test_elapsed_secs() {
        assert_eq!(elapsed_secs(1_000.0, 1_999.0), 0);
        assert_eq!(elapsed_secs(1_000.0, 17_500.0), 16);
        assert_eq!(elapsed_secs(5_000.0, 1_000.0), 0);
    }

    #[wasm_bindgen_test]
    fn test_history_is_newest_first_and_capped() {
        let mut history = Rc::new(CryHistory::default());
        for _ in 0..HISTORY_LEN {
            history = history.reduce(analysis(CryCategory::Tired));
        }
        history = history.reduce(analysis(CryCategory::Hunger));
        assert_eq!(history.analyses.len(), HISTORY_LEN);
        assert_eq!(history.analyses[0].category, CryCategory::Hunger);
    }
}
