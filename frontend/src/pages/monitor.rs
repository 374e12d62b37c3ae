use std::rc::Rc;

use gloo::timers::callback::Interval;
use shared::analytics::{quality_label, SleepStats};
use shared::insights::{
    MonitorObservation, SafetyAlert, SimulatedSleepMonitor, SleepMonitor, SleepSessionRecorder,
};
use shared::models::{format_minutes, SleepSession};
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::{BabySelector, ErrorBanner, NoBabyNotice};
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::{baby_scope, use_active_baby};
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::{format_datetime, format_time, now_utc};
use crate::services::logging::Logger;

const COMPONENT: &str = "sleep-monitor";
const TICK_MS: u32 = 3_000;
const ALERT_LOG_LEN: usize = 20;

#[derive(Debug, Clone, Default, PartialEq)]
struct LiveView {
    last: Option<MonitorObservation>,
    alerts: Vec<SafetyAlert>,
    movements: u32,
    cries: u32,
    safety_alerts: u32,
    score: f64,
}

enum LiveAction {
    Reset,
    Observed {
        observation: MonitorObservation,
        movements: u32,
        cries: u32,
        safety_alerts: u32,
        score: f64,
    },
    Resolve(Uuid),
}

impl Reducible for LiveView {
    type Action = LiveAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            LiveAction::Reset => Rc::new(Self::default()),
            LiveAction::Observed {
                observation,
                movements,
                cries,
                safety_alerts,
                score,
            } => {
                let mut alerts = observation.alerts.clone();
                alerts.extend(self.alerts.iter().cloned());
                alerts.truncate(ALERT_LOG_LEN);
                Rc::new(Self {
                    last: Some(observation),
                    alerts,
                    movements,
                    cries,
                    safety_alerts,
                    score,
                })
            }
            LiveAction::Resolve(id) => {
                let mut next = (*self).clone();
                for alert in next.alerts.iter_mut().filter(|a| a.id == id) {
                    alert.resolved = true;
                }
                Rc::new(next)
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct MonitorProps {
    pub session: SessionContext,
}

#[function_component(MonitorPage)]
pub fn monitor_page(props: &MonitorProps) -> Html {
    let baby = use_active_baby(&props.session);
    let sessions = use_entity_list::<SleepSession>(&props.session, baby_scope(baby.active.as_ref()));

    let monitor = use_mut_ref(SimulatedSleepMonitor::new);
    let recorder = use_mut_ref(|| Option::<SleepSessionRecorder>::None);
    let ticker = use_mut_ref(|| Option::<Interval>::None);
    let live = use_reducer(LiveView::default);
    let running = use_state(|| false);
    let save_error = use_state(|| Option::<String>::None);

    // Stop ticking when leaving the page; an unfinished session is discarded.
    {
        let ticker = ticker.clone();
        use_effect_with((), move |_| {
            move || {
                ticker.borrow_mut().take();
            }
        });
    }

    let on_start = {
        let monitor = monitor.clone();
        let recorder = recorder.clone();
        let ticker = ticker.clone();
        let live = live.dispatcher();
        let running = running.clone();
        let baby_id = baby.active.as_ref().map(|b| b.id.clone());
        Callback::from(move |_: MouseEvent| {
            let Some(baby_id) = baby_id.clone() else {
                return;
            };
            {
                let monitor = monitor.borrow();
                *recorder.borrow_mut() = Some(SleepSessionRecorder::start(
                    baby_id,
                    now_utc(),
                    monitor.temperature(),
                    monitor.humidity(),
                ));
            }
            live.dispatch(LiveAction::Reset);

            let monitor = monitor.clone();
            let recorder = recorder.clone();
            let live = live.clone();
            *ticker.borrow_mut() = Some(Interval::new(TICK_MS, move || {
                let observation = monitor.borrow_mut().tick(now_utc());
                let mut recorder = recorder.borrow_mut();
                let Some(recorder) = recorder.as_mut() else {
                    return;
                };
                recorder.record(&observation);
                for alert in &observation.alerts {
                    Logger::warn_with_component(
                        COMPONENT,
                        &format!("🚨 [{}] {}", alert.severity.label(), alert.message),
                    );
                }
                live.dispatch(LiveAction::Observed {
                    observation,
                    movements: recorder.movements(),
                    cries: recorder.cries_detected(),
                    safety_alerts: recorder.safety_alerts(),
                    score: recorder.current_score(),
                });
            }));
            running.set(true);
            Logger::info_with_component(COMPONENT, "📹 Monitoring started");
        })
    };

    let on_stop = {
        let recorder = recorder.clone();
        let ticker = ticker.clone();
        let running = running.clone();
        let save_error = save_error.clone();
        let list = sessions.list.clone();
        Callback::from(move |_: MouseEvent| {
            ticker.borrow_mut().take();
            running.set(false);
            let Some(finished) = recorder.borrow_mut().take() else {
                return;
            };
            let draft = finished.finish(now_utc());
            let list = list.clone();
            let save_error = save_error.clone();
            spawn_local(async move {
                match list.add(&draft).await {
                    Ok(saved) => {
                        save_error.set(None);
                        Logger::info_with_component(
                            COMPONENT,
                            &format!("💾 Saved sleep session {}", saved.id),
                        );
                    }
                    Err(e) => save_error.set(Some(e.to_string())),
                }
            });
        })
    };

    let on_resolve = {
        let live = live.dispatcher();
        Callback::from(move |id: Uuid| live.dispatch(LiveAction::Resolve(id)))
    };

    let selector = html! {
        <BabySelector
            babies={baby.babies.items.clone()}
            active={baby.active.as_ref().map(|b| b.id.clone())}
            on_select={baby.select.clone()}
        />
    };

    if baby.active.is_none() {
        return html! {
            <div class="page monitor">
                <h2>{"📹 Sleep Monitor"}</h2>
                <ErrorBanner message={baby.babies.error.clone()} />
                {if baby.babies.loading { html! {} } else { html! { <NoBabyNotice /> } }}
            </div>
        };
    }

    let stats = SleepStats::from_sessions(&sessions.state.items);

    html! {
        <div class="page monitor">
            <div class="page-header">
                <h2>{"📹 Sleep Monitor"}</h2>
                {selector}
            </div>
            <ErrorBanner message={(*save_error).clone().or_else(|| sessions.state.error.clone())} />

            <div class="monitor-controls">
                {if *running {
                    html! { <button class="btn btn-danger btn-large" onclick={on_stop}>{"⏹ Stop & Save Session"}</button> }
                } else {
                    html! { <button class="btn btn-primary btn-large" onclick={on_start}>{"▶ Start Monitoring"}</button> }
                }}
            </div>

            {if *running || live.last.is_some() {
                html! {
                    <div class="stat-grid">
                        <div class="stat-card">
                            <span class="stat-label">{"Room"}</span>
                            <span class="stat-value">
                                {live.last.as_ref().map(|o| format!("{:.1}°C · {:.0}%", o.temperature, o.humidity)).unwrap_or_else(|| "—".into())}
                            </span>
                        </div>
                        <div class="stat-card">
                            <span class="stat-label">{"Movements"}</span>
                            <span class="stat-value">{live.movements}</span>
                        </div>
                        <div class="stat-card">
                            <span class="stat-label">{"Cries"}</span>
                            <span class="stat-value">{live.cries}</span>
                        </div>
                        <div class="stat-card">
                            <span class="stat-label">{"Quality"}</span>
                            <span class="stat-value">{format!("{:.0} · {}", live.score, quality_label(live.score))}</span>
                        </div>
                    </div>
                }
            } else {
                html! {}
            }}

            {if live.alerts.is_empty() {
                html! {}
            } else {
                html! {
                    <div class="alert-log">
                        <h3>{"Alerts"}</h3>
                        <ul>
                            {for live.alerts.iter().map(|alert| {
                                let id = alert.id;
                                let on_resolve = on_resolve.clone();
                                let classes = classes!("alert", format!("severity-{}", alert.severity.label()), alert.resolved.then_some("resolved"));
                                html! {
                                    <li key={id.to_string()} class={classes}>
                                        <span>{format!("{} · {}", format_time(alert.at), alert.message)}</span>
                                        {if alert.resolved {
                                            html! { <span class="resolved-tag">{"Resolved"}</span> }
                                        } else {
                                            html! {
                                                <button class="btn btn-small" onclick={Callback::from(move |_: MouseEvent| on_resolve.emit(id))}>
                                                    {"Resolve"}
                                                </button>
                                            }
                                        }}
                                    </li>
                                }
                            })}
                        </ul>
                    </div>
                }
            }}

            {match stats {
                Some(stats) => html! {
                    <div class="monitor-summary">
                        <h3>{"Monitored sleep"}</h3>
                        <p>
                            {format!(
                                "{} sessions · {:.1} h total · avg quality {:.0} · {} cries · {} alerts",
                                stats.total_sessions, stats.total_sleep_hours, stats.avg_quality, stats.total_cries, stats.total_alerts
                            )}
                        </p>
                    </div>
                },
                None => html! {},
            }}

            <div class="session-list">
                <h3>{"Past sessions"}</h3>
                {if sessions.state.items.is_empty() && !sessions.state.loading {
                    html! { <p class="empty-state">{"No monitored sessions yet."}</p> }
                } else {
                    html! {
                        <table class="data-table">
                            <thead>
                                <tr><th>{"Started"}</th><th>{"Duration"}</th><th>{"Quality"}</th><th>{"Cries"}</th><th>{"Alerts"}</th></tr>
                            </thead>
                            <tbody>
                                {for sessions.state.items.iter().rev().map(|s| html! {
                                    <tr key={s.id.clone()}>
                                        <td>{format_datetime(s.start_time)}</td>
                                        <td>{s.duration.map(|m| format_minutes(m.round() as i64)).unwrap_or_else(|| "—".into())}</td>
                                        <td>{s.quality_score.map(|q| format!("{:.0}", q)).unwrap_or_else(|| "—".into())}</td>
                                        <td>{s.cries_detected}</td>
                                        <td>{s.safety_alerts}</td>
                                    </tr>
                                })}
                            </tbody>
                        </table>
                    }
                }}
            </div>
        </div>
    }
}
