use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::timers::callback::Interval;
use shared::analytics::WakeWatcher;
use shared::backend::Filter;
use shared::models::SleepLog;
use shared::EntityAccess;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::contexts::SessionContext;
use crate::services::api::ApiClient;
use crate::services::logging::Logger;

pub const WAKE_POLL_INTERVAL_MS: u32 = 30_000;

const COMPONENT: &str = "wake-polling";

/// Wake detection for one baby. Once cancelled, replies from polls still in
/// flight are ignored.
#[derive(Default)]
pub(crate) struct WakePoll {
    watcher: RefCell<WakeWatcher>,
    cancelled: Cell<bool>,
}

impl WakePoll {
    pub(crate) fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub(crate) fn accept(&self, logs: &[SleepLog]) -> Option<SleepLog> {
        if self.cancelled.get() {
            return None;
        }
        self.watcher.borrow_mut().observe(logs).cloned()
    }
}

/// Polls the selected baby's sleep logs on a fixed interval and reports a newly
/// completed sleep. No back-off; dedup is by last seen log id only.
#[hook]
pub fn use_wake_polling(session: &SessionContext, baby_id: Option<String>) -> Option<SleepLog> {
    let woke = use_state(|| Option::<SleepLog>::None);
    let owner = session.user_id();
    let client = session.client.clone();

    {
        let woke = woke.clone();
        use_effect_with((owner, baby_id), move |(owner, baby_id)| {
            woke.set(None);
            let poll_state = Rc::new(WakePoll::default());
            let interval = match (owner.clone(), baby_id.clone()) {
                (Some(owner), Some(baby_id)) => {
                    let access = EntityAccess::<SleepLog, ApiClient>::new(client)
                        .scoped(Filter::eq("baby_id", baby_id.as_str()));
                    let poll_state = poll_state.clone();
                    let poll = move || {
                        let access = access.clone();
                        let poll_state = poll_state.clone();
                        let owner = owner.clone();
                        let woke = woke.clone();
                        spawn_local(async move {
                            match access.list(Some(owner.as_str())).await {
                                Ok(logs) => {
                                    if let Some(log) = poll_state.accept(&logs) {
                                        Logger::info_with_component(
                                            COMPONENT,
                                            &format!("☀️ Baby woke up (log {})", log.id),
                                        );
                                        woke.set(Some(log));
                                    }
                                }
                                Err(e) => Logger::warn_with_component(
                                    COMPONENT,
                                    &format!("⚠️ Wake poll failed: {}", e),
                                ),
                            }
                        });
                    };
                    poll();
                    Some(Interval::new(WAKE_POLL_INTERVAL_MS, poll))
                }
                _ => None,
            };
            move || {
                poll_state.cancel();
                drop(interval);
            }
        });
    }

    (*woke).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn completed(id: &str, wake_hour: u32) -> SleepLog {
        SleepLog {
            id: id.into(),
            baby_id: "baby-A".into(),
            sleep_time: Utc.with_ymd_and_hms(2025, 6, 27, 1, 0, 0).unwrap(),
            wake_time: Some(Utc.with_ymd_and_hms(2025, 6, 27, wake_hour, 0, 0).unwrap()),
            quality_rating: None,
            notes: None,
            user_id: "u".into(),
            created_at: None,
        }
    }

    #[wasm_bindgen_test]
    fn test_new_wake_is_reported_after_priming() {
        let poll = WakePoll::default();
        assert_eq!(poll.accept(&[completed("a", 6)]), None);
        let woke = poll.accept(&[completed("a", 6), completed("b", 9)]);
        assert_eq!(woke.map(|log| log.id), Some("b".to_string()));
    }

    #[wasm_bindgen_test]
    fn test_cancelled_poll_reports_nothing() {
        let poll = WakePoll::default();
        assert_eq!(poll.accept(&[completed("a", 6)]), None);
        poll.cancel();
        assert_eq!(poll.accept(&[completed("a", 6), completed("b", 9)]), None);
    }
}
