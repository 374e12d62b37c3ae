use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use shared::sounds::{
    find_sound, format_countdown, sounds_in, PlayerState, SoundCategory, SLEEP_SOUND_TIPS,
};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlAudioElement, HtmlInputElement};
use yew::prelude::*;

use crate::contexts::SessionContext;
use crate::services::logging::Logger;

const COMPONENT: &str = "sleep-sounds";

pub(crate) enum PlayerAction {
    Choose(&'static str),
    Stop,
    /// Reported by the audio element.
    Playing(bool),
    Volume(f64),
    ToggleMute,
    Tick,
}

#[derive(Default, PartialEq)]
pub(crate) struct Player(PlayerState);

impl Reducible for Player {
    type Action = PlayerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0.clone();
        match action {
            PlayerAction::Choose(id) => {
                if let Some(sound) = find_sound(id) {
                    next.choose(sound);
                }
            }
            PlayerAction::Stop => next.stop(),
            PlayerAction::Playing(playing) => next.set_playing(playing),
            PlayerAction::Volume(volume) => next.set_volume(volume),
            PlayerAction::ToggleMute => next.toggle_mute(),
            PlayerAction::Tick => next.tick(),
        }
        Rc::new(Self(next))
    }
}

fn start(audio: &HtmlAudioElement, player: UseReducerDispatcher<Player>) {
    match audio.play() {
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                Logger::warn_with_component(COMPONENT, &format!("⚠️ Playback blocked: {:?}", e));
                player.dispatch(PlayerAction::Playing(false));
            }
        }),
        Err(e) => Logger::warn_with_component(COMPONENT, &format!("⚠️ Playback failed: {:?}", e)),
    }
}

#[derive(Properties, PartialEq)]
pub struct SleepSoundsProps {
    pub session: SessionContext,
}

#[function_component(SleepSoundsPage)]
pub fn sleep_sounds_page(_props: &SleepSoundsProps) -> Html {
    let player = use_reducer(Player::default);
    let filter = use_state(|| Option::<SoundCategory>::None);
    let audio = use_mut_ref(|| Option::<HtmlAudioElement>::None);

    let state = &player.0;
    let current_id = state.current.map(|sound| sound.id);

    // One audio element per chosen sound, released when the choice changes.
    {
        let audio = audio.clone();
        let dispatcher = player.dispatcher();
        let volume = state.output_volume();
        use_effect_with(current_id, move |current_id| {
            let sound = current_id.and_then(find_sound);
            let listener = sound.and_then(|sound| match HtmlAudioElement::new_with_src(sound.url) {
                Ok(element) => {
                    element.set_loop(sound.loops());
                    element.set_volume(volume);
                    let on_ended = dispatcher.clone();
                    let listener = EventListener::new(&element, "ended", move |_| {
                        on_ended.dispatch(PlayerAction::Stop);
                    });
                    Logger::info_with_component(COMPONENT, &format!("🎵 Playing {}", sound.name));
                    start(&element, dispatcher);
                    *audio.borrow_mut() = Some(element);
                    Some(listener)
                }
                Err(e) => {
                    Logger::warn_with_component(COMPONENT, &format!("⚠️ Cannot load {}: {:?}", sound.url, e));
                    None
                }
            });
            move || {
                drop(listener);
                if let Some(element) = audio.borrow_mut().take() {
                    // Pausing only fails for detached media; nothing to release then.
                    let _ = element.pause();
                }
            }
        });
    }

    {
        let audio = audio.clone();
        use_effect_with(state.output_volume(), move |volume| {
            if let Some(element) = audio.borrow().as_ref() {
                element.set_volume(*volume);
            }
            || ()
        });
    }

    // Countdown for timed sounds, only while audio is playing.
    {
        let dispatcher = player.dispatcher();
        let counting = state.playing && state.remaining_secs.is_some();
        use_effect_with(counting, move |counting| {
            let interval = counting.then(|| {
                Interval::new(1_000, move || dispatcher.dispatch(PlayerAction::Tick))
            });
            move || drop(interval)
        });
    }

    let on_play_pause = {
        let audio = audio.clone();
        let player = player.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(element) = audio.borrow().clone() else {
                return;
            };
            if player.0.playing {
                if let Err(e) = element.pause() {
                    Logger::warn_with_component(COMPONENT, &format!("⚠️ Pause failed: {:?}", e));
                }
                player.dispatch(PlayerAction::Playing(false));
            } else {
                start(&element, player.dispatcher());
                player.dispatch(PlayerAction::Playing(true));
            }
        })
    };

    let on_stop = {
        let player = player.dispatcher();
        Callback::from(move |_: MouseEvent| player.dispatch(PlayerAction::Stop))
    };
    let on_mute = {
        let player = player.dispatcher();
        Callback::from(move |_: MouseEvent| player.dispatch(PlayerAction::ToggleMute))
    };
    let on_volume = {
        let player = player.dispatcher();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(volume) = input.value().parse::<f64>() {
                player.dispatch(PlayerAction::Volume(volume));
            }
        })
    };

    let filter_buttons = {
        let options = std::iter::once(None).chain(SoundCategory::ALL.into_iter().map(Some));
        html! {
            <div class="tabs">
                {for options.map(|option| {
                    let filter = filter.clone();
                    let label = option.map_or("All Sounds", |c| c.label());
                    html! {
                        <button
                            class={classes!("tab", (*filter == option).then_some("active"))}
                            onclick={Callback::from(move |_: MouseEvent| filter.set(option))}
                        >
                            {label}
                        </button>
                    }
                })}
            </div>
        }
    };

    let now_playing = match state.current {
        Some(sound) => html! {
            <div class="card now-playing">
                <div class="page-header">
                    <div>
                        <h3>{format!("{} {}", sound.category.icon(), sound.name)}</h3>
                        <p class="muted">{sound.category.label()}</p>
                    </div>
                    <button class="btn btn-danger" onclick={on_stop}>{"Stop"}</button>
                </div>
                <div class="player-controls">
                    <button class="btn btn-primary" onclick={on_play_pause}>
                        {if state.playing { "⏸ Pause" } else { "▶ Play" }}
                    </button>
                    <button class="btn btn-secondary" onclick={on_mute}>
                        {if state.muted { "🔇" } else { "🔊" }}
                    </button>
                    <input
                        type="range"
                        min="0"
                        max="1"
                        step="0.1"
                        value={state.volume.to_string()}
                        oninput={on_volume}
                    />
                </div>
                {if let Some(secs) = state.remaining_secs {
                    html! { <p class="muted">{format!("Timer: {}", format_countdown(secs))}</p> }
                } else {
                    html! {}
                }}
            </div>
        },
        None => html! {},
    };

    html! {
        <div class="page sleep-sounds">
            <h2>{"Sleep Sounds"}</h2>
            <p class="page-subtitle">{"Soothing sounds to help your baby sleep peacefully"}</p>

            {filter_buttons}
            {now_playing}

            <div class="card-grid">
                {for sounds_in(*filter).map(|sound| {
                    let player = player.dispatcher();
                    let is_playing = state.is_playing(sound);
                    html! {
                        <div
                            key={sound.id}
                            class={classes!("card", "sound-card", is_playing.then_some("active"))}
                            onclick={Callback::from(move |_: MouseEvent| player.dispatch(PlayerAction::Choose(sound.id)))}
                        >
                            <h4>{format!("{} {}", sound.category.icon(), sound.name)}</h4>
                            <p class="muted">{sound.category.label()}</p>
                            <span class="muted">{sound.length_label()}</span>
                        </div>
                    }
                })}
            </div>

            <div class="card">
                <h3>{"💡 Tips for better sleep"}</h3>
                <ul>
                    {for SLEEP_SOUND_TIPS.iter().map(|tip| html! { <li>{*tip}</li> })}
                </ul>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn reduce(player: Player, actions: Vec<PlayerAction>) -> Rc<Player> {
        actions
            .into_iter()
            .fold(Rc::new(player), |player, action| player.reduce(action))
    }

    #[wasm_bindgen_test]
    fn test_choose_and_stop() {
        let player = reduce(Player::default(), vec![PlayerAction::Choose("rain")]);
        assert_eq!(player.0.current.map(|s| s.id), Some("rain"));
        assert!(player.0.playing);

        let player = reduce(Player::default(), vec![PlayerAction::Choose("rain"), PlayerAction::Stop]);
        assert_eq!(player.0.current, None);
    }

    #[wasm_bindgen_test]
    fn test_unknown_sound_is_ignored() {
        let player = reduce(Player::default(), vec![PlayerAction::Choose("thunder")]);
        assert_eq!(player.0.current, None);
    }

    #[wasm_bindgen_test]
    fn test_paused_element_freezes_countdown() {
        let player = reduce(
            Player::default(),
            vec![
                PlayerAction::Choose("brahms-lullaby"),
                PlayerAction::Tick,
                PlayerAction::Playing(false),
                PlayerAction::Tick,
            ],
        );
        assert_eq!(player.0.remaining_secs, Some(239));
    }

    #[wasm_bindgen_test]
    fn test_mute_and_volume() {
        let player = reduce(
            Player::default(),
            vec![PlayerAction::Volume(0.8), PlayerAction::ToggleMute],
        );
        assert_eq!(player.0.output_volume(), 0.0);
        let player = reduce(Player(player.0.clone()), vec![PlayerAction::ToggleMute]);
        assert_eq!(player.0.output_volume(), 0.8);
    }
}
