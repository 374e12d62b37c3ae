use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use shared::insights::{guideline_for_age, InsightGenerator, SleepConsultant, QUICK_TOPICS, WELCOME_MESSAGE};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::BabySelector;
use crate::contexts::SessionContext;
use crate::hooks::use_active_baby::use_active_baby;
use crate::services::date_utils::today;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub from_user: bool,
    pub text: String,
}

#[derive(PartialEq)]
struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage {
                from_user: false,
                text: WELCOME_MESSAGE.to_string(),
            }],
        }
    }
}

impl Reducible for Conversation {
    type Action = ChatMessage;

    fn reduce(self: Rc<Self>, message: Self::Action) -> Rc<Self> {
        let mut messages = self.messages.clone();
        messages.push(message);
        Rc::new(Self { messages })
    }
}

/// Reply text split into display lines with `**bold**` markers removed.
pub(crate) fn display_lines(text: &str) -> Vec<String> {
    text.lines().map(|line| line.replace("**", "")).collect()
}

#[derive(Properties, PartialEq)]
pub struct AssistantProps {
    pub session: SessionContext,
}

#[function_component(AssistantPage)]
pub fn assistant_page(props: &AssistantProps) -> Html {
    let baby = use_active_baby(&props.session);
    let age_months = baby.active.as_ref().map(|b| b.age_in_months(today()));

    let consultant = use_mut_ref(|| SleepConsultant::new(None));
    let conversation = use_reducer(Conversation::default);
    let draft = use_state(String::new);
    let typing = use_state(|| false);

    {
        let consultant = consultant.clone();
        use_effect_with(age_months, move |age| {
            consultant.borrow_mut().set_baby_age(*age);
            || ()
        });
    }

    let send = {
        let consultant = consultant.clone();
        let conversation = conversation.dispatcher();
        let typing = typing.clone();
        Callback::from(move |text: String| {
            let text = text.trim().to_string();
            if text.is_empty() {
                return;
            }
            conversation.dispatch(ChatMessage {
                from_user: true,
                text: text.clone(),
            });
            typing.set(true);

            let (reply, delay) = {
                let mut consultant = consultant.borrow_mut();
                (consultant.generate_insight(&text), consultant.response_delay_ms())
            };
            let conversation = conversation.clone();
            let typing = typing.clone();
            spawn_local(async move {
                TimeoutFuture::new(delay).await;
                conversation.dispatch(ChatMessage {
                    from_user: false,
                    text: reply,
                });
                typing.set(false);
            });
        })
    };

    let on_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            draft.set(input.value());
        })
    };

    let on_submit = {
        let send = send.clone();
        let draft = draft.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            send.emit((*draft).clone());
            draft.set(String::new());
        })
    };

    html! {
        <div class="page assistant">
            <div class="page-header">
                <h2>{"🤖 Sleep Consultant"}</h2>
                <BabySelector
                    babies={baby.babies.items.clone()}
                    active={baby.active.as_ref().map(|b| b.id.clone())}
                    on_select={baby.select.clone()}
                />
            </div>

            {match age_months {
                Some(months) => {
                    let guide = guideline_for_age(months);
                    html! {
                        <div class="guideline-card compact">
                            <strong>{guide.age_group}</strong>
                            {format!(" · {} total · {} · wake windows {}", guide.total_sleep, guide.naps, guide.wake_windows)}
                        </div>
                    }
                }
                None => html! {},
            }}

            <div class="chat-window">
                {for conversation.messages.iter().map(|message| {
                    let classes = if message.from_user { "chat-message user" } else { "chat-message consultant" };
                    html! {
                        <div class={classes}>
                            {for display_lines(&message.text).into_iter().map(|line| html! { <p>{line}</p> })}
                        </div>
                    }
                })}
                {if *typing {
                    html! { <div class="chat-message consultant typing">{"…"}</div> }
                } else {
                    html! {}
                }}
            </div>

            <div class="quick-topics">
                {for QUICK_TOPICS.iter().map(|(label, message)| {
                    let send = send.clone();
                    let message = message.to_string();
                    html! {
                        <button class="btn btn-chip" disabled={*typing}
                            onclick={Callback::from(move |_: MouseEvent| send.emit(message.clone()))}>
                            {*label}
                        </button>
                    }
                })}
            </div>

            <form class="chat-input" onsubmit={on_submit}>
                <input type="text" placeholder="Ask about naps, bedtime, night waking..."
                    value={(*draft).clone()} oninput={on_input} />
                <button type="submit" class="btn btn-primary" disabled={*typing || draft.trim().is_empty()}>{"Send"}</button>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_display_lines() {
        assert_eq!(
            display_lines("**Newborn Guidelines:**\n• Naps: 4-5"),
            vec!["Newborn Guidelines:".to_string(), "• Naps: 4-5".to_string()]
        );
    }

    #[wasm_bindgen_test]
    fn test_conversation_starts_with_welcome() {
        let conversation = Rc::new(Conversation::default());
        assert_eq!(conversation.messages.len(), 1);
        let conversation = conversation.reduce(ChatMessage {
            from_user: true,
            text: "hi".into(),
        });
        assert_eq!(conversation.messages.len(), 2);
        assert!(conversation.messages[1].from_user);
    }
}
