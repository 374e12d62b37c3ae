use shared::models::{NewReferral, Referral, ReferralStatus};
use shared::referrals::{next_reward, referral_code, referral_link, share_text, unlocked_rewards, ReferralStats, Reward};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::ErrorBanner;
use crate::contexts::SessionContext;
use crate::hooks::use_entity_list::use_entity_list;
use crate::services::date_utils::format_date;

pub(crate) fn mailto_link(body: &str) -> String {
    format!(
        "mailto:?subject={}&body={}",
        String::from(js_sys::encode_uri_component("Join me on BabySleep")),
        String::from(js_sys::encode_uri_component(body))
    )
}

fn status_label(status: ReferralStatus) -> &'static str {
    match status {
        ReferralStatus::Pending => "⏳ Pending",
        ReferralStatus::Completed => "✅ Joined",
    }
}

#[derive(Properties, PartialEq)]
pub struct ReferralsProps {
    pub session: SessionContext,
}

#[function_component(ReferralsPage)]
pub fn referrals_page(props: &ReferralsProps) -> Html {
    let referrals = use_entity_list::<Referral>(&props.session, vec![]);
    let email = use_state(String::new);
    let is_submitting = use_state(|| false);
    let form_error = use_state(|| Option::<String>::None);

    let origin = gloo::utils::window().location().origin().unwrap_or_default();
    let code = referral_code(&props.session.user_id().unwrap_or_default());
    let link = referral_link(&origin, &code);
    let mailto = mailto_link(&share_text(&origin, &code));

    let stats = ReferralStats::from_referrals(&referrals.state.items);
    let unlocked = unlocked_rewards(stats.completed);
    let upcoming = next_reward(stats.completed);

    let on_email_change = {
        let email = email.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_invite = {
        let list = referrals.list.clone();
        let email = email.clone();
        let is_submitting = is_submitting.clone();
        let form_error = form_error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if !email.contains('@') {
                form_error.set(Some("Enter a valid email address".into()));
                return;
            }
            let draft = NewReferral::invite((*email).clone());
            let list = list.clone();
            let email = email.clone();
            let is_submitting = is_submitting.clone();
            let form_error = form_error.clone();
            is_submitting.set(true);
            spawn_local(async move {
                match list.add(&draft).await {
                    Ok(_) => {
                        form_error.set(None);
                        email.set(String::new());
                    }
                    Err(e) => form_error.set(Some(e.to_string())),
                }
                is_submitting.set(false);
            });
        })
    };

    html! {
        <div class="page referrals">
            <h2>{"🎁 Invite Friends"}</h2>
            <ErrorBanner message={referrals.state.error.clone()} />

            <div class="referral-share">
                <p>{"Your referral code"}</p>
                <div class="referral-code">{code.clone()}</div>
                <input class="referral-link" type="text" readonly=true value={link} />
                <a class="btn btn-primary" href={mailto}>{"✉️ Share by email"}</a>
            </div>

            <div class="stat-grid">
                <div class="stat-card"><span class="stat-label">{"Invited"}</span><span class="stat-value">{stats.total}</span></div>
                <div class="stat-card"><span class="stat-label">{"Joined"}</span><span class="stat-value">{stats.completed}</span></div>
                <div class="stat-card"><span class="stat-label">{"Pending"}</span><span class="stat-value">{stats.pending}</span></div>
                <div class="stat-card"><span class="stat-label">{"Rewards earned"}</span><span class="stat-value">{format!("${:.2}", stats.total_reward)}</span></div>
            </div>

            <div class="reward-tiers">
                <h3>{"Rewards"}</h3>
                <ul>
                    {for Reward::TIERS.iter().map(|reward| {
                        let earned = unlocked.contains(reward);
                        html! {
                            <li key={reward.key()} class={classes!("reward", earned.then_some("unlocked"))}>
                                {format!("{} {} · {} referral(s)", if earned { "🏆" } else { "🔒" }, reward.label(), reward.threshold())}
                            </li>
                        }
                    })}
                </ul>
                {match upcoming {
                    Some((reward, remaining)) => html! {
                        <p class="next-reward">{format!("{} more to unlock {}", remaining, reward.label())}</p>
                    },
                    None => html! { <p class="next-reward">{"Every reward unlocked. Thank you!"}</p> },
                }}
            </div>

            <form class="invite-form" onsubmit={on_invite}>
                <h3>{"Invite by email"}</h3>
                <ErrorBanner message={(*form_error).clone()} />
                <input type="email" placeholder="friend@example.com" value={(*email).clone()} onchange={on_email_change} />
                <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                    {if *is_submitting { "Sending..." } else { "Send Invite" }}
                </button>
            </form>

            <div class="referral-list">
                <h3>{"Your invitations"}</h3>
                {if referrals.state.items.is_empty() && !referrals.state.loading {
                    html! { <p class="empty-state">{"No invitations yet."}</p> }
                } else {
                    html! {
                        <ul>
                            {for referrals.state.items.iter().map(|r| html! {
                                <li key={r.id.clone()}>
                                    <span>{r.referred_email.clone()}</span>
                                    <span class="referral-status">{status_label(r.status)}</span>
                                    <span class="referral-date">
                                        {r.created_at.map(|at| format_date(at.date_naive())).unwrap_or_default()}
                                    </span>
                                </li>
                            })}
                        </ul>
                    }
                }}
            </div>
        </div>
    }
}
