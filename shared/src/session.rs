//! # Session store
//!
//! Single source of truth for "who is signed in". The store wraps the identity
//! service behind [`AuthApi`] and keeps the last known identity together with a
//! loading flag. `is_loading == true` means the identity is not known yet; it
//! never means "signed out".
//!
//! Views read the state through [`SessionStore::current`] and react to changes
//! through [`SessionStore::subscribe`]. The returned [`Subscription`] removes its
//! listener when dropped, so a view that goes away never leaves a listener behind.
//!
//! State lives in an `Rc<RefCell<_>>` and is never borrowed across an `.await`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{error, info, warn};
use serde_json::json;

use crate::backend::{AuthApi, AuthSession, AuthUser, Credentials};
use crate::error::AuthError;

/// Tokens expiring within this many seconds are refreshed ahead of time.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Kinds of identity change broadcast to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

impl From<&AuthUser> for UserIdentity {
    fn from(user: &AuthUser) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
        }
    }
}

/// What views see of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Option<UserIdentity>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    pub fn loading() -> Self {
        Self {
            identity: None,
            is_loading: true,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.user_id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Result of a successful sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpStatus {
    SignedIn(UserIdentity),
    /// The backend created the account but wants the email confirmed first.
    ConfirmationRequired,
}

type Listener = Rc<dyn Fn(AuthEvent, &SessionSnapshot)>;

struct SessionState {
    session: Option<AuthSession>,
    is_loading: bool,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.session.as_ref().map(|s| UserIdentity::from(&s.user)),
            is_loading: self.is_loading,
        }
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.listeners.iter().any(|(listener_id, _)| *listener_id == id)
    }
}

/// Handle returned by [`SessionStore::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription removes the listener immediately"]
pub struct Subscription {
    state: Weak<RefCell<SessionState>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state
                .borrow_mut()
                .listeners
                .retain(|(listener_id, _)| *listener_id != self.id);
        }
    }
}

/// Check that both credential fields were filled in.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), AuthError> {
    let mut missing = Vec::new();
    if credentials.email.trim().is_empty() {
        missing.push("email");
    }
    if credentials.password.is_empty() {
        missing.push("password");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthError::MissingFields(missing))
    }
}

/// Password and its confirmation must both be present and identical.
pub fn confirm_password(password: &str, confirmation: &str) -> Result<(), AuthError> {
    let mut missing = Vec::new();
    if password.is_empty() {
        missing.push("password");
    }
    if confirmation.is_empty() {
        missing.push("confirm_password");
    }
    if !missing.is_empty() {
        return Err(AuthError::MissingFields(missing));
    }
    if password != confirmation {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(())
}

pub struct SessionStore<B: ?Sized> {
    backend: Rc<B>,
    state: Rc<RefCell<SessionState>>,
}

impl<B: ?Sized> Clone for SessionStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            state: self.state.clone(),
        }
    }
}

impl<B: AuthApi + ?Sized> SessionStore<B> {
    pub fn new(backend: Rc<B>) -> Self {
        Self {
            backend,
            state: Rc::new(RefCell::new(SessionState {
                session: None,
                is_loading: true,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    pub fn backend(&self) -> &Rc<B> {
        &self.backend
    }

    /// Resolve the persisted session with a single backend call. Not retried.
    pub async fn initialize(&self) {
        match self.backend.get_session().await {
            Ok(session) => {
                if let Some(session) = &session {
                    info!("🔐 Restored session for user {}", session.user.id);
                }
                self.set_session(session, AuthEvent::InitialSession);
            }
            Err(e) => {
                error!("❌ Failed to restore session: {}", e);
                self.set_session(None, AuthEvent::InitialSession);
            }
        }
    }

    pub fn current(&self) -> SessionSnapshot {
        self.state.borrow().snapshot()
    }

    /// Expiry of the current access token, in unix seconds.
    pub fn expires_at(&self) -> Option<i64> {
        self.state.borrow().session.as_ref().map(|s| s.expires_at)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(AuthEvent, &SessionSnapshot) + 'static,
    {
        let mut state = self.state.borrow_mut();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.push((id, Rc::new(listener)));
        Subscription {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserIdentity, AuthError> {
        validate_credentials(credentials)?;
        let session = self.backend.sign_in_with_password(credentials).await?;
        let identity = UserIdentity::from(&session.user);
        info!("✅ Signed in as {}", identity.user_id);
        self.set_session(Some(session), AuthEvent::SignedIn);
        Ok(identity)
    }

    pub async fn sign_up(
        &self,
        credentials: &Credentials,
        referral_code: Option<&str>,
    ) -> Result<SignUpStatus, AuthError> {
        validate_credentials(credentials)?;
        let metadata = referral_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(|code| json!({ "referral_code": code.to_uppercase() }));

        let outcome = self.backend.sign_up(credentials, metadata).await?;
        match outcome.session {
            Some(session) => {
                let identity = UserIdentity::from(&session.user);
                info!("✅ Signed up and signed in as {}", identity.user_id);
                self.set_session(Some(session), AuthEvent::SignedIn);
                Ok(SignUpStatus::SignedIn(identity))
            }
            None => {
                info!("📧 Sign-up for {} awaits email confirmation", outcome.user.id);
                Ok(SignUpStatus::ConfirmationRequired)
            }
        }
    }

    /// Invalidate the token remotely, then clear the local identity regardless.
    pub async fn sign_out(&self) {
        if let Err(e) = self.backend.sign_out().await {
            error!("❌ Backend sign-out failed, clearing local session anyway: {}", e);
        }
        self.set_session(None, AuthEvent::SignedOut);
        info!("👋 Signed out");
    }

    /// Refresh the token when it is about to expire. Returns true if a new token
    /// was obtained. An expired token that cannot be refreshed signs the user out.
    pub async fn refresh_if_expiring(&self, now: i64) -> bool {
        let session = self.state.borrow().session.clone();
        let Some(session) = session else {
            return false;
        };
        if session.expires_at - now > REFRESH_MARGIN_SECS {
            return false;
        }

        match self.backend.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                info!("🔄 Refreshed access token for {}", refreshed.user.id);
                self.set_session(Some(refreshed), AuthEvent::TokenRefreshed);
                true
            }
            Err(e) => {
                warn!("⚠️ Token refresh failed: {}", e);
                if session.is_expired(now) {
                    self.set_session(None, AuthEvent::SignedOut);
                }
                false
            }
        }
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingFields(vec!["email"]));
        }
        self.backend.request_password_reset(email.trim()).await?;
        info!("📧 Password reset requested");
        Ok(())
    }

    pub async fn update_password(&self, password: &str, confirmation: &str) -> Result<(), AuthError> {
        confirm_password(password, confirmation)?;
        if !self.current().is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        let user = self.backend.update_password(password).await?;

        let session = self.state.borrow().session.clone();
        if let Some(mut session) = session {
            session.user = user;
            self.set_session(Some(session), AuthEvent::UserUpdated);
        }
        info!("🔑 Password updated");
        Ok(())
    }

    /// Feed a change observed outside this store (e.g. another tab) to subscribers.
    pub fn apply_external_change(&self, event: AuthEvent, session: Option<AuthSession>) {
        self.set_session(session, event);
    }

    fn set_session(&self, session: Option<AuthSession>, event: AuthEvent) {
        let (snapshot, listeners) = {
            let mut state = self.state.borrow_mut();
            state.session = session;
            state.is_loading = false;
            (state.snapshot(), state.listeners.clone())
        };

        for (id, listener) in listeners {
            // A listener may have unsubscribed another one during this round.
            if self.state.borrow().is_subscribed(id) {
                listener(event, &snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::testing::{InMemoryBackend, TOKEN_TTL_SECS};
    use std::cell::RefCell;

    fn setup() -> (Rc<InMemoryBackend>, SessionStore<InMemoryBackend>, String) {
        let backend = Rc::new(InMemoryBackend::new());
        let user_id = backend.register("parent@example.com", "hunter22");
        let store = SessionStore::new(backend.clone());
        (backend, store, user_id)
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn record_events(store: &SessionStore<InMemoryBackend>) -> (Rc<RefCell<Vec<AuthEvent>>>, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let subscription = store.subscribe(move |event, _| sink.borrow_mut().push(event));
        (events, subscription)
    }

    #[test]
    fn test_new_store_is_loading_without_identity() {
        let (_, store, _) = setup();
        assert_eq!(store.current(), SessionSnapshot::loading());
    }

    #[tokio::test]
    async fn test_initialize_restores_persisted_session() {
        let (backend, store, user_id) = setup();
        backend.restore_as(&user_id);

        store.initialize().await;

        let snapshot = store.current();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.user_id(), Some(user_id.as_str()));
        assert_eq!(backend.auth_calls(), 1);
    }

    #[tokio::test]
    async fn test_initialize_failure_resolves_to_signed_out_without_retry() {
        let (backend, store, _) = setup();
        backend.fail_next(BackendError::Network("connection refused".into()));

        store.initialize().await;

        let snapshot = store.current();
        assert!(!snapshot.is_loading);
        assert!(snapshot.identity.is_none());
        assert_eq!(backend.auth_calls(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_then_sign_out() {
        let (_, store, user_id) = setup();
        store.initialize().await;

        let identity = store
            .sign_in(&credentials("parent@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(store.current().user_id(), Some(user_id.as_str()));
        assert!(!store.current().is_loading);

        store.sign_out().await;
        assert!(store.current().identity.is_none());
        assert!(!store.current().is_loading);
    }

    #[tokio::test]
    async fn test_bad_credentials_surface_backend_message() {
        let (backend, store, _) = setup();
        store.initialize().await;

        let err = store
            .sign_in(&credentials("parent@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::Rejected("Invalid login credentials".into()));
        assert!(store.current().identity.is_none());
        // One call for initialize, one for the attempt; nothing retried.
        assert_eq!(backend.auth_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_never_reach_backend() {
        let (backend, store, _) = setup();

        let err = store.sign_in(&credentials("  ", "")).await.unwrap_err();

        assert_eq!(err, AuthError::MissingFields(vec!["email", "password"]));
        assert_eq!(backend.auth_calls(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_clears_identity_even_when_backend_fails() {
        let (backend, store, _) = setup();
        store
            .sign_in(&credentials("parent@example.com", "hunter22"))
            .await
            .unwrap();
        backend.fail_next(BackendError::Network("offline".into()));

        store.sign_out().await;

        assert!(store.current().identity.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_receive_events_until_unsubscribed() {
        let (_, store, _) = setup();
        let (kept, kept_subscription) = record_events(&store);
        let (removed, removed_subscription) = record_events(&store);
        let (dropped, dropped_subscription) = record_events(&store);
        assert_eq!(store.listener_count(), 3);

        store.initialize().await;
        removed_subscription.unsubscribe();
        drop(dropped_subscription);
        assert_eq!(store.listener_count(), 1);

        store
            .sign_in(&credentials("parent@example.com", "hunter22"))
            .await
            .unwrap();
        store.sign_out().await;

        assert_eq!(
            *kept.borrow(),
            vec![AuthEvent::InitialSession, AuthEvent::SignedIn, AuthEvent::SignedOut]
        );
        assert_eq!(*removed.borrow(), vec![AuthEvent::InitialSession]);
        assert_eq!(*dropped.borrow(), vec![AuthEvent::InitialSession]);
        drop(kept_subscription);
    }

    #[tokio::test]
    async fn test_listener_sees_updated_snapshot() {
        let (_, store, user_id) = setup();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let _subscription = store.subscribe(move |_, snapshot| {
            *sink.borrow_mut() = snapshot.user_id().map(str::to_string);
        });

        store
            .sign_in(&credentials("parent@example.com", "hunter22"))
            .await
            .unwrap();

        assert_eq!(seen.borrow().as_deref(), Some(user_id.as_str()));
    }

    #[tokio::test]
    async fn test_sign_up_forwards_referral_code() {
        let (backend, store, _) = setup();

        let status = store
            .sign_up(&credentials("new@example.com", "secret99"), Some(" abcd1234 "))
            .await
            .unwrap();

        assert!(matches!(status, SignUpStatus::SignedIn(_)));
        let session = backend.current_session().unwrap();
        assert_eq!(
            session.user.user_metadata,
            Some(json!({ "referral_code": "ABCD1234" }))
        );
    }

    #[tokio::test]
    async fn test_rejected_sign_up_is_reported() {
        let (_, store, _) = setup();

        let err = store
            .sign_up(&credentials("parent@example.com", "hunter22"), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "User already registered");
        assert!(store.current().identity.is_none());
    }

    #[test]
    fn test_confirm_password() {
        assert_eq!(confirm_password("abc123", "abc123"), Ok(()));
        assert_eq!(
            confirm_password("abc123", "abc124"),
            Err(AuthError::PasswordMismatch)
        );
        assert_eq!(
            confirm_password("abc123", ""),
            Err(AuthError::MissingFields(vec!["confirm_password"]))
        );
    }

    #[tokio::test]
    async fn test_refresh_only_near_expiry() {
        let (_, store, _) = setup();
        let (events, _subscription) = record_events(&store);
        store
            .sign_in(&credentials("parent@example.com", "hunter22"))
            .await
            .unwrap();
        let expires_at = store.expires_at().unwrap();

        assert!(!store.refresh_if_expiring(expires_at - TOKEN_TTL_SECS).await);
        assert!(store.refresh_if_expiring(expires_at - 30).await);

        assert_eq!(
            *events.borrow(),
            vec![AuthEvent::SignedIn, AuthEvent::TokenRefreshed]
        );
        assert!(store.current().is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_token_that_cannot_refresh_signs_out() {
        let (backend, store, _) = setup();
        store
            .sign_in(&credentials("parent@example.com", "hunter22"))
            .await
            .unwrap();
        let expires_at = store.expires_at().unwrap();
        backend.fail_next(BackendError::rejected(400, "Invalid Refresh Token"));

        assert!(!store.refresh_if_expiring(expires_at + 5).await);
        assert!(store.current().identity.is_none());
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let (_, store, _) = setup();
        store.initialize().await;

        let err = store.update_password("newpass1", "newpass1").await.unwrap_err();
        assert_eq!(err, AuthError::NotAuthenticated);

        store
            .sign_in(&credentials("parent@example.com", "hunter22"))
            .await
            .unwrap();
        store.update_password("newpass1", "newpass1").await.unwrap();
        store.sign_out().await;
        assert!(store
            .sign_in(&credentials("parent@example.com", "newpass1"))
            .await
            .is_ok());
    }

    #[test]
    fn test_external_change_is_broadcast() {
        let (_, store, _) = setup();
        let (events, _subscription) = record_events(&store);

        store.apply_external_change(AuthEvent::SignedOut, None);

        assert_eq!(*events.borrow(), vec![AuthEvent::SignedOut]);
        assert!(!store.current().is_loading);
    }
}
