//! UI-agnostic core of BabySleep.
//!
//! Everything here compiles natively and is tested without a browser: the
//! backend client traits, the session store, the route guard decision,
//! owner-scoped entity access, the entity DTOs, analytics, the simulated
//! intelligence widgets, the sleep sound catalogue and the referral and
//! subscription rules.

pub mod access;
pub mod analytics;
pub mod backend;
pub mod config;
pub mod error;
pub mod guard;
pub mod insights;
pub mod models;
pub mod referrals;
pub mod session;
pub mod sounds;
pub mod subscriptions;

#[cfg(test)]
pub(crate) mod testing;

pub use access::{Draft, Entity, EntityAccess, EntityList, ListState, RequestSequence};
pub use backend::{AuthApi, AuthSession, AuthUser, Credentials, TableApi};
pub use config::BackendConfig;
pub use error::{AccessError, AuthError, BackendError, ConfigError, SchemaError};
pub use guard::{guard, post_login_target, GuardDecision};
pub use session::{AuthEvent, SessionSnapshot, SessionStore, Subscription, UserIdentity};
