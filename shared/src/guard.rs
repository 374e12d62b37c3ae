//! Route guard decision.
//!
//! Pure function of the requested path and the session snapshot, so the
//! protected-route component only has to render what this module decides.

use crate::session::SessionSnapshot;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_AUTHENTICATED_PATH: &str = "/dashboard";

/// Views that render with or without an identity.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/signup",
    "/forgot-password",
    "/reset-password",
    "/terms",
    "/privacy",
];

/// Public paths that only make sense while signed out.
const AUTH_FLOW_PATHS: &[&str] = &["/login", "/signup", "/forgot-password", "/reset-password"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity not resolved yet: show a neutral placeholder.
    Loading,
    Redirect { to: String, from: String },
    Render,
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

pub fn is_public_path(path: &str) -> bool {
    let path = strip_query(path);
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    PUBLIC_PATHS.contains(&path)
}

pub fn guard(path: &str, session: &SessionSnapshot) -> GuardDecision {
    if is_public_path(path) {
        return GuardDecision::Render;
    }
    if session.is_loading {
        return GuardDecision::Loading;
    }
    match session.identity {
        Some(_) => GuardDecision::Render,
        None => GuardDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            from: path.to_string(),
        },
    }
}

/// Where to go after a successful sign-in. Only same-origin absolute paths to
/// protected views are honored.
pub fn post_login_target(from: Option<&str>) -> String {
    match from {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains("://")
                && !AUTH_FLOW_PATHS.contains(&strip_query(path))
                && strip_query(path) != "/" =>
        {
            path.to_string()
        }
        _ => DEFAULT_AUTHENTICATED_PATH.to_string(),
    }
}
