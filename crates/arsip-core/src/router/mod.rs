//! Navigation-guard protocol.
//!
//! The host application owns the actual router; this module owns the
//! decision: given a navigation and the current session, either allow it or
//! redirect. Auth-only routes require a live session validated against the
//! backend; guest-only routes (login, register) bounce authenticated users
//! to the home route and silently demote stale sessions to anonymous.

use tracing::debug;

use crate::auth::SessionGuard;

/// Route unauthenticated users are sent to.
pub const LOGIN_ROUTE: &str = "/login";

/// Authenticated home route.
pub const HOME_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

/// A navigation attempt: where to, and what the route demands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub target: String,
    pub meta: RouteMeta,
}

impl Navigation {
    pub fn to_protected(target: &str) -> Self {
        Self {
            target: target.to_string(),
            meta: RouteMeta {
                requires_auth: true,
                requires_guest: false,
            },
        }
    }

    pub fn to_guest(target: &str) -> Self {
        Self {
            target: target.to_string(),
            meta: RouteMeta {
                requires_auth: false,
                requires_guest: true,
            },
        }
    }

    pub fn to_public(target: &str) -> Self {
        Self {
            target: target.to_string(),
            meta: RouteMeta::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send to the login page, remembering the intended target so login can
    /// redirect back to it.
    RedirectToLogin { redirect: String },
    RedirectToHome,
}

/// Resolve a navigation against the session guard.
pub async fn resolve(guard: &SessionGuard, nav: &Navigation) -> GuardDecision {
    if nav.meta.requires_auth {
        // Fast local check first so the redirect never blocks on the network.
        if !guard.is_authenticated() {
            return GuardDecision::RedirectToLogin {
                redirect: nav.target.clone(),
            };
        }
        // Definitive check: revalidate the token against the backend.
        match guard.fetch_profile().await {
            Ok(_) => GuardDecision::Allow,
            Err(e) => {
                debug!(target = %nav.target, error = %e, "token validation failed");
                guard.logout();
                GuardDecision::RedirectToLogin {
                    redirect: nav.target.clone(),
                }
            }
        }
    } else if nav.meta.requires_guest && guard.is_authenticated() {
        match guard.fetch_profile().await {
            Ok(_) => GuardDecision::RedirectToHome,
            Err(e) => {
                // Stale session on a guest route: demote to anonymous.
                debug!(target = %nav.target, error = %e, "stale session on guest route");
                guard.logout();
                GuardDecision::Allow
            }
        }
    } else {
        GuardDecision::Allow
    }
}

/// Login URL carrying the original target in the redirect query.
pub fn login_url(redirect: &str) -> String {
    format!("{}?redirect={}", LOGIN_ROUTE, redirect)
}

/// Where to go after the transport layer drops a dead session: the login
/// page, unless the user is already on it.
pub fn redirect_after_session_loss(current_route: &str) -> Option<&'static str> {
    (current_route != LOGIN_ROUTE).then_some(LOGIN_ROUTE)
}
