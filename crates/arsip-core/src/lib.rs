//! Core library for the arsip document-management client.
//!
//! The backend is a REST API (companies, documents, financial reports) behind
//! JWT bearer authentication and double-submit CSRF protection. This crate
//! owns the client side of that contract:
//!
//! - [`api::Client`]: typed endpoint wrappers plus the transport interceptor
//!   that attaches credentials and transparently recovers from stale CSRF
//!   tokens (one replay, never more).
//! - [`auth::SessionGuard`]: the single owner of session mutation - login,
//!   registration, logout, and profile revalidation.
//! - [`router`]: the navigation-guard protocol gating auth-only and
//!   guest-only routes on session state.
//! - [`auth::SessionStore`]: injected persistence for the bearer token and
//!   user profile, so tests can swap in an in-memory store.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;

pub use api::{ApiError, Client};
pub use auth::{FileSessionStore, MemorySessionStore, SessionGuard, SessionHandle, SessionStore};
pub use config::Config;
