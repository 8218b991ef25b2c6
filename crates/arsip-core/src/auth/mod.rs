//! Authentication: session state, persistence, and the session guard.
//!
//! This module provides:
//! - `SessionHandle`: shared in-memory session state backed by a store
//! - `SessionStore`: injected persistence adapter (file-backed or in-memory)
//! - `SessionGuard`: the only component that mutates the session
//!
//! The bearer token and user profile survive restarts under the `auth_token`
//! and `auth_user` keys; the CSRF token is transport-scoped and never persisted.

pub mod guard;
pub mod session;
pub mod store;

pub use guard::SessionGuard;
pub use session::{Session, SessionHandle};
pub use store::{
    FileSessionStore, MemorySessionStore, SessionStore, StoreError, AUTH_TOKEN_KEY, AUTH_USER_KEY,
};
