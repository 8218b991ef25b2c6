//! REST API client for the arsip backend.
//!
//! `Client` wraps every request/response pair: it attaches the bearer token,
//! fetches and attaches the CSRF token for state-changing verbs, replays a
//! CSRF-rejected request exactly once, and drops the session on a 401 from
//! any non-auth endpoint.

pub mod client;
pub mod error;

pub use client::{Client, UnauthorizedHook};
pub use error::{ApiError, ErrorBody};
