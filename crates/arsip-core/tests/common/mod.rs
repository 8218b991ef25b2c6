#![allow(dead_code)] // Each test binary uses a different subset of helpers

//! In-process mock of the arsip backend for integration tests.
//!
//! Implements just enough of the REST surface to exercise the session
//! lifecycle: login, profile revalidation, CSRF issuance and rejection, and
//! a couple of protected resource endpoints. Counters record what the client
//! actually sent so tests can assert on wire behavior.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use arsip_core::auth::{MemorySessionStore, SessionGuard, SessionHandle, SessionStore};
use arsip_core::{Client, Config};

pub const VALID_TOKEN: &str = "tok-alice";
pub const CSRF_HEADER: &str = "x-csrf-token";

pub struct BackendState {
    /// Number of GET /csrf-token calls served
    pub csrf_fetches: AtomicUsize,
    /// Token currently considered valid by the backend
    pub current_csrf: Mutex<Option<String>>,
    /// Reject this many upcoming state-changing requests with a CSRF error
    pub reject_csrf: AtomicUsize,
    /// When false, bearer-authenticated endpoints return 401
    pub token_valid: AtomicBool,
    /// Attempts against POST /financial-reports (including rejected ones)
    pub report_post_attempts: AtomicUsize,
    /// Successful report creations
    pub reports_created: AtomicUsize,
    /// Number of X-CSRF-Token header values on each state-changing request
    pub csrf_header_counts: Mutex<Vec<usize>>,
    /// Authorization header of the most recent request that carried one
    pub last_authorization: Mutex<Option<String>>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            csrf_fetches: AtomicUsize::new(0),
            current_csrf: Mutex::new(None),
            reject_csrf: AtomicUsize::new(0),
            token_valid: AtomicBool::new(true),
            report_post_attempts: AtomicUsize::new(0),
            reports_created: AtomicUsize::new(0),
            csrf_header_counts: Mutex::new(Vec::new()),
            last_authorization: Mutex::new(None),
        }
    }

    pub fn csrf_fetches(&self) -> usize {
        self.csrf_fetches.load(Ordering::SeqCst)
    }

    pub fn expire_token(&self) {
        self.token_valid.store(false, Ordering::SeqCst);
    }

    pub fn reject_next_csrf(&self, count: usize) {
        self.reject_csrf.store(count, Ordering::SeqCst);
    }

    fn record_auth_header(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            *self.last_authorization.lock().unwrap() =
                Some(value.to_str().unwrap_or_default().to_string());
        }
    }

    fn bearer_ok(&self, headers: &HeaderMap) -> bool {
        self.record_auth_header(headers);
        let expected = format!("Bearer {}", VALID_TOKEN);
        self.token_valid.load(Ordering::SeqCst)
            && headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                == Some(expected.as_str())
    }

    /// CSRF gate for state-changing endpoints. Records how many token header
    /// values the request carried, then validates against the last issued
    /// token, honoring any scripted rejections.
    fn csrf_gate(&self, headers: &HeaderMap) -> Result<(), Response> {
        let count = headers.get_all(CSRF_HEADER).iter().count();
        self.csrf_header_counts.lock().unwrap().push(count);

        if self.reject_csrf.load(Ordering::SeqCst) > 0 {
            self.reject_csrf.fetch_sub(1, Ordering::SeqCst);
            return Err(error_response(
                StatusCode::FORBIDDEN,
                "csrf_token_invalid",
                "CSRF token invalid",
            ));
        }

        let sent = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let current = self.current_csrf.lock().unwrap().clone();
        match sent {
            None => Err(error_response(
                StatusCode::FORBIDDEN,
                "csrf_token_missing",
                "CSRF token missing",
            )),
            Some(token) if Some(&token) != current.as_ref() => Err(error_response(
                StatusCode::FORBIDDEN,
                "csrf_token_invalid",
                "CSRF token invalid",
            )),
            Some(_) => Ok(()),
        }
    }
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

fn unauthorized() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "token invalid or expired",
    )
}

pub fn alice_profile() -> Value {
    json!({
        "id": "u-1",
        "username": "alice",
        "email": "alice@example.com",
        "role": "user",
        "company_id": null,
        "is_active": true
    })
}

async fn csrf_token(State(state): State<Arc<BackendState>>) -> Response {
    let serial = state.csrf_fetches.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("csrf-{}", serial);
    *state.current_csrf.lock().unwrap() = Some(token.clone());
    Json(json!({ "csrf_token": token })).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "alice" && body["password"] == "correct" {
        Json(json!({ "token": VALID_TOKEN, "user": alice_profile() })).into_response()
    } else {
        error_response(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid username or password",
        )
    }
}

async fn profile(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if state.bearer_ok(&headers) {
        Json(alice_profile()).into_response()
    } else {
        unauthorized()
    }
}

async fn list_documents(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if state.bearer_ok(&headers) {
        Json(json!([
            { "id": "d-1", "title": "Annual charter", "company_id": "c-1" }
        ]))
        .into_response()
    } else {
        unauthorized()
    }
}

async fn create_report(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.report_post_attempts.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    if let Err(rejection) = state.csrf_gate(&headers) {
        return rejection;
    }
    let serial = state.reports_created.fetch_add(1, Ordering::SeqCst) + 1;
    let mut report = body;
    report["id"] = json!(format!("r-{}", serial));
    (StatusCode::CREATED, Json(report)).into_response()
}

async fn delete_report(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    if let Err(rejection) = state.csrf_gate(&headers) {
        return rejection;
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Spawn the mock backend on an ephemeral port.
pub async fn spawn_backend() -> (String, Arc<BackendState>) {
    let state = Arc::new(BackendState::new());
    let app = Router::new()
        .route("/api/v1/csrf-token", get(csrf_token))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/profile", get(profile))
        .route("/api/v1/documents", get(list_documents))
        .route("/api/v1/financial-reports", post(create_report))
        .route("/api/v1/financial-reports/{id}", delete(delete_report))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });

    (format!("http://{}", addr), state)
}

/// Build a client + guard around an in-memory store, returning the store so
/// tests can inspect persisted state.
pub fn client_stack(base_url: &str) -> (Client, SessionGuard, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::default());
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    let session = SessionHandle::new(dyn_store);
    let client = Client::new(&Config::with_base_url(base_url), session).expect("build client");
    let guard = SessionGuard::new(client.clone());
    (client, guard, store)
}
