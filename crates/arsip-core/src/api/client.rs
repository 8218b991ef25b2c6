use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionHandle;
use crate::config::Config;
use crate::models::{
    AuthResponse, Company, Document, FinancialReport, FinancialReportComparison, LoginRequest,
    RegisterRequest, SaveFinancialReport, TwoFactorStatus, UserProfile,
};

use super::error::{ApiError, ErrorBody};

/// Header carrying the CSRF double-submit token on state-changing requests.
const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Deserialize)]
struct CsrfTokenResponse {
    csrf_token: String,
}

/// Verbs that mutate server state and therefore require a CSRF token.
fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    )
}

/// Login and register are exempt from the global 401 logout side effect so a
/// failed login attempt passes its error through to the caller instead.
fn is_auth_endpoint(path: &str) -> bool {
    path.starts_with("/auth/login") || path.starts_with("/auth/register")
}

/// Callback run after a 401 forces the session to be dropped. The router
/// wires this to "navigate to the login page unless already there".
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// API client for the arsip backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the auth state and CSRF cache are shared across clones.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
    csrf: Arc<RwLock<Option<String>>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl Client {
    pub fn new(config: &Config, session: SessionHandle) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
            csrf: Arc::new(RwLock::new(None)),
            on_unauthorized: None,
        })
    }

    /// Install the hook run when a 401 on a protected endpoint drops the
    /// session.
    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== CSRF token cache =====

    pub fn cached_csrf_token(&self) -> Option<String> {
        self.csrf.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn invalidate_csrf_token(&self) {
        self.csrf.write().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// Fetch a fresh CSRF token and cache it. Concurrent fetches race
    /// benignly; the last fetch wins on the shared cache.
    pub async fn fetch_csrf_token(&self) -> Result<String, ApiError> {
        let response = self.http.get(self.url("/csrf-token")).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        let parsed: CsrfTokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("csrf-token response: {}", e)))?;
        debug!("fetched CSRF token");
        *self.csrf.write().unwrap_or_else(|e| e.into_inner()) = Some(parsed.csrf_token.clone());
        Ok(parsed.csrf_token)
    }

    async fn ensure_csrf_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.cached_csrf_token() {
            return Ok(token);
        }
        self.fetch_csrf_token().await
    }

    // ===== Request engine =====

    /// Send a request with the full interceptor behavior: bearer header,
    /// lazy CSRF fetch for state-changing verbs, a single replay on CSRF
    /// rejection, and session teardown on 401 from non-auth endpoints.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut csrf_token = if is_state_changing(&method) {
            Some(self.ensure_csrf_token().await?)
        } else {
            None
        };
        let mut replayed = false;

        loop {
            let mut request = self.http.request(method.clone(), self.url(path));
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
            if let Some(ref token) = csrf_token {
                request = request.header(CSRF_HEADER, token);
            }
            if let Some(ref body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body_text = response.text().await.unwrap_or_default();

            if status == StatusCode::FORBIDDEN {
                let parsed = ErrorBody::parse(&body_text);
                if parsed.is_csrf_rejection() {
                    if replayed {
                        return Err(ApiError::CsrfRejected);
                    }
                    debug!(path, code = ?parsed.error, "stale CSRF token, replaying once");
                    self.invalidate_csrf_token();
                    csrf_token = Some(self.fetch_csrf_token().await?);
                    replayed = true;
                    continue;
                }
            }

            if status == StatusCode::UNAUTHORIZED {
                // A 401 drops the cached CSRF token even when unrelated to
                // CSRF, matching the backend's token lifetime.
                self.invalidate_csrf_token();
                if !is_auth_endpoint(path) {
                    warn!(path, "unauthorized response, dropping session");
                    if let Err(e) = self.session.clear() {
                        warn!(error = %e, "failed to clear persisted session");
                    }
                    if let Some(hook) = &self.on_unauthorized {
                        hook();
                    }
                }
            }

            return Err(ApiError::from_status(status, &body_text));
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("response from {}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, None).await?;
        Self::parse_json(response, path).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("request body: {}", e)))?;
        let response = self.execute(method, path, Some(value)).await?;
        Self::parse_json(response, path).await
    }

    // ===== Auth endpoints =====

    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, "/auth/login", request).await
    }

    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, "/auth/register", request).await
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/auth/profile").await
    }

    /// Verify a TOTP code while enabling 2FA on the current account.
    pub async fn verify_two_factor(&self, code: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "code": code });
        self.execute(Method::POST, "/auth/2fa/verify", Some(body))
            .await?;
        Ok(())
    }

    pub async fn two_factor_status(&self) -> Result<TwoFactorStatus, ApiError> {
        self.get_json("/auth/2fa/status").await
    }

    // ===== Companies and documents =====

    pub async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.get_json("/companies").await
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        self.get_json("/documents").await
    }

    pub async fn get_document(&self, id: &str) -> Result<Document, ApiError> {
        self.get_json(&format!("/documents/{}", id)).await
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/documents/{}", id), None)
            .await?;
        Ok(())
    }

    // ===== Financial reports =====

    pub async fn create_report(
        &self,
        report: &SaveFinancialReport<'_>,
    ) -> Result<FinancialReport, ApiError> {
        self.send_json(Method::POST, "/financial-reports", report)
            .await
    }

    pub async fn update_report(
        &self,
        id: &str,
        report: &SaveFinancialReport<'_>,
    ) -> Result<FinancialReport, ApiError> {
        self.send_json(Method::PUT, &format!("/financial-reports/{}", id), report)
            .await
    }

    pub async fn get_report(&self, id: &str) -> Result<FinancialReport, ApiError> {
        self.get_json(&format!("/financial-reports/{}", id)).await
    }

    pub async fn reports_for_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<FinancialReport>, ApiError> {
        self.get_json(&format!("/financial-reports/company/{}", company_id))
            .await
    }

    pub async fn compare_reports(
        &self,
        company_id: &str,
        year: &str,
        period: &str,
    ) -> Result<FinancialReportComparison, ApiError> {
        self.get_json(&format!(
            "/financial-reports/compare?company_id={}&year={}&period={}",
            company_id, year, period
        ))
        .await
    }

    pub async fn delete_report(&self, id: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/financial-reports/{}", id), None)
            .await?;
        Ok(())
    }
}
