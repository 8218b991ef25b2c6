use tracing::{info, warn};

use crate::api::{ApiError, Client};
use crate::models::{LoginRequest, RegisterRequest, UserProfile};

use super::session::SessionHandle;

/// Single source of truth for "is the caller authenticated" and the only
/// component permitted to mutate the session.
///
/// Persistence failures are logged, not surfaced: the in-memory session is
/// authoritative for this process and a broken store should not fail a login
/// the backend accepted.
#[derive(Clone)]
pub struct SessionGuard {
    api: Client,
    session: SessionHandle,
}

impl SessionGuard {
    pub fn new(api: Client) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    pub fn api(&self) -> &Client {
        &self.api
    }

    /// Log in with a username or email. On success the token and profile are
    /// stored and persisted; on failure the backend's message is surfaced
    /// verbatim and the session is unchanged.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<UserProfile, ApiError> {
        self.login_request(LoginRequest {
            username: identifier,
            password,
            code: None,
        })
        .await
    }

    /// Log in with a second-factor code for accounts with 2FA enabled.
    pub async fn login_with_code(
        &self,
        identifier: &str,
        password: &str,
        code: &str,
    ) -> Result<UserProfile, ApiError> {
        self.login_request(LoginRequest {
            username: identifier,
            password,
            code: Some(code),
        })
        .await
    }

    async fn login_request(&self, request: LoginRequest<'_>) -> Result<UserProfile, ApiError> {
        let response = self.api.login(&request).await?;
        info!(username = %response.user.username, "logged in");
        if let Err(e) = self.session.establish(&response.token, &response.user) {
            warn!(error = %e, "failed to persist session");
        }
        Ok(response.user)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ApiError> {
        let response = self
            .api
            .register(&RegisterRequest {
                username,
                email,
                password,
            })
            .await?;
        info!(username = %response.user.username, "registered");
        if let Err(e) = self.session.establish(&response.token, &response.user) {
            warn!(error = %e, "failed to persist session");
        }
        Ok(response.user)
    }

    /// Clear the bearer token, profile, and cached CSRF token. No network
    /// call; idempotent.
    pub fn logout(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
        self.api.invalidate_csrf_token();
    }

    /// Revalidate the current token against the backend and refresh the
    /// persisted profile. Does not log out on failure; callers decide whether
    /// a dead session should be dropped (see the route-guard protocol).
    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        let profile = self.api.profile().await?;
        if let Err(e) = self.session.update_user(&profile) {
            warn!(error = %e, "failed to persist refreshed profile");
        }
        Ok(profile)
    }

    /// Fast local check: token and profile both present in memory. Used for
    /// must-not-block decisions before the definitive profile check.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
