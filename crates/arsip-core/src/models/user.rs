use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user profile, as returned by `GET /auth/profile` and embedded
/// in auth responses. Persisted under the `auth_user` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Legacy role string; `role_id` references the role table.
    #[serde(default)]
    pub role: String,
    /// None for superadmin accounts, required for everyone else.
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Response from `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Payload for `POST /auth/login`. The `username` field accepts either a
/// username or an email address; `code` carries the optional 2FA code.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a str>,
}

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from `GET /auth/2fa/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct TwoFactorStatus {
    pub enabled: bool,
}
