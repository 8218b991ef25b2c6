use serde::Deserialize;
use thiserror::Error;

/// CSRF error codes the backend returns with a 403.
/// Both trigger the same client recovery: refresh the token and replay once.
pub const CSRF_TOKEN_MISSING: &str = "csrf_token_missing";
pub const CSRF_TOKEN_INVALID: &str = "csrf_token_invalid";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bearer token missing, invalid, or expired; also failed login/register
    /// attempts, with the backend's message passed through verbatim.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// CSRF token was stale and the single replay was already attempted.
    #[error("request rejected by CSRF protection")]
    CsrfRejected,

    /// Backend-reported 4xx unrelated to auth or CSRF.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("server error: {0}")]
    ServerError(String),

    /// Transport-level failure, including the bounded request timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Error body shape the backend uses: a machine-readable code plus an
/// optional human-readable message.
#[derive(Debug, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Whether this is a CSRF rejection (missing or invalid token).
    pub fn is_csrf_rejection(&self) -> bool {
        matches!(
            self.error.as_deref(),
            Some(CSRF_TOKEN_MISSING) | Some(CSRF_TOKEN_INVALID)
        )
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            // Back off to a char boundary so multibyte UTF-8 never splits
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Prefer the backend's `message` field; fall back to the raw body.
    fn display_message(body: &str) -> String {
        match ErrorBody::parse(body).message {
            Some(message) if !message.is_empty() => message,
            _ => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => ApiError::AuthenticationFailed(Self::display_message(body)),
            404 => ApiError::NotFound(Self::display_message(body)),
            400 | 402 | 405..=499 => ApiError::ValidationFailed(Self::display_message(body)),
            500..=599 => ApiError::ServerError(Self::display_message(body)),
            _ => ApiError::InvalidResponse(format!(
                "status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn csrf_codes_are_detected() {
        let missing = ErrorBody::parse(r#"{"error":"csrf_token_missing"}"#);
        assert!(missing.is_csrf_rejection());

        let invalid = ErrorBody::parse(r#"{"error":"csrf_token_invalid","message":"CSRF token invalid"}"#);
        assert!(invalid.is_csrf_rejection());

        let other = ErrorBody::parse(r#"{"error":"invalid_credentials"}"#);
        assert!(!other.is_csrf_rejection());

        assert!(!ErrorBody::parse("not json").is_csrf_rejection());
    }

    #[test]
    fn backend_message_surfaced_verbatim() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid_credentials","message":"username atau password salah"}"#,
        );
        match err {
            ApiError::AuthenticationFailed(msg) => {
                assert_eq!(msg, "username atau password salah");
            }
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, ""),
            ApiError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::ValidationFailed(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, &body);
        let msg = err.to_string();
        assert!(msg.len() < body.len());
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        // 499 ASCII bytes, then a 2-byte char straddling the 500-byte cut
        let mut body = "x".repeat(MAX_ERROR_BODY_LENGTH - 1);
        body.push('é');
        body.push_str(&"y".repeat(100));

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, &body);
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert!(!msg.contains('é'));

        // A 4-byte char across the boundary behaves the same
        let mut body = "x".repeat(MAX_ERROR_BODY_LENGTH - 2);
        body.push('𐍈');
        body.push_str(&"y".repeat(100));
        let msg = ApiError::from_status(StatusCode::BAD_REQUEST, &body).to_string();
        assert!(msg.contains("truncated"));
    }
}
