use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure the HTTP surface can report.
///
/// Domain errors carry their own variant; infrastructure failures (database,
/// mail transport, hashing) collapse into `Internal` so callers can tell the
/// two apart.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists with this email")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid or expired token")]
    Unauthenticated,

    #[error("Email verification required")]
    EmailNotVerified,

    #[error("Admin access required")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateEmail
            | ApiError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::AccountDeactivated
            | ApiError::InvalidRefreshToken
            | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::EmailNotVerified | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code, so clients do not match on message text.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::DuplicateEmail => "DUPLICATE_EMAIL",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            ApiError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(ref e) = self {
            error!(error = ?e, "internal error");
        }
        let body = json!({
            "success": false,
            "message": self.to_string(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::AccountDeactivated.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidRefreshToken.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::EmailNotVerified.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("User not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidOrExpiredToken.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ApiError::EmailNotVerified.code(), "EMAIL_NOT_VERIFIED");
        assert_eq!(ApiError::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(
            ApiError::Validation("bad".into()).code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn internal_hides_cause_from_client() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused (127.0.0.1:5432)"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
