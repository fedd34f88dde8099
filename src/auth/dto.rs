use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::model::PublicUser;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// `GET /verify-email?token=...`
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// Registration fields collected from the multipart form.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub profile_image: Option<String>,
}

/// Profile update fields collected from the multipart form.
#[derive(Debug, Default)]
pub struct UpdateProfileForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub profile_image: Option<String>,
}

/// Payload returned after registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub user_id: Uuid,
    pub email: String,
    pub user: PublicUser,
}

/// Payload returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Payload returned after refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_request_accepts_camel_case() {
        let req: RefreshRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).expect("parse refresh request");
        assert_eq!(req.refresh_token, "abc");
    }

    #[test]
    fn token_pair_serializes_camel_case() {
        let json = serde_json::to_string(&TokenPairData {
            access_token: "a".into(),
            refresh_token: "r".into(),
        })
        .unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("refreshToken"));
    }
}
