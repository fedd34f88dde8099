use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User role stored as the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Full user record as stored in the database.
///
/// Never serialize this directly to a client; use [`PublicUser`] instead.
/// `password_hash` is nullable because federated accounts have no local
/// password, `google_id` is kept for data compatibility with such accounts.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub profile_image: Option<String>,
    pub role: Role,
    pub is_email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_expires: Option<OffsetDateTime>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<OffsetDateTime>,
    pub refresh_token: Option<String>,
    pub google_id: Option<String>,
    pub last_login: Option<OffsetDateTime>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Sanitized projection returned to clients. No password hash, no stored
/// refresh/verification/reset tokens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub role: Role,
    pub is_email_verified: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            profile_image: u.profile_image,
            role: u.role,
            is_email_verified: u.is_email_verified,
            last_login: u.last_login,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: Some("$argon2id$secret".into()),
            profile_image: None,
            role: Role::User,
            is_email_verified: false,
            email_verification_token: Some("deadbeef".into()),
            email_verification_expires: Some(now),
            password_reset_token: None,
            password_reset_expires: None,
            refresh_token: Some("some.jwt.value".into()),
            google_id: None,
            last_login: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_strips_secrets() {
        let json = serde_json::to_string(&PublicUser::from(sample_user())).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("some.jwt.value"));
    }

    #[test]
    fn public_user_uses_camel_case() {
        let json = serde_json::to_string(&PublicUser::from(sample_user())).unwrap();
        assert!(json.contains("firstName"));
        assert!(json.contains("isEmailVerified"));
    }

}
