use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::RegisterForm,
        jwt::{JwtKeys, TokenPair},
        password::{hash_password, verify_password},
        tokens::generate_opaque_token,
    },
    error::{ApiError, ApiResult},
    mailer::{password_reset_email, verification_email},
    state::AppState,
    users::model::User,
    users::repo::NewUser,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_name(field: &str, value: &str) -> ApiResult<()> {
    let len = value.chars().count();
    if !(2..=50).contains(&len) {
        return Err(ApiError::Validation(format!(
            "{field} must be between 2 and 50 characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> ApiResult<()> {
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

/// Session and account lifecycle over the User record.
///
/// Holds the signing keys and borrows the shared state; every operation is
/// a single read-check-write pass, except refresh rotation which uses a
/// compare-and-swap on the stored token.
pub struct SessionService<'a> {
    state: &'a AppState,
    keys: JwtKeys,
}

impl<'a> SessionService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        let keys = JwtKeys::from_config(&state.config.jwt);
        Self { state, keys }
    }

    /// Create an unverified account and send the verification email.
    ///
    /// A mail transport failure is reported to the caller; the row stays so
    /// the address cannot be squatted by a second registration.
    pub async fn register(&self, mut form: RegisterForm) -> ApiResult<User> {
        form.email = form.email.trim().to_lowercase();

        validate_name("firstName", &form.first_name)?;
        validate_name("lastName", &form.last_name)?;
        if !is_valid_email(&form.email) {
            return Err(ApiError::Validation("Invalid email address".into()));
        }
        validate_password(&form.password)?;

        if User::find_by_email(&self.state.db, &form.email).await?.is_some() {
            warn!(email = %form.email, "registration with taken email");
            return Err(ApiError::DuplicateEmail);
        }

        let hash = hash_password(&form.password)?;
        let token = generate_opaque_token();
        let expires = OffsetDateTime::now_utc()
            + TimeDuration::hours(self.state.config.verification_ttl_hours);

        let user = User::create(
            &self.state.db,
            NewUser {
                first_name: &form.first_name,
                last_name: &form.last_name,
                email: &form.email,
                password_hash: &hash,
                profile_image: form.profile_image.as_deref(),
                verification_token: &token,
                verification_expires: expires,
            },
        )
        .await?;

        let (subject, html) =
            verification_email(&self.state.config.frontend_url, &user.first_name, &token);
        self.state
            .mailer
            .send(&user.email, &subject, &html)
            .await
            .map_err(|e| ApiError::Internal(e.context("send verification email")))?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Credential check, then token issuance and refresh-token persistence.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<(User, TokenPair)> {
        let email = email.trim().to_lowercase();
        let user = User::find_by_email(&self.state.db, &email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        // Federated accounts have no local password and cannot log in here.
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(ApiError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "login on deactivated account");
            return Err(ApiError::AccountDeactivated);
        }

        let pair = self.keys.issue_pair(user.id)?;
        let user = User::store_login(&self.state.db, user.id, &pair.refresh_token).await?;

        info!(user_id = %user.id, "user logged in");
        Ok((user, pair))
    }

    /// Rotate the refresh token: the presented token must both verify
    /// against the refresh secret and still be the persisted one. The swap
    /// is atomic, so of two concurrent refreshes only one wins; the loser
    /// gets `InvalidRefreshToken` and has to log in again.
    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenPair> {
        let claims = self
            .keys
            .verify_refresh(refresh_token)
            .map_err(|_| ApiError::InvalidRefreshToken)?;

        let pair = self.keys.issue_pair(claims.sub)?;
        let rotated =
            User::rotate_refresh_token(&self.state.db, refresh_token, &pair.refresh_token).await?;
        match rotated {
            Some(user) => {
                info!(user_id = %user.id, "refresh token rotated");
                Ok(pair)
            }
            None => Err(ApiError::InvalidRefreshToken),
        }
    }

    /// Clear the stored refresh token. Idempotent; a second logout is a
    /// no-op, not an error.
    pub async fn logout(&self, user_id: Uuid) -> ApiResult<()> {
        User::clear_refresh_token(&self.state.db, user_id).await?;
        info!(user_id = %user_id, "user logged out");
        Ok(())
    }

    /// Consume a verification token. Tokens are strictly single-use: once
    /// cleared, presenting the same token again fails.
    pub async fn verify_email(&self, token: &str) -> ApiResult<User> {
        let user = User::find_by_valid_verification_token(&self.state.db, token)
            .await?
            .ok_or(ApiError::InvalidOrExpiredToken)?;
        let user = User::mark_email_verified(&self.state.db, user.id).await?;
        info!(user_id = %user.id, "email verified");
        Ok(user)
    }

    /// Issue a reset token and email it. Delivery failure is logged but not
    /// surfaced; the caller always sees a message-only success.
    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        let email = email.trim().to_lowercase();
        let user = User::find_by_email(&self.state.db, &email)
            .await?
            .ok_or_else(|| ApiError::NotFound("No user found with this email address".into()))?;

        let token = generate_opaque_token();
        let expires =
            OffsetDateTime::now_utc() + TimeDuration::minutes(self.state.config.reset_ttl_minutes);
        User::set_reset_token(&self.state.db, user.id, &token, expires).await?;

        let (subject, html) =
            password_reset_email(&self.state.config.frontend_url, &user.first_name, &token);
        if let Err(e) = self.state.mailer.send(&user.email, &subject, &html).await {
            warn!(user_id = %user.id, error = ?e, "password reset email failed");
        }
        Ok(())
    }

    /// Consume a reset token, store the new hash, and clear the stored
    /// refresh token so every live session must re-authenticate.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<()> {
        validate_password(new_password)?;
        let user = User::find_by_valid_reset_token(&self.state.db, token)
            .await?
            .ok_or(ApiError::InvalidOrExpiredToken)?;
        let hash = hash_password(new_password)?;
        User::reset_password(&self.state.db, user.id, &hash).await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_validation_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn name_validation_bounds() {
        assert!(validate_name("firstName", "Al").is_ok());
        assert!(validate_name("firstName", "A").is_err());
        assert!(validate_name("firstName", &"x".repeat(51)).is_err());
        assert!(validate_name("firstName", &"x".repeat(50)).is_ok());
    }

    #[test]
    fn password_validation_minimum_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }
}
