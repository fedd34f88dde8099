use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::jwt::JwtKeys,
    error::ApiError,
    state::AppState,
    users::model::{Role, User},
};

/// Extracts and validates the bearer access token, yielding the user ID.
/// Fails closed with 401 on a missing, malformed, or expired token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "access token rejected");
            ApiError::Unauthenticated
        })?;

        Ok(AuthUser(claims.sub))
    }
}

/// `AuthUser` plus a database load: the resolved user rides along for the
/// handler. A token for a deleted row is a 401; a deactivated account
/// cannot authenticate either.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let user = User::find_by_id(&state.db, user_id)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        if !user.is_active {
            return Err(ApiError::AccountDeactivated);
        }
        Ok(CurrentUser(user))
    }
}

/// `CurrentUser` that must have a verified email address.
pub struct VerifiedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for VerifiedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_email_verified {
            return Err(ApiError::EmailNotVerified);
        }
        Ok(VerifiedUser(user))
    }
}

/// `CurrentUser` that must hold the admin role.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
