use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthData, ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterData,
            RegisterForm, ResetPasswordRequest, TokenPairData, UserData, VerifyEmailQuery,
        },
        extractors::{AuthUser, CurrentUser},
        service::SessionService,
    },
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    users::images::store_profile_image,
};

#[instrument(skip(state, multipart))]
pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<RegisterData>>)> {
    let mut form = RegisterForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "firstName" => form.first_name = read_text(field).await?,
            "lastName" => form.last_name = read_text(field).await?,
            "email" => form.email = read_text(field).await?,
            "password" => form.password = read_text(field).await?,
            "profileImage" => {
                form.profile_image = store_profile_image(&state, field).await?;
            }
            _ => {}
        }
    }

    let user = SessionService::new(&state).register(form).await?;
    let data = RegisterData {
        user_id: user.id,
        email: user.email.clone(),
        user: user.into(),
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "User registered successfully. Please check your email for verification.",
            data,
        )),
    ))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthData>>> {
    let (user, pair) = SessionService::new(&state)
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Login successful",
        AuthData {
            user: user.into(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        },
    )))
}

#[instrument(skip(state, query))]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> ApiResult<Json<ApiResponse<UserData>>> {
    let user = SessionService::new(&state).verify_email(&query.token).await?;
    Ok(Json(ApiResponse::ok(
        "Email verified successfully",
        UserData { user: user.into() },
    )))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    SessionService::new(&state)
        .forgot_password(&payload.email)
        .await?;
    Ok(Json(ApiResponse::message("Password reset email sent")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    SessionService::new(&state)
        .reset_password(&payload.token, &payload.password)
        .await?;
    Ok(Json(ApiResponse::message("Password reset successful")))
}

#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<TokenPairData>>> {
    let pair = SessionService::new(&state)
        .refresh(&payload.refresh_token)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Token refreshed",
        TokenPairData {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        },
    )))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<ApiResponse<()>>> {
    SessionService::new(&state).logout(user_id).await?;
    Ok(Json(ApiResponse::message("Logged out successfully")))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserData>> {
    Json(ApiResponse::ok(
        "User profile retrieved successfully",
        UserData { user: user.into() },
    ))
}
