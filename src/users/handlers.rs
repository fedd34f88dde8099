use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{UpdateProfileForm, UserData},
        extractors::{AdminUser, CurrentUser, VerifiedUser},
        password::hash_password,
        service,
    },
    config::DeletionMode,
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    users::{
        dto::{ListUsersQuery, UsersPage},
        images::{delete_profile_image, store_profile_image},
        model::User,
    },
};

#[instrument(skip(state, _viewer, query))]
pub async fn list_users(
    State(state): State<AppState>,
    _viewer: VerifiedUser,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ApiResponse<UsersPage>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let search = query.search.unwrap_or_default();

    let (users, total) = User::list(&state.db, limit, (page - 1) * limit, &search).await?;
    let data = UsersPage {
        users: users.into_iter().map(Into::into).collect(),
        total_users: total,
        total_pages: (total + limit - 1) / limit,
        current_page: page,
    };
    Ok(Json(ApiResponse::ok("Users retrieved successfully", data)))
}

#[instrument(skip(state, _viewer))]
pub async fn get_user(
    State(state): State<AppState>,
    _viewer: VerifiedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserData>>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(ApiResponse::ok(
        "User profile retrieved successfully",
        UserData { user: user.into() },
    )))
}

#[instrument(skip(state, multipart))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<UserData>>> {
    let mut form = UpdateProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "firstName" => form.first_name = Some(read_text(field).await?),
            "lastName" => form.last_name = Some(read_text(field).await?),
            "password" => form.password = Some(read_text(field).await?),
            "profileImage" => form.profile_image = store_profile_image(&state, field).await?,
            _ => {}
        }
    }

    if let Some(name) = form.first_name.as_deref() {
        service::validate_name("firstName", name)?;
    }
    if let Some(name) = form.last_name.as_deref() {
        service::validate_name("lastName", name)?;
    }
    // Password changes go through the same hashing path as registration;
    // the plaintext never reaches the repository.
    let password_hash = match form.password.as_deref() {
        Some(p) => {
            service::validate_password(p)?;
            Some(hash_password(p)?)
        }
        None => None,
    };

    if form.profile_image.is_some() {
        if let Some(old) = user.profile_image.as_deref() {
            delete_profile_image(&state, old).await;
        }
    }

    let updated = User::update_profile(
        &state.db,
        user.id,
        form.first_name.as_deref(),
        form.last_name.as_deref(),
        password_hash.as_deref(),
        form.profile_image.as_deref(),
    )
    .await?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(ApiResponse::ok(
        "Profile updated successfully",
        UserData {
            user: updated.into(),
        },
    )))
}

#[instrument(skip(state, _admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let (found, message) = match state.config.deletion_mode {
        DeletionMode::Soft => (
            User::deactivate(&state.db, id).await?,
            "User deactivated successfully",
        ),
        DeletionMode::Hard => (
            User::delete(&state.db, id).await?,
            "User deleted successfully",
        ),
    };
    if !found {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %id, mode = ?state.config.deletion_mode, "user removed");
    Ok(Json(ApiResponse::message(message)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))
}
