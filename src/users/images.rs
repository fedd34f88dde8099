use axum::extract::multipart::Field;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Upload a profile image field to object storage under `profiles/`.
/// Returns the public URL, or `None` when the field was submitted empty.
pub async fn store_profile_image(
    state: &AppState,
    field: Field<'_>,
) -> ApiResult<Option<String>> {
    let content_type = field.content_type().map(str::to_string).unwrap_or_default();
    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if data.is_empty() {
        return Ok(None);
    }

    let ext = match content_type.as_str() {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => {
            return Err(ApiError::Validation(
                "Profile image must be PNG, JPEG or WebP".into(),
            ))
        }
    };

    let key = format!("profiles/{}.{ext}", Uuid::new_v4());
    state
        .storage
        .put_object(&key, data, &content_type)
        .await
        .map_err(|e| ApiError::Internal(e.context("store profile image")))?;
    Ok(Some(state.storage.object_url(&key)))
}

/// Best-effort removal of a replaced profile image. The stored value is a
/// public URL; only objects under our `profiles/` prefix are touched.
pub async fn delete_profile_image(state: &AppState, url: &str) {
    if let Some(idx) = url.find("profiles/") {
        let key = &url[idx..];
        if let Err(e) = state.storage.delete_object(key).await {
            tracing::warn!(key, error = ?e, "failed to delete old profile image");
        }
    }
}
