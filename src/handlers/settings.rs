// GET/PUT /api/settings

use crate::api_error::ApiError;
use crate::auth::AuthUser;
use crate::models::UpdateSettingsRequest;
use crate::state::AppState;

pub async fn get_settings_handler(
    state: AppState,
    user: AuthUser,
) -> Result<impl warp::Reply, warp::Rejection> {
    let settings = state
        .store
        .get_settings(user.user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch settings", e))?;

    Ok(warp::reply::json(&settings))
}

/// Fields left out of the request keep their current value
pub async fn update_settings_handler(
    state: AppState,
    user: AuthUser,
    request: UpdateSettingsRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mut settings = state
        .store
        .get_settings(user.user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to update settings", e))?;

    if let Some(model) = request.preferred_model {
        let model = model.trim();
        if model.is_empty() {
            return Err(ApiError::bad_request("preferredModel must not be empty"));
        }
        settings.preferred_model = model.to_string();
    }
    if let Some(use_builtin_key) = request.use_builtin_key {
        settings.use_builtin_key = use_builtin_key;
    }

    let saved = state
        .store
        .upsert_settings(user.user_id, &settings)
        .await
        .map_err(|e| ApiError::internal("Failed to update settings", e))?;

    Ok(warp::reply::json(&saved))
}
