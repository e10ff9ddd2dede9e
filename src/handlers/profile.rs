use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::UpdateProfileRequest,
    utils::{api_response, ServiceError},
};

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.profile_service.get_own(&user).await?;
    Ok(api_response::ok(profile, "Profile retrieved"))
}

/// Partial update; absent fields are left unchanged
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.profile_service.update_own(&user, request).await?;
    Ok(api_response::ok(profile, "Profile updated"))
}
