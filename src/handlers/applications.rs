// Application handlers for applicants and the employers reviewing them

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::{PageQuery, UpdateApplicationStatusRequest},
    utils::{api_response, ServiceError},
};

pub async fn list_my_applications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state.application_service.list_own(&user, &page).await?;
    Ok(api_response::ok(page, "Applications retrieved"))
}

pub async fn get_application(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let application = state
        .application_service
        .get(&user, application_id)
        .await?;
    Ok(api_response::ok(application, "Application retrieved"))
}

/// PUT /api/applications/{id}/status
pub async fn update_application_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(application_id): Path<Uuid>,
    Json(request): Json<UpdateApplicationStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let application = state
        .application_service
        .update_status(&user, application_id, request)
        .await?;
    Ok(api_response::ok(application, "Application status updated"))
}

/// DELETE /api/applications/{id} withdraws; the row is kept with status WITHDRAWN
pub async fn withdraw_application(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let application = state
        .application_service
        .withdraw(&user, application_id)
        .await?;
    Ok(api_response::ok(application, "Application withdrawn"))
}
