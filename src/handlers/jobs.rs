// Job posting handlers, including the apply and save actions nested under a job

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::{ApplyRequest, CreateJobRequest, JobFilter, PageQuery, UpdateJobRequest},
    utils::{api_response, ApiResponse, ServiceError},
};

pub async fn create_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state.job_service.create(&user, request).await?;
    Ok(api_response::created(job, "Job created"))
}

/// Public listing of active jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state.job_service.search(&filter).await?;
    Ok(api_response::ok(page, "Jobs retrieved"))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state.job_service.get(job_id).await?;
    Ok(api_response::ok(job, "Job retrieved"))
}

pub async fn list_my_jobs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state.job_service.list_own(&user, &page).await?;
    Ok(api_response::ok(page, "Jobs retrieved"))
}

pub async fn update_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
    Json(request): Json<UpdateJobRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let job = state.job_service.update(&user, job_id, request).await?;
    Ok(api_response::ok(job, "Job updated"))
}

pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.job_service.delete(&user, job_id).await?;
    Ok(Json(ApiResponse::message("Job deleted")))
}

/// POST /api/jobs/{id}/apply
pub async fn apply_to_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
    Json(request): Json<ApplyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let application = state
        .application_service
        .apply(&user, job_id, request)
        .await?;
    Ok(api_response::created(application, "Application submitted"))
}

/// GET /api/jobs/{id}/applications
pub async fn list_job_applications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .application_service
        .list_for_job(&user, job_id, &page)
        .await?;
    Ok(api_response::ok(page, "Applications retrieved"))
}

/// POST /api/jobs/{id}/save
pub async fn save_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.saved_job_service.save(&user, job_id).await?;
    Ok(api_response::created((), "Job saved"))
}

/// DELETE /api/jobs/{id}/save
pub async fn unsave_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.saved_job_service.unsave(&user, job_id).await?;
    Ok(Json(ApiResponse::message("Job removed from saved jobs")))
}
