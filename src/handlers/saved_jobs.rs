// Saved job listing; save and unsave live under /jobs/{id}/save

use axum::extract::{Query, State};
use axum::response::IntoResponse;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::PageQuery,
    utils::{api_response, ServiceError},
};

pub async fn list_saved_jobs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state.saved_job_service.list(&user, &page).await?;
    Ok(api_response::ok(page, "Saved jobs retrieved"))
}
