// Role dashboards. Each aggregator enforces its own role.

use axum::{extract::State, response::IntoResponse};

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    utils::{api_response, ServiceError},
};

pub async fn jobseeker_dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let dashboard = state.dashboard_service.jobseeker(&user).await?;
    Ok(api_response::ok(dashboard, "Dashboard retrieved"))
}

pub async fn employer_dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let dashboard = state.dashboard_service.employer(&user).await?;
    Ok(api_response::ok(dashboard, "Dashboard retrieved"))
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let dashboard = state.dashboard_service.admin(&user).await?;
    Ok(api_response::ok(dashboard, "Dashboard retrieved"))
}
