// Company profile handlers

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::{CreateCompanyRequest, PageQuery, UpdateCompanyRequest, DEFAULT_PAGE_SIZE},
    utils::{api_response, ApiResponse, ServiceError},
};

/// `GET /companies?search=&page=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct CompanyListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl CompanyListQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

pub async fn create_company(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state.company_service.create(&user, request).await?;
    Ok(api_response::created(company, "Company created"))
}

pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanyListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .company_service
        .list(query.search.as_deref(), &query.page_query())
        .await?;
    Ok(api_response::ok(page, "Companies retrieved"))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state.company_service.get(company_id).await?;
    Ok(api_response::ok(company, "Company retrieved"))
}

pub async fn get_my_company(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state.company_service.get_own(&user).await?;
    Ok(api_response::ok(company, "Company retrieved"))
}

pub async fn update_company(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<Uuid>,
    Json(request): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state
        .company_service
        .update(&user, company_id, request)
        .await?;
    Ok(api_response::ok(company, "Company updated"))
}

pub async fn delete_company(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.company_service.delete(&user, company_id).await?;
    Ok(Json(ApiResponse::message("Company deleted")))
}
