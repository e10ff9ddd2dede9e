// Company profile management

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_owner_or_admin, require_role};
use crate::db::DieselPool;
use crate::models::{
    AuthenticatedUser, Company, CompanyResponse, CreateCompanyRequest, PageQuery, Paginated,
    UpdateCompanyRequest, UserRole,
};
use crate::utils::ServiceError;

#[derive(Clone)]
pub struct CompanyService {
    pool: DieselPool,
}

impl CompanyService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// One company per employer; a second attempt is a conflict
    #[instrument(skip(self, request), fields(owner_id = %user.user_id))]
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateCompanyRequest,
    ) -> Result<CompanyResponse, ServiceError> {
        require_role(user, UserRole::Employer)?;
        request.validate()?;

        let mut conn = self.pool.get().await?;
        if Company::find_by_owner(&mut conn, user.user_id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "You already have a company profile".to_string(),
            ));
        }

        let company = Company::create(&mut conn, request.into_new_company(user.user_id))
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => {
                    ServiceError::Conflict("You already have a company profile".to_string())
                },
                other => other,
            })?;

        info!(company_id = %company.id, "Company created");
        Ok(company.into())
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: &PageQuery,
    ) -> Result<Paginated<CompanyResponse>, ServiceError> {
        let mut conn = self.pool.get().await?;
        let (items, total) = Company::search(&mut conn, search, page).await?;

        Ok(Paginated::new(
            items.into_iter().map(CompanyResponse::from).collect(),
            total,
            page,
        ))
    }

    pub async fn get(&self, company_id: Uuid) -> Result<CompanyResponse, ServiceError> {
        let mut conn = self.pool.get().await?;
        Company::find_by_id(&mut conn, company_id)
            .await?
            .map(CompanyResponse::from)
            .ok_or_else(|| ServiceError::not_found("Company"))
    }

    pub async fn get_own(&self, user: &AuthenticatedUser) -> Result<CompanyResponse, ServiceError> {
        let mut conn = self.pool.get().await?;
        Company::find_by_owner(&mut conn, user.user_id)
            .await?
            .map(CompanyResponse::from)
            .ok_or_else(|| ServiceError::not_found("Company"))
    }

    #[instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        company_id: Uuid,
        request: UpdateCompanyRequest,
    ) -> Result<CompanyResponse, ServiceError> {
        request.validate()?;

        let mut conn = self.pool.get().await?;
        let company = Company::find_by_id(&mut conn, company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company"))?;
        ensure_owner_or_admin(user, company.owner_id, "company")?;

        let updated = Company::update(&mut conn, company.id, &request.into_changeset()).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn delete(
        &self,
        user: &AuthenticatedUser,
        company_id: Uuid,
    ) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        let company = Company::find_by_id(&mut conn, company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company"))?;
        ensure_owner_or_admin(user, company.owner_id, "company")?;

        Company::delete(&mut conn, company.id).await?;
        info!(company_id = %company.id, "Company deleted");
        Ok(())
    }
}
