// Job postings: public search plus employer-side management

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_owner_or_admin, require_role};
use crate::db::DieselPool;
use crate::models::{
    AuthenticatedUser, Company, CreateJobRequest, Job, JobFilter, JobResponse, PageQuery,
    Paginated, UpdateJobRequest, UserRole,
};
use crate::utils::ServiceError;

#[derive(Clone)]
pub struct JobService {
    pool: DieselPool,
}

impl JobService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// Post a job under the employer's company
    #[instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateJobRequest,
    ) -> Result<JobResponse, ServiceError> {
        require_role(user, UserRole::Employer)?;
        request.validate()?;

        let mut conn = self.pool.get().await?;
        let company = Company::find_by_owner(&mut conn, user.user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(
                    "Create a company profile before posting jobs".to_string(),
                )
            })?;

        let job = Job::create(&mut conn, request.into_new_job(company.id, user.user_id)).await?;

        info!(job_id = %job.id, company_id = %company.id, "Job posted");
        Ok(JobResponse::from_job(job, Some(company.name)))
    }

    /// Active jobs only
    pub async fn search(&self, filter: &JobFilter) -> Result<Paginated<JobResponse>, ServiceError> {
        let mut conn = self.pool.get().await?;
        let (rows, total) = Job::search_active(&mut conn, filter).await?;

        let items = rows
            .into_iter()
            .map(|(job, company_name)| JobResponse::from_job(job, Some(company_name)))
            .collect();
        Ok(Paginated::new(items, total, &filter.page_query()))
    }

    pub async fn get(&self, job_id: Uuid) -> Result<JobResponse, ServiceError> {
        let mut conn = self.pool.get().await?;
        Job::find_with_company(&mut conn, job_id)
            .await?
            .map(|(job, company_name)| JobResponse::from_job(job, Some(company_name)))
            .ok_or_else(|| ServiceError::not_found("Job"))
    }

    /// Every posting of the caller's company, including closed ones
    pub async fn list_own(
        &self,
        user: &AuthenticatedUser,
        page: &PageQuery,
    ) -> Result<Paginated<JobResponse>, ServiceError> {
        require_role(user, UserRole::Employer)?;

        let mut conn = self.pool.get().await?;
        let Some(company) = Company::find_by_owner(&mut conn, user.user_id).await? else {
            return Ok(Paginated::new(Vec::new(), 0, page));
        };

        let (jobs, total) = Job::list_for_company(&mut conn, company.id, page).await?;
        let items = jobs
            .into_iter()
            .map(|job| JobResponse::from_job(job, Some(company.name.clone())))
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    #[instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        job_id: Uuid,
        request: UpdateJobRequest,
    ) -> Result<JobResponse, ServiceError> {
        request.validate()?;

        let mut conn = self.pool.get().await?;
        let (job, company) = load_job_and_company(&mut conn, job_id).await?;
        ensure_owner_or_admin(user, company.owner_id, "job")?;

        request.check_salary_against(&job).map_err(|e| {
            ServiceError::ValidationError(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid salary range".to_string()),
            )
        })?;

        let updated = Job::update(&mut conn, job.id, &request.into_changeset()).await?;
        Ok(JobResponse::from_job(updated, Some(company.name)))
    }

    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn delete(&self, user: &AuthenticatedUser, job_id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        let (job, company) = load_job_and_company(&mut conn, job_id).await?;
        ensure_owner_or_admin(user, company.owner_id, "job")?;

        Job::delete(&mut conn, job.id).await?;
        info!(job_id = %job.id, "Job deleted");
        Ok(())
    }
}

/// A job and the company that owns it, 404 if either is gone
pub(crate) async fn load_job_and_company(
    conn: &mut diesel_async::AsyncPgConnection,
    job_id: Uuid,
) -> Result<(Job, Company), ServiceError> {
    let job = Job::find_by_id(conn, job_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Job"))?;
    let company = Company::find_by_id(conn, job.company_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Company"))?;
    Ok((job, company))
}
