// Job applications: applying, withdrawing and employer review

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::job::load_job_and_company;
use super::{ensure_owner_or_admin, require_role};
use crate::db::DieselPool;
use crate::models::{
    Application, ApplicationResponse, ApplicationStatus, ApplyRequest, AuthenticatedUser, Job,
    PageQuery, Paginated, Profile, UpdateApplicationStatusRequest, UserRole,
};
use crate::utils::ServiceError;

#[derive(Clone)]
pub struct ApplicationService {
    pool: DieselPool,
}

impl ApplicationService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// Apply to an active job. One application per job and applicant.
    #[instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn apply(
        &self,
        user: &AuthenticatedUser,
        job_id: Uuid,
        request: ApplyRequest,
    ) -> Result<ApplicationResponse, ServiceError> {
        require_role(user, UserRole::JobSeeker)?;
        request.validate()?;

        let mut conn = self.pool.get().await?;
        let job = Job::find_by_id(&mut conn, job_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job"))?;
        if !job.is_active {
            return Err(ServiceError::ValidationError(
                "This job is no longer accepting applications".to_string(),
            ));
        }

        let profile_resume = Profile::find_by_user(&mut conn, user.user_id)
            .await?
            .and_then(|p| p.resume_url);

        let application = Application::create(
            &mut conn,
            request.into_new_application(job.id, user.user_id, profile_resume),
        )
        .await
        .map_err(|e| match ServiceError::from(e) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict("You have already applied to this job".to_string())
            },
            other => other,
        })?;

        info!(application_id = %application.id, job_id = %job.id, "Application submitted");
        Ok(ApplicationResponse::from(application))
    }

    pub async fn list_own(
        &self,
        user: &AuthenticatedUser,
        page: &PageQuery,
    ) -> Result<Paginated<ApplicationResponse>, ServiceError> {
        let mut conn = self.pool.get().await?;
        let (rows, total) = Application::list_for_applicant(&mut conn, user.user_id, page).await?;

        let items = rows
            .into_iter()
            .map(|(application, title, company)| {
                ApplicationResponse::from(application).with_job(title, company)
            })
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    /// Applications received for a job; owning employer or admin only
    pub async fn list_for_job(
        &self,
        user: &AuthenticatedUser,
        job_id: Uuid,
        page: &PageQuery,
    ) -> Result<Paginated<ApplicationResponse>, ServiceError> {
        let mut conn = self.pool.get().await?;
        let (job, company) = load_job_and_company(&mut conn, job_id).await?;
        ensure_owner_or_admin(user, company.owner_id, "job")?;

        let (applications, total) = Application::list_for_job(&mut conn, job.id, page).await?;
        let applicant_ids: Vec<Uuid> = applications.iter().map(|a| a.applicant_id).collect();
        let names = Profile::full_names(&mut conn, &applicant_ids).await?;

        let items = applications
            .into_iter()
            .map(|application| {
                let name = names.get(&application.applicant_id).cloned();
                ApplicationResponse::from(application)
                    .with_job(job.title.clone(), company.name.clone())
                    .with_applicant(name)
            })
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    /// Visible to the applicant, the owning employer and admins
    pub async fn get(
        &self,
        user: &AuthenticatedUser,
        application_id: Uuid,
    ) -> Result<ApplicationResponse, ServiceError> {
        let mut conn = self.pool.get().await?;
        let application = find_application(&mut conn, application_id).await?;
        let (job, company) = load_job_and_company(&mut conn, application.job_id).await?;

        if application.applicant_id != user.user_id {
            ensure_owner_or_admin(user, company.owner_id, "application")?;
        }

        Ok(ApplicationResponse::from(application).with_job(job.title, company.name))
    }

    /// Employer review. Withdrawn applications are frozen.
    #[instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn update_status(
        &self,
        user: &AuthenticatedUser,
        application_id: Uuid,
        request: UpdateApplicationStatusRequest,
    ) -> Result<ApplicationResponse, ServiceError> {
        if !request.status.is_employer_settable() {
            return Err(ServiceError::ValidationError(
                "Only the applicant can withdraw an application".to_string(),
            ));
        }

        let mut conn = self.pool.get().await?;
        let application = find_application(&mut conn, application_id).await?;
        let (job, company) = load_job_and_company(&mut conn, application.job_id).await?;
        ensure_owner_or_admin(user, company.owner_id, "application")?;

        if application.status == ApplicationStatus::Withdrawn {
            warn!(application_id = %application.id, "Status change on withdrawn application");
            return Err(ServiceError::ValidationError(
                "Withdrawn applications cannot be updated".to_string(),
            ));
        }

        let updated = Application::update_status(&mut conn, application.id, request.status).await?;
        info!(
            application_id = %updated.id,
            status = %updated.status,
            "Application status updated"
        );
        Ok(ApplicationResponse::from(updated).with_job(job.title, company.name))
    }

    /// Applicant withdraws; repeating it is harmless
    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn withdraw(
        &self,
        user: &AuthenticatedUser,
        application_id: Uuid,
    ) -> Result<ApplicationResponse, ServiceError> {
        let mut conn = self.pool.get().await?;
        let application = find_application(&mut conn, application_id).await?;
        if application.applicant_id != user.user_id {
            return Err(ServiceError::Forbidden(
                "You can only withdraw your own applications".to_string(),
            ));
        }

        if application.status == ApplicationStatus::Withdrawn {
            return Ok(ApplicationResponse::from(application));
        }

        let updated =
            Application::update_status(&mut conn, application.id, ApplicationStatus::Withdrawn)
                .await?;
        info!(application_id = %updated.id, "Application withdrawn");
        Ok(ApplicationResponse::from(updated))
    }
}

async fn find_application(
    conn: &mut diesel_async::AsyncPgConnection,
    application_id: Uuid,
) -> Result<Application, ServiceError> {
    Application::find_by_id(conn, application_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Application"))
}
