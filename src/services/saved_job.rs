// Job seeker bookmarks

use tracing::{info, instrument};
use uuid::Uuid;

use super::require_role;
use crate::db::DieselPool;
use crate::models::{
    AuthenticatedUser, Job, PageQuery, Paginated, SavedJob, SavedJobResponse, UserRole,
};
use crate::utils::ServiceError;

#[derive(Clone)]
pub struct SavedJobService {
    pool: DieselPool,
}

impl SavedJobService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn save(&self, user: &AuthenticatedUser, job_id: Uuid) -> Result<(), ServiceError> {
        require_role(user, UserRole::JobSeeker)?;

        let mut conn = self.pool.get().await?;
        if Job::find_by_id(&mut conn, job_id).await?.is_none() {
            return Err(ServiceError::not_found("Job"));
        }

        SavedJob::create(&mut conn, user.user_id, job_id)
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => ServiceError::Conflict("Job already saved".to_string()),
                other => other,
            })?;

        info!(job_id = %job_id, "Job saved");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn unsave(&self, user: &AuthenticatedUser, job_id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        let removed = SavedJob::delete(&mut conn, user.user_id, job_id).await?;
        if removed == 0 {
            return Err(ServiceError::not_found("Saved job"));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        page: &PageQuery,
    ) -> Result<Paginated<SavedJobResponse>, ServiceError> {
        let mut conn = self.pool.get().await?;
        let (rows, total) = SavedJob::list_for_user(&mut conn, user.user_id, page).await?;

        let items = rows
            .into_iter()
            .map(|(saved, job, company_name)| SavedJobResponse::new(saved, job, company_name))
            .collect();
        Ok(Paginated::new(items, total, page))
    }
}
