// Saved (bookmarked) jobs

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::{Job, JobResponse};
use super::pagination::PageQuery;
use crate::schema::{companies, jobs, saved_jobs};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = saved_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SavedJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = saved_jobs)]
pub struct NewSavedJob {
    pub user_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobResponse {
    pub id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub job: JobResponse,
}

impl SavedJobResponse {
    pub fn new(saved: SavedJob, job: Job, company_name: String) -> Self {
        Self {
            id: saved.id,
            saved_at: saved.created_at,
            job: JobResponse::from_job(job, Some(company_name)),
        }
    }
}

impl SavedJob {
    /// Duplicate (user, job) pairs surface as a unique violation
    pub async fn create(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        job: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(saved_jobs::table)
            .values(&NewSavedJob {
                user_id: user,
                job_id: job,
            })
            .returning(SavedJob::as_returning())
            .get_result::<SavedJob>(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        job: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(
            saved_jobs::table
                .filter(saved_jobs::user_id.eq(user))
                .filter(saved_jobs::job_id.eq(job)),
        )
        .execute(conn)
        .await
    }

    /// Saved jobs with their posting and company, most recently saved first
    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        page: &PageQuery,
    ) -> Result<(Vec<(Self, Job, String)>, i64), diesel::result::Error> {
        let total = saved_jobs::table
            .filter(saved_jobs::user_id.eq(user))
            .count()
            .get_result::<i64>(conn)
            .await?;

        let items = saved_jobs::table
            .inner_join(jobs::table.inner_join(companies::table))
            .filter(saved_jobs::user_id.eq(user))
            .order(saved_jobs::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select((SavedJob::as_select(), Job::as_select(), companies::name))
            .load::<(SavedJob, Job, String)>(conn)
            .await?;

        Ok((items, total))
    }
}
