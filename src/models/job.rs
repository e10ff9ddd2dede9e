// Job posting Database Model

use chrono::{DateTime, Utc};
use diesel::dsl;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::pagination::{contains_pattern, PageQuery, DEFAULT_PAGE_SIZE};
use crate::schema::{companies, jobs};
use crate::utils::validation::{clearable, nullable, trim_optional_field};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
pub enum JobType {
    #[default]
    #[serde(rename = "FULL_TIME")]
    FullTime,
    #[serde(rename = "PART_TIME")]
    PartTime,
    #[serde(rename = "CONTRACT")]
    Contract,
    #[serde(rename = "INTERNSHIP")]
    Internship,
    #[serde(rename = "REMOTE")]
    Remote,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "FULL_TIME",
            JobType::PartTime => "PART_TIME",
            JobType::Contract => "CONTRACT",
            JobType::Internship => "INTERNSHIP",
            JobType::Remote => "REMOTE",
        }
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FULL_TIME" => Ok(JobType::FullTime),
            "PART_TIME" => Ok(JobType::PartTime),
            "CONTRACT" => Ok(JobType::Contract),
            "INTERNSHIP" => Ok(JobType::Internship),
            "REMOTE" => Ok(JobType::Remote),
            _ => Err(format!("Invalid job type: {}", s)),
        }
    }
}

impl_text_sql!(JobType);

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub posted_by: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub job_type: JobType,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub company_id: Uuid,
    pub posted_by: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub job_type: JobType,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = jobs)]
pub struct JobChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub job_type: Option<JobType>,
    pub salary_min: Option<Option<i32>>,
    pub salary_max: Option<Option<i32>>,
    pub is_active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn salary_order(min: Option<i32>, max: Option<i32>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => {
            let mut err = ValidationError::new("salary_range");
            err.message = Some("Minimum salary cannot exceed maximum salary".into());
            Err(err)
        },
        _ => Ok(()),
    }
}

fn validate_create_salary(req: &CreateJobRequest) -> Result<(), ValidationError> {
    salary_order(req.salary_min, req.salary_max)
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_salary"))]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Description is required"))]
    pub description: String,

    #[validate(length(max = 20000))]
    pub requirements: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[serde(default)]
    pub job_type: JobType,

    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary_min: Option<i32>,

    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary_max: Option<i32>,
}

impl CreateJobRequest {
    pub fn into_new_job(self, company_id: Uuid, posted_by: Uuid) -> NewJob {
        NewJob {
            company_id,
            posted_by,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            requirements: trim_optional_field(self.requirements.as_ref()),
            location: trim_optional_field(self.location.as_ref()),
            job_type: self.job_type,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            is_active: true,
        }
    }
}

fn validate_update_salary(req: &UpdateJobRequest) -> Result<(), ValidationError> {
    let negative = [req.salary_min, req.salary_max]
        .into_iter()
        .any(|bound| matches!(bound, Some(Some(v)) if v < 0));
    if negative {
        let mut err = ValidationError::new("range");
        err.message = Some("Salary cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

/// PUT /jobs/{id} body. `isActive: false` closes the posting.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_salary"))]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,

    #[validate(length(max = 20000))]
    pub requirements: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub job_type: Option<JobType>,

    /// `null` clears the bound
    #[serde(default, deserialize_with = "nullable")]
    pub salary_min: Option<Option<i32>>,

    #[serde(default, deserialize_with = "nullable")]
    pub salary_max: Option<Option<i32>>,

    pub is_active: Option<bool>,
}

impl UpdateJobRequest {
    /// Salary bounds after applying this update to `current`
    pub fn check_salary_against(&self, current: &Job) -> Result<(), ValidationError> {
        salary_order(
            self.salary_min.unwrap_or(current.salary_min),
            self.salary_max.unwrap_or(current.salary_max),
        )
    }

    pub fn into_changeset(self) -> JobChangeset {
        JobChangeset {
            title: trim_optional_field(self.title.as_ref()),
            description: trim_optional_field(self.description.as_ref()),
            requirements: clearable(self.requirements),
            location: clearable(self.location),
            job_type: self.job_type,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            is_active: self.is_active,
            updated_at: Some(Utc::now()),
        }
    }
}

/// `GET /jobs` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub company_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl JobFilter {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: Option<String>,
    pub posted_by: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub job_type: JobType,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobResponse {
    pub fn from_job(job: Job, company_name: Option<String>) -> Self {
        Self {
            id: job.id,
            company_id: job.company_id,
            company_name,
            posted_by: job.posted_by,
            title: job.title,
            description: job.description,
            requirements: job.requirements,
            location: job.location,
            job_type: job.job_type,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            is_active: job.is_active,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

type JobWithCompanyQuery<'a> = dsl::IntoBoxed<
    'a,
    dsl::Filter<dsl::InnerJoin<jobs::table, companies::table>, dsl::Eq<jobs::is_active, bool>>,
    Pg,
>;

/// Active jobs joined to their company, narrowed by the filter
fn active_jobs_query<'a>(filter: &JobFilter) -> JobWithCompanyQuery<'a> {
    let mut query = jobs::table
        .inner_join(companies::table)
        .filter(jobs::is_active.eq(true))
        .into_boxed();

    if let Some(pattern) = filter.search.as_deref().and_then(contains_pattern) {
        query = query.filter(jobs::title.ilike(pattern));
    }
    if let Some(pattern) = filter.location.as_deref().and_then(contains_pattern) {
        query = query.filter(jobs::location.ilike(pattern));
    }
    if let Some(job_type) = filter.job_type {
        query = query.filter(jobs::job_type.eq(job_type));
    }
    if let Some(company_id) = filter.company_id {
        query = query.filter(jobs::company_id.eq(company_id));
    }
    query
}

impl Job {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_job: NewJob,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(jobs::table)
            .values(&new_job)
            .returning(Job::as_returning())
            .get_result::<Job>(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        job_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        jobs::table
            .find(job_id)
            .select(Job::as_select())
            .first::<Job>(conn)
            .await
            .optional()
    }

    /// Job plus its company name
    pub async fn find_with_company(
        conn: &mut AsyncPgConnection,
        job_id: Uuid,
    ) -> Result<Option<(Self, String)>, diesel::result::Error> {
        jobs::table
            .inner_join(companies::table)
            .filter(jobs::id.eq(job_id))
            .select((Job::as_select(), companies::name))
            .first::<(Job, String)>(conn)
            .await
            .optional()
    }

    /// Newest first
    pub async fn search_active(
        conn: &mut AsyncPgConnection,
        filter: &JobFilter,
    ) -> Result<(Vec<(Self, String)>, i64), diesel::result::Error> {
        let page = filter.page_query();

        let total = active_jobs_query(filter)
            .count()
            .get_result::<i64>(conn)
            .await?;

        let items = active_jobs_query(filter)
            .order(jobs::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select((Job::as_select(), companies::name))
            .load::<(Job, String)>(conn)
            .await?;

        Ok((items, total))
    }

    /// All postings of a company, active or not, newest first
    pub async fn list_for_company(
        conn: &mut AsyncPgConnection,
        company: Uuid,
        page: &PageQuery,
    ) -> Result<(Vec<Self>, i64), diesel::result::Error> {
        let total = jobs::table
            .filter(jobs::company_id.eq(company))
            .count()
            .get_result::<i64>(conn)
            .await?;

        let items = jobs::table
            .filter(jobs::company_id.eq(company))
            .order(jobs::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(Job::as_select())
            .load::<Job>(conn)
            .await?;

        Ok((items, total))
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        job_id: Uuid,
        changes: &JobChangeset,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(jobs::table.find(job_id))
            .set(changes)
            .returning(Job::as_returning())
            .get_result::<Job>(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        job_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(jobs::table.find(job_id)).execute(conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateJobRequest {
        CreateJobRequest {
            title: " Rust Engineer ".to_string(),
            description: "Build services".to_string(),
            requirements: Some("".to_string()),
            location: Some("Berlin".to_string()),
            job_type: JobType::Remote,
            salary_min: Some(60_000),
            salary_max: Some(90_000),
        }
    }

    #[test]
    fn test_job_type_wire_names() {
        assert_eq!(JobType::from_str("PART_TIME").unwrap(), JobType::PartTime);
        assert_eq!(JobType::Internship.as_str(), "INTERNSHIP");
        assert!(JobType::from_str("GIG").is_err());
        assert_eq!(JobType::default(), JobType::FullTime);

        let parsed: JobType = serde_json::from_str("\"CONTRACT\"").unwrap();
        assert_eq!(parsed, JobType::Contract);
    }

    #[test]
    fn test_salary_range_validation() {
        assert!(create_request().validate().is_ok());

        let inverted = CreateJobRequest {
            salary_min: Some(100_000),
            salary_max: Some(50_000),
            ..create_request()
        };
        assert!(inverted.validate().is_err());

        let negative = CreateJobRequest {
            salary_min: Some(-1),
            salary_max: None,
            ..create_request()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_update_can_clear_salary() {
        let absent: UpdateJobRequest =
            serde_json::from_value(serde_json::json!({"title": "Lead"})).unwrap();
        assert_eq!(absent.salary_min, None);
        assert_eq!(absent.clone().into_changeset().salary_min, None);

        let cleared: UpdateJobRequest =
            serde_json::from_value(serde_json::json!({"salaryMin": null, "salaryMax": 120000}))
                .unwrap();
        let changeset = cleared.into_changeset();
        assert_eq!(changeset.salary_min, Some(None));
        assert_eq!(changeset.salary_max, Some(Some(120_000)));
    }

    #[test]
    fn test_update_salary_checks_merge_with_current() {
        let now = Utc::now();
        let current = Job {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            posted_by: Uuid::new_v4(),
            title: "Rust Engineer".to_string(),
            description: "Build services".to_string(),
            requirements: None,
            location: None,
            job_type: JobType::FullTime,
            salary_min: Some(60_000),
            salary_max: Some(90_000),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let below_min = UpdateJobRequest {
            salary_max: Some(Some(50_000)),
            ..Default::default()
        };
        assert!(below_min.check_salary_against(&current).is_err());

        let clear_min = UpdateJobRequest {
            salary_min: Some(None),
            salary_max: Some(Some(50_000)),
            ..Default::default()
        };
        assert!(clear_min.check_salary_against(&current).is_ok());

        let negative = UpdateJobRequest {
            salary_min: Some(Some(-5)),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
        assert!(UpdateJobRequest::default().validate().is_ok());
    }

    #[test]
    fn test_new_job_is_active_and_trimmed() {
        let job = create_request().into_new_job(Uuid::new_v4(), Uuid::new_v4());
        assert!(job.is_active);
        assert_eq!(job.title, "Rust Engineer");
        assert_eq!(job.requirements, None);
    }

    #[test]
    fn test_filter_deserializes_camel_case() {
        let filter: JobFilter =
            serde_json::from_value(serde_json::json!({"jobType": "REMOTE", "limit": 500}))
                .unwrap();
        assert_eq!(filter.job_type, Some(JobType::Remote));
        assert_eq!(filter.page_query().limit(), 50);
        assert_eq!(filter.page_query().page(), 1);
    }
}
