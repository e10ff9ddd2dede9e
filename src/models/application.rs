// Job application Database Model

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::pagination::PageQuery;
use crate::schema::{applications, companies, jobs};
use crate::utils::validation::{trim_optional_field, validate_http_url};

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
pub enum ApplicationStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "REVIEWING")]
    Reviewing,
    #[serde(rename = "INTERVIEW")]
    Interview,
    #[serde(rename = "OFFERED")]
    Offered,
    #[serde(rename = "REJECTED")]
    Rejected,
    #[serde(rename = "WITHDRAWN")]
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Reviewing => "REVIEWING",
            ApplicationStatus::Interview => "INTERVIEW",
            ApplicationStatus::Offered => "OFFERED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
        }
    }

    /// Statuses an employer may set. Withdrawal belongs to the applicant.
    pub fn is_employer_settable(&self) -> bool {
        !matches!(self, ApplicationStatus::Withdrawn)
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "REVIEWING" => Ok(ApplicationStatus::Reviewing),
            "INTERVIEW" => Ok(ApplicationStatus::Interview),
            "OFFERED" => Ok(ApplicationStatus::Offered),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            "WITHDRAWN" => Ok(ApplicationStatus::Withdrawn),
            _ => Err(format!("Invalid application status: {}", s)),
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_text_sql!(ApplicationStatus);

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = applications)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

/// POST /jobs/{id}/apply body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[validate(length(max = 10000, message = "Cover letter must be less than 10000 characters"))]
    pub cover_letter: Option<String>,

    #[validate(length(max = 2048), custom = "validate_http_url")]
    pub resume_url: Option<String>,
}

impl ApplyRequest {
    /// Falls back to the profile resume when none is attached
    pub fn into_new_application(
        self,
        job_id: Uuid,
        applicant_id: Uuid,
        profile_resume: Option<String>,
    ) -> NewApplication {
        NewApplication {
            job_id,
            applicant_id,
            status: ApplicationStatus::Pending,
            cover_letter: trim_optional_field(self.cover_letter.as_ref()),
            resume_url: trim_optional_field(self.resume_url.as_ref()).or(profile_resume),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            applicant_id: a.applicant_id,
            status: a.status,
            cover_letter: a.cover_letter,
            resume_url: a.resume_url,
            job_title: None,
            company_name: None,
            applicant_name: None,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl ApplicationResponse {
    pub fn with_job(mut self, job_title: String, company_name: String) -> Self {
        self.job_title = Some(job_title);
        self.company_name = Some(company_name);
        self
    }

    pub fn with_applicant(mut self, applicant_name: Option<String>) -> Self {
        self.applicant_name = applicant_name;
        self
    }
}

impl Application {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_application: NewApplication,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(applications::table)
            .values(&new_application)
            .returning(Application::as_returning())
            .get_result::<Application>(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        application_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        applications::table
            .find(application_id)
            .select(Application::as_select())
            .first::<Application>(conn)
            .await
            .optional()
    }

    /// An applicant's applications with job title and company name, newest first
    pub async fn list_for_applicant(
        conn: &mut AsyncPgConnection,
        applicant: Uuid,
        page: &PageQuery,
    ) -> Result<(Vec<(Self, String, String)>, i64), diesel::result::Error> {
        let total = applications::table
            .filter(applications::applicant_id.eq(applicant))
            .count()
            .get_result::<i64>(conn)
            .await?;

        let items = applications::table
            .inner_join(jobs::table.inner_join(companies::table))
            .filter(applications::applicant_id.eq(applicant))
            .order(applications::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select((Application::as_select(), jobs::title, companies::name))
            .load::<(Application, String, String)>(conn)
            .await?;

        Ok((items, total))
    }

    /// Applications received for one job, newest first
    pub async fn list_for_job(
        conn: &mut AsyncPgConnection,
        job: Uuid,
        page: &PageQuery,
    ) -> Result<(Vec<Self>, i64), diesel::result::Error> {
        let total = applications::table
            .filter(applications::job_id.eq(job))
            .count()
            .get_result::<i64>(conn)
            .await?;

        let items = applications::table
            .filter(applications::job_id.eq(job))
            .order(applications::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(Application::as_select())
            .load::<Application>(conn)
            .await?;

        Ok((items, total))
    }

    pub async fn update_status(
        conn: &mut AsyncPgConnection,
        application_id: Uuid,
        new_status: ApplicationStatus,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(applications::table.find(application_id))
            .set((
                applications::status.eq(new_status),
                applications::updated_at.eq(Utc::now()),
            ))
            .returning(Application::as_returning())
            .get_result::<Application>(conn)
            .await
    }

    pub async fn count_all(conn: &mut AsyncPgConnection) -> Result<i64, diesel::result::Error> {
        applications::table.count().get_result::<i64>(conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(ApplicationStatus::from_str("HIRED").is_err());

        let json = serde_json::to_value(ApplicationStatus::Interview).unwrap();
        assert_eq!(json, "INTERVIEW");
    }

    #[test]
    fn test_employer_cannot_withdraw() {
        assert!(ApplicationStatus::Reviewing.is_employer_settable());
        assert!(!ApplicationStatus::Withdrawn.is_employer_settable());
    }

    #[test]
    fn test_apply_falls_back_to_profile_resume() {
        let job_id = Uuid::new_v4();
        let applicant = Uuid::new_v4();

        let from_profile = ApplyRequest {
            cover_letter: Some("  Hello ".to_string()),
            resume_url: None,
        }
        .into_new_application(job_id, applicant, Some("https://cv.example/me.pdf".into()));
        assert_eq!(from_profile.status, ApplicationStatus::Pending);
        assert_eq!(from_profile.cover_letter.as_deref(), Some("Hello"));
        assert_eq!(
            from_profile.resume_url.as_deref(),
            Some("https://cv.example/me.pdf")
        );

        let explicit = ApplyRequest {
            cover_letter: None,
            resume_url: Some("https://cv.example/other.pdf".to_string()),
        }
        .into_new_application(job_id, applicant, Some("https://cv.example/me.pdf".into()));
        assert_eq!(
            explicit.resume_url.as_deref(),
            Some("https://cv.example/other.pdf")
        );
    }

    #[test]
    fn test_response_omits_missing_joins() {
        let now = Utc::now();
        let app = Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            applicant_id: Uuid::new_v4(),
            status: ApplicationStatus::Pending,
            cover_letter: None,
            resume_url: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(ApplicationResponse::from(app)).unwrap();
        assert!(json.get("jobTitle").is_none());
        assert_eq!(json["status"], "PENDING");
    }
}
