// Role-specific dashboard aggregation
// Read-only queries shaped into explicit view models. No caching; every list has a fixed cap.

use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

use super::require_role;
use crate::db::DieselPool;
use crate::models::{
    Application, ApplicationStatus, AuthenticatedUser, Company, CompanyResponse, Job, JobType,
    Profile, SavedJob, UserRole,
};
use crate::schema::{applications, companies, jobs, saved_jobs, users};
use crate::utils::ServiceError;

/// Entries shown in each "recent" list
pub const RECENT_LIMIT: i64 = 5;
/// Rows pulled per source when building the activity feed
pub const ACTIVITY_SOURCE_LIMIT: i64 = 10;
/// Entries kept in the merged feed
pub const ACTIVITY_LIMIT: usize = 10;
/// Company profiles at or above this ratio count as complete
pub const COMPANY_COMPLETE_RATIO: f64 = 0.8;

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerStats {
    pub total_applications: i64,
    pub pending_applications: i64,
    pub reviewing_applications: i64,
    pub interview_applications: i64,
    pub offered_applications: i64,
    pub rejected_applications: i64,
    pub withdrawn_applications: i64,
    pub saved_jobs: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSavedJob {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub job_type: JobType,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedJob {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub job_type: JobType,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    ApplicationSubmitted,
    JobSaved,
    ApplicationReceived,
    JobPosted,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCompletion {
    pub percentage: u32,
    pub missing_fields: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerDashboard {
    pub stats: JobSeekerStats,
    pub recent_applications: Vec<RecentApplication>,
    pub saved_jobs: Vec<RecentSavedJob>,
    pub recommended_jobs: Vec<RecommendedJob>,
    pub recent_activity: Vec<ActivityItem>,
    pub profile_completion: ProfileCompletion,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerStats {
    pub active_jobs: i64,
    pub total_applications: i64,
    pub reviewing_applications: i64,
    pub interview_invitations: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub applicant_id: Uuid,
    pub applicant_name: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerJob {
    pub id: Uuid,
    pub title: String,
    pub job_type: JobType,
    pub is_active: bool,
    pub application_count: i64,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCompletion {
    pub completed_fields: usize,
    pub total_fields: usize,
    pub ratio: f64,
    pub is_complete: bool,
    pub missing_fields: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerDashboard {
    pub company: Option<CompanyResponse>,
    pub stats: EmployerStats,
    pub recent_applications: Vec<EmployerApplication>,
    pub recent_jobs: Vec<EmployerJob>,
    pub recent_activity: Vec<ActivityItem>,
    pub company_completion: Option<CompanyCompletion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub total_users: i64,
    pub job_seekers: i64,
    pub employers: i64,
    pub admins: i64,
    pub companies: i64,
    pub jobs: i64,
    pub active_jobs: i64,
    pub applications: i64,
}

// ---------------------------------------------------------------------------
// Pure aggregation
// ---------------------------------------------------------------------------

/// Weighted profile checks; the weights add up to 100
pub fn profile_completion(profile: Option<&Profile>) -> ProfileCompletion {
    let Some(p) = profile else {
        return ProfileCompletion {
            percentage: 0,
            missing_fields: PROFILE_WEIGHTS.iter().map(|(name, _)| *name).collect(),
        };
    };

    let filled = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
    let checks = [
        !p.full_name.trim().is_empty(),
        filled(&p.headline),
        filled(&p.bio),
        filled(&p.location),
        filled(&p.phone),
        !p.skills.is_empty(),
        filled(&p.resume_url),
        filled(&p.avatar_url),
    ];

    let mut percentage: u32 = 0;
    let mut missing_fields = Vec::new();
    for ((name, weight), done) in PROFILE_WEIGHTS.iter().zip(checks) {
        if done {
            percentage += *weight;
        } else {
            missing_fields.push(*name);
        }
    }

    ProfileCompletion {
        percentage,
        missing_fields,
    }
}

const PROFILE_WEIGHTS: [(&str, u32); 8] = [
    ("fullName", 15),
    ("headline", 10),
    ("bio", 15),
    ("location", 10),
    ("phone", 10),
    ("skills", 20),
    ("resumeUrl", 15),
    ("avatarUrl", 5),
];

/// Completed / required company fields
pub fn company_completion(company: &Company) -> CompanyCompletion {
    let filled = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
    let checks: [(&'static str, bool); 8] = [
        ("name", !company.name.trim().is_empty()),
        ("description", filled(&company.description)),
        ("website", filled(&company.website)),
        ("industry", filled(&company.industry)),
        ("size", filled(&company.size)),
        ("location", filled(&company.location)),
        ("logoUrl", filled(&company.logo_url)),
        ("foundedYear", company.founded_year.is_some()),
    ];

    let total_fields = checks.len();
    let completed_fields = checks.iter().filter(|(_, done)| *done).count();
    let ratio = completed_fields as f64 / total_fields as f64;

    CompanyCompletion {
        completed_fields,
        total_fields,
        ratio,
        is_complete: ratio >= COMPANY_COMPLETE_RATIO,
        missing_fields: checks
            .iter()
            .filter(|(_, done)| !*done)
            .map(|(name, _)| *name)
            .collect(),
    }
}

pub fn jobseeker_stats(statuses: &[ApplicationStatus], saved_jobs: i64) -> JobSeekerStats {
    let mut stats = JobSeekerStats {
        total_applications: statuses.len() as i64,
        saved_jobs,
        ..Default::default()
    };
    for status in statuses {
        let slot = match status {
            ApplicationStatus::Pending => &mut stats.pending_applications,
            ApplicationStatus::Reviewing => &mut stats.reviewing_applications,
            ApplicationStatus::Interview => &mut stats.interview_applications,
            ApplicationStatus::Offered => &mut stats.offered_applications,
            ApplicationStatus::Rejected => &mut stats.rejected_applications,
            ApplicationStatus::Withdrawn => &mut stats.withdrawn_applications,
        };
        *slot += 1;
    }
    stats
}

pub fn employer_stats(active_jobs: i64, statuses: &[ApplicationStatus]) -> EmployerStats {
    EmployerStats {
        active_jobs,
        total_applications: statuses.len() as i64,
        reviewing_applications: statuses
            .iter()
            .filter(|s| **s == ApplicationStatus::Reviewing)
            .count() as i64,
        interview_invitations: statuses
            .iter()
            .filter(|s| **s == ApplicationStatus::Interview)
            .count() as i64,
    }
}

/// Interleave two feeds newest first, keeping `ACTIVITY_LIMIT` entries
pub fn merge_activity(first: Vec<ActivityItem>, second: Vec<ActivityItem>) -> Vec<ActivityItem> {
    let mut merged: Vec<ActivityItem> = first.into_iter().chain(second).collect();
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    merged.truncate(ACTIVITY_LIMIT);
    merged
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct DashboardService {
    pool: DieselPool,
}

impl DashboardService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn jobseeker(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<JobSeekerDashboard, ServiceError> {
        require_role(user, UserRole::JobSeeker)?;
        let mut conn = self.pool.get().await?;
        let uid = user.user_id;

        let statuses = applications::table
            .filter(applications::applicant_id.eq(uid))
            .select(applications::status)
            .load::<ApplicationStatus>(&mut conn)
            .await?;
        let saved_count = saved_jobs::table
            .filter(saved_jobs::user_id.eq(uid))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let applied = applications::table
            .inner_join(jobs::table.inner_join(companies::table))
            .filter(applications::applicant_id.eq(uid))
            .order(applications::created_at.desc())
            .limit(ACTIVITY_SOURCE_LIMIT)
            .select((Application::as_select(), jobs::title, companies::name))
            .load::<(Application, String, String)>(&mut conn)
            .await?;

        let saved = saved_jobs::table
            .inner_join(jobs::table.inner_join(companies::table))
            .filter(saved_jobs::user_id.eq(uid))
            .order(saved_jobs::created_at.desc())
            .limit(ACTIVITY_SOURCE_LIMIT)
            .select((SavedJob::as_select(), Job::as_select(), companies::name))
            .load::<(SavedJob, Job, String)>(&mut conn)
            .await?;

        let applied_job_ids = applications::table
            .filter(applications::applicant_id.eq(uid))
            .select(applications::job_id)
            .load::<Uuid>(&mut conn)
            .await?;

        let recommended = jobs::table
            .inner_join(companies::table)
            .filter(jobs::is_active.eq(true))
            .filter(jobs::id.ne_all(applied_job_ids))
            .order(jobs::created_at.desc())
            .limit(RECENT_LIMIT)
            .select((Job::as_select(), companies::name))
            .load::<(Job, String)>(&mut conn)
            .await?;

        let profile = Profile::find_by_user(&mut conn, uid).await?;

        let application_activity = applied
            .iter()
            .map(|(a, title, company)| ActivityItem {
                kind: ActivityKind::ApplicationSubmitted,
                title: format!("Applied to {}", title),
                description: format!("{} ({})", company, a.status),
                timestamp: a.created_at,
            })
            .collect();
        let saved_activity = saved
            .iter()
            .map(|(s, job, company)| ActivityItem {
                kind: ActivityKind::JobSaved,
                title: format!("Saved {}", job.title),
                description: company.clone(),
                timestamp: s.created_at,
            })
            .collect();

        Ok(JobSeekerDashboard {
            stats: jobseeker_stats(&statuses, saved_count),
            recent_activity: merge_activity(application_activity, saved_activity),
            recent_applications: applied
                .into_iter()
                .take(RECENT_LIMIT as usize)
                .map(|(a, job_title, company_name)| RecentApplication {
                    id: a.id,
                    job_id: a.job_id,
                    job_title,
                    company_name,
                    status: a.status,
                    applied_at: a.created_at,
                })
                .collect(),
            saved_jobs: saved
                .into_iter()
                .take(RECENT_LIMIT as usize)
                .map(|(s, job, company_name)| RecentSavedJob {
                    id: s.id,
                    job_id: job.id,
                    job_title: job.title,
                    company_name,
                    location: job.location,
                    job_type: job.job_type,
                    saved_at: s.created_at,
                })
                .collect(),
            recommended_jobs: recommended
                .into_iter()
                .map(|(job, company_name)| RecommendedJob {
                    id: job.id,
                    title: job.title,
                    company_name,
                    location: job.location,
                    job_type: job.job_type,
                    salary_min: job.salary_min,
                    salary_max: job.salary_max,
                    posted_at: job.created_at,
                })
                .collect(),
            profile_completion: profile_completion(profile.as_ref()),
        })
    }

    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn employer(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<EmployerDashboard, ServiceError> {
        require_role(user, UserRole::Employer)?;
        let mut conn = self.pool.get().await?;

        let Some(company) = Company::find_by_owner(&mut conn, user.user_id).await? else {
            return Ok(EmployerDashboard {
                company: None,
                stats: EmployerStats::default(),
                recent_applications: Vec::new(),
                recent_jobs: Vec::new(),
                recent_activity: Vec::new(),
                company_completion: None,
            });
        };

        let active_jobs = jobs::table
            .filter(jobs::company_id.eq(company.id))
            .filter(jobs::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let statuses = applications::table
            .inner_join(jobs::table)
            .filter(jobs::company_id.eq(company.id))
            .select(applications::status)
            .load::<ApplicationStatus>(&mut conn)
            .await?;

        let received = applications::table
            .inner_join(jobs::table)
            .filter(jobs::company_id.eq(company.id))
            .order(applications::created_at.desc())
            .limit(ACTIVITY_SOURCE_LIMIT)
            .select((Application::as_select(), jobs::title))
            .load::<(Application, String)>(&mut conn)
            .await?;

        let posted = jobs::table
            .filter(jobs::company_id.eq(company.id))
            .order(jobs::created_at.desc())
            .limit(ACTIVITY_SOURCE_LIMIT)
            .select(Job::as_select())
            .load::<Job>(&mut conn)
            .await?;

        let applicant_ids: Vec<Uuid> = received.iter().map(|(a, _)| a.applicant_id).collect();
        let names = Profile::full_names(&mut conn, &applicant_ids).await?;
        let counts = application_counts(&mut conn, posted.iter().map(|j| j.id).collect()).await?;

        let received_activity = received
            .iter()
            .map(|(a, title)| ActivityItem {
                kind: ActivityKind::ApplicationReceived,
                title: format!("New application for {}", title),
                description: names
                    .get(&a.applicant_id)
                    .cloned()
                    .unwrap_or_else(|| "A candidate".to_string()),
                timestamp: a.created_at,
            })
            .collect();
        let posted_activity = posted
            .iter()
            .map(|job| ActivityItem {
                kind: ActivityKind::JobPosted,
                title: format!("Posted {}", job.title),
                description: job.job_type.as_str().to_string(),
                timestamp: job.created_at,
            })
            .collect();

        Ok(EmployerDashboard {
            stats: employer_stats(active_jobs, &statuses),
            recent_activity: merge_activity(received_activity, posted_activity),
            recent_applications: received
                .into_iter()
                .take(RECENT_LIMIT as usize)
                .map(|(a, job_title)| EmployerApplication {
                    id: a.id,
                    job_id: a.job_id,
                    job_title,
                    applicant_id: a.applicant_id,
                    applicant_name: names.get(&a.applicant_id).cloned(),
                    status: a.status,
                    applied_at: a.created_at,
                })
                .collect(),
            recent_jobs: posted
                .into_iter()
                .take(RECENT_LIMIT as usize)
                .map(|job| EmployerJob {
                    application_count: counts.get(&job.id).copied().unwrap_or(0),
                    id: job.id,
                    title: job.title,
                    job_type: job.job_type,
                    is_active: job.is_active,
                    posted_at: job.created_at,
                })
                .collect(),
            company_completion: Some(company_completion(&company)),
            company: Some(company.into()),
        })
    }

    #[instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn admin(&self, user: &AuthenticatedUser) -> Result<AdminDashboard, ServiceError> {
        require_role(user, UserRole::Admin)?;
        let mut conn = self.pool.get().await?;

        let per_role = users::table
            .group_by(users::role)
            .select((users::role, count_star()))
            .load::<(UserRole, i64)>(&mut conn)
            .await?;
        let role_count = |role: UserRole| {
            per_role
                .iter()
                .find(|(r, _)| *r == role)
                .map(|(_, n)| *n)
                .unwrap_or(0)
        };

        let total_jobs = jobs::table.count().get_result::<i64>(&mut conn).await?;
        let active_jobs = jobs::table
            .filter(jobs::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(AdminDashboard {
            total_users: per_role.iter().map(|(_, n)| n).sum(),
            job_seekers: role_count(UserRole::JobSeeker),
            employers: role_count(UserRole::Employer),
            admins: role_count(UserRole::Admin),
            companies: Company::count_all(&mut conn).await?,
            jobs: total_jobs,
            active_jobs,
            applications: Application::count_all(&mut conn).await?,
        })
    }
}

async fn application_counts(
    conn: &mut AsyncPgConnection,
    job_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, i64>, diesel::result::Error> {
    if job_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = applications::table
        .filter(applications::job_id.eq_any(job_ids))
        .group_by(applications::job_id)
        .select((applications::job_id, count_star()))
        .load::<(Uuid, i64)>(conn)
        .await?;

    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile() -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: "Ann Lee".to_string(),
            headline: None,
            bio: None,
            location: None,
            phone: None,
            skills: vec![],
            resume_url: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn company() -> Company {
        let now = Utc::now();
        Company {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Acme".to_string(),
            description: Some("Rockets".to_string()),
            website: Some("https://acme.example".to_string()),
            industry: Some("Aerospace".to_string()),
            size: Some("11-50".to_string()),
            location: Some("Berlin".to_string()),
            logo_url: None,
            founded_year: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn activity(kind: ActivityKind, minutes_ago: i64) -> ActivityItem {
        ActivityItem {
            kind,
            title: format!("{:?} {}", kind, minutes_ago),
            description: String::new(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_profile_weights_sum_to_hundred() {
        let total: u32 = PROFILE_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_profile_completion_weighting() {
        let mut p = profile();
        let partial = profile_completion(Some(&p));
        assert_eq!(partial.percentage, 15);
        assert!(partial.missing_fields.contains(&"skills"));

        p.skills = vec!["rust".to_string()];
        p.resume_url = Some("https://cv.example/ann.pdf".to_string());
        p.bio = Some("   ".to_string());
        assert_eq!(profile_completion(Some(&p)).percentage, 50);

        p.headline = Some("Engineer".into());
        p.bio = Some("Builds things".into());
        p.location = Some("Berlin".into());
        p.phone = Some("+49".into());
        p.avatar_url = Some("https://img.example/a.png".into());
        let full = profile_completion(Some(&p));
        assert_eq!(full.percentage, 100);
        assert!(full.missing_fields.is_empty());
    }

    #[test]
    fn test_missing_profile_is_zero() {
        let none = profile_completion(None);
        assert_eq!(none.percentage, 0);
        assert_eq!(none.missing_fields.len(), 8);
    }

    #[test]
    fn test_company_completion_threshold() {
        let mut c = company();
        let six_of_eight = company_completion(&c);
        assert_eq!(six_of_eight.completed_fields, 6);
        assert_eq!(six_of_eight.total_fields, 8);
        assert!(!six_of_eight.is_complete);
        assert_eq!(six_of_eight.missing_fields, vec!["logoUrl", "foundedYear"]);

        c.founded_year = Some(2001);
        let seven_of_eight = company_completion(&c);
        assert!(seven_of_eight.is_complete);
        assert!((seven_of_eight.ratio - 0.875).abs() < f64::EPSILON);
    }

    #[test]
    fn test_employer_stats_counts() {
        use ApplicationStatus::*;
        let statuses = [Reviewing, Pending, Interview, Reviewing, Rejected];
        let stats = employer_stats(3, &statuses);
        assert_eq!(
            stats,
            EmployerStats {
                active_jobs: 3,
                total_applications: 5,
                reviewing_applications: 2,
                interview_invitations: 1,
            }
        );
    }

    #[test]
    fn test_jobseeker_stats_counts() {
        use ApplicationStatus::*;
        let stats = jobseeker_stats(&[Pending, Pending, Offered, Withdrawn], 7);
        assert_eq!(stats.total_applications, 4);
        assert_eq!(stats.pending_applications, 2);
        assert_eq!(stats.offered_applications, 1);
        assert_eq!(stats.withdrawn_applications, 1);
        assert_eq!(stats.reviewing_applications, 0);
        assert_eq!(stats.saved_jobs, 7);
    }

    #[test]
    fn test_merge_activity_sorts_and_caps() {
        let applications: Vec<_> = (0..10)
            .map(|i| activity(ActivityKind::ApplicationSubmitted, i * 2))
            .collect();
        let saved: Vec<_> = (0..10)
            .map(|i| activity(ActivityKind::JobSaved, i * 2 + 1))
            .collect();

        let merged = merge_activity(applications, saved);
        assert_eq!(merged.len(), ACTIVITY_LIMIT);
        assert!(merged.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(merged[0].kind, ActivityKind::ApplicationSubmitted);
        assert_eq!(merged[1].kind, ActivityKind::JobSaved);
    }

    #[test]
    fn test_merge_activity_short_feeds() {
        let merged = merge_activity(vec![activity(ActivityKind::JobPosted, 5)], vec![]);
        assert_eq!(merged.len(), 1);
        assert!(merge_activity(vec![], vec![]).is_empty());
    }

    #[test]
    fn test_activity_kind_wire_name() {
        let json = serde_json::to_value(ActivityKind::ApplicationReceived).unwrap();
        assert_eq!(json, "APPLICATION_RECEIVED");
    }
}
