// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::DieselPool,
    services::{
        ApplicationService, AuthService, AuthSettings, CompanyService, DashboardService,
        EmailService, JobService, JwtConfig, JwtService, ProfileService, SavedJobService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub jwt_service: Arc<JwtService>,
    pub email_service: Arc<EmailService>,
    pub auth_service: Arc<AuthService>,
    pub company_service: Arc<CompanyService>,
    pub job_service: Arc<JobService>,
    pub application_service: Arc<ApplicationService>,
    pub saved_job_service: Arc<SavedJobService>,
    pub profile_service: Arc<ProfileService>,
    pub dashboard_service: Arc<DashboardService>,
    pub max_connections: u32,
}

impl AppState {
    /// Wire every service onto one pool. The email service is passed in so callers
    /// choose the transport.
    pub fn new(config: Arc<AppConfig>, diesel_pool: DieselPool, email_service: EmailService) -> Self {
        let jwt_service = Arc::new(JwtService::new(JwtConfig::from_settings(&config.jwt)));
        let email_service = Arc::new(email_service);

        let auth_service = Arc::new(AuthService::new(
            diesel_pool.clone(),
            jwt_service.clone(),
            email_service.clone(),
            AuthSettings::from_security(&config.security),
        ));

        Self {
            max_connections: config.database.max_connections,
            jwt_service,
            email_service,
            auth_service,
            company_service: Arc::new(CompanyService::new(diesel_pool.clone())),
            job_service: Arc::new(JobService::new(diesel_pool.clone())),
            application_service: Arc::new(ApplicationService::new(diesel_pool.clone())),
            saved_job_service: Arc::new(SavedJobService::new(diesel_pool.clone())),
            profile_service: Arc::new(ProfileService::new(diesel_pool.clone())),
            dashboard_service: Arc::new(DashboardService::new(diesel_pool.clone())),
            diesel_pool,
            config,
        }
    }
}
