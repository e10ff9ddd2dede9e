// Services module for the job board backend
// Business logic layer between the HTTP handlers and the Diesel models

pub mod application;
pub mod auth;
pub mod background_tasks;
pub mod company;
pub mod dashboard;
pub mod email;
pub mod jwt;
pub mod job;
pub mod profile;
pub mod saved_job;

// Re-export commonly used services
pub use application::ApplicationService;
pub use auth::{AuthService, AuthSettings};
pub use background_tasks::{run_token_cleanup, spawn_token_cleanup, CleanupReport};
pub use company::CompanyService;
pub use dashboard::DashboardService;
pub use email::{EmailError, EmailService};
pub use job::JobService;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use profile::ProfileService;
pub use saved_job::SavedJobService;

use uuid::Uuid;

use crate::models::{AuthenticatedUser, UserRole};
use crate::utils::ServiceError;

/// 403 unless the caller holds `role`
pub(crate) fn require_role(user: &AuthenticatedUser, role: UserRole) -> Result<(), ServiceError> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "This action requires the {} role",
            role
        )))
    }
}

/// 403 unless the caller owns the resource or is an admin
pub(crate) fn ensure_owner_or_admin(
    user: &AuthenticatedUser,
    owner_id: Uuid,
    resource: &str,
) -> Result<(), ServiceError> {
    if user.user_id == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "You do not have permission to modify this {}",
            resource
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "caller@x.com".to_string(),
            role,
            token_id: "jti".to_string(),
            exp: 0,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&caller(UserRole::Employer), UserRole::Employer).is_ok());
        let err = require_role(&caller(UserRole::JobSeeker), UserRole::Employer).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(err.to_string().contains("EMPLOYER"));
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = caller(UserRole::Employer);
        assert!(ensure_owner_or_admin(&owner, owner.user_id, "job").is_ok());
        assert!(ensure_owner_or_admin(&caller(UserRole::Admin), owner.user_id, "job").is_ok());
        assert!(matches!(
            ensure_owner_or_admin(&caller(UserRole::Employer), owner.user_id, "job"),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
