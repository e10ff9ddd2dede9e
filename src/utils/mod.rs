// Utility modules for the job board backend

pub mod api_response;
pub mod auth_errors;
pub mod password;
pub mod service_error;
pub mod tokens;
pub mod validation;

pub use api_response::{ApiErrorBody, ApiResponse};
pub use auth_errors::{log_auth_failure, AuthError};
pub use password::{check_password_strength, hash_password, verify_password, PasswordError};
pub use service_error::ServiceError;
pub use validation::{clearable, nullable, trim_optional_field};
