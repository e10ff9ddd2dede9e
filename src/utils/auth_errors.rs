// Authentication-specific error handling utilities

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use thiserror::Error;

use crate::db::PoolError;
use crate::models::{RefreshTokenError, UserError};
use crate::services::email::EmailError;
use crate::services::jwt::JwtError;
use crate::utils::api_response::ApiErrorBody;
use crate::utils::password::PasswordError;
use crate::utils::validation::describe_validation_errors;

/// Authentication-specific errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    ValidationError(String),

    #[error("No token provided")]
    MissingToken,

    #[error("Email not Found")]
    EmailNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please verify your email before signing in")]
    EmailNotVerified,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Token generation failed: {0}")]
    TokenError(String),

    #[error("Email delivery failed: {0}")]
    EmailError(String),

    #[error("Internal server error")]
    InternalError,
}

impl AuthError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_)
            | AuthError::MissingToken
            | AuthError::InvalidVerificationToken
            | AuthError::InvalidResetToken => StatusCode::BAD_REQUEST,
            AuthError::EmailNotFound
            | AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::InvalidRefreshToken
            | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::EmailNotVerified => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::DatabaseError(_)
            | AuthError::TokenError(_)
            | AuthError::EmailError(_)
            | AuthError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::ValidationError(_) => "VALIDATION_ERROR",
            AuthError::MissingToken => "NO_TOKEN",
            AuthError::EmailNotFound => "EMAIL_NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            AuthError::EmailTaken => "EMAIL_TAKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenRevoked => "TOKEN_REVOKED",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::InvalidVerificationToken => "INVALID_VERIFICATION_TOKEN",
            AuthError::InvalidResetToken => "INVALID_RESET_TOKEN",
            AuthError::WrongPassword => "WRONG_PASSWORD",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::DatabaseError(_) => "DATABASE_ERROR",
            AuthError::TokenError(_) => "TOKEN_ERROR",
            AuthError::EmailError(_) => "EMAIL_ERROR",
            AuthError::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Message sent to the client. Server faults never leak their detail.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Auth request failed");
        }

        let body = ApiErrorBody::new(self.error_code(), self.public_message());
        (status, Json(body)).into_response()
    }
}

impl From<diesel::result::Error> for AuthError {
    fn from(error: diesel::result::Error) -> Self {
        AuthError::DatabaseError(error.to_string())
    }
}

impl From<PoolError> for AuthError {
    fn from(error: PoolError) -> Self {
        AuthError::DatabaseError(format!("connection pool: {}", error))
    }
}

impl From<UserError> for AuthError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound => AuthError::UserNotFound,
            UserError::EmailTaken => AuthError::EmailTaken,
            UserError::Database(e) => AuthError::DatabaseError(e.to_string()),
        }
    }
}

impl From<RefreshTokenError> for AuthError {
    fn from(error: RefreshTokenError) -> Self {
        match error {
            RefreshTokenError::NotFound => AuthError::InvalidRefreshToken,
            RefreshTokenError::Database(e) => AuthError::DatabaseError(e.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(error: PasswordError) -> Self {
        match error {
            PasswordError::TooShort(_) | PasswordError::TooWeak => {
                AuthError::ValidationError(error.to_string())
            },
            PasswordError::HashingError(_) | PasswordError::VerificationError(_) => {
                tracing::error!(error = %error, "Password hashing failure");
                AuthError::InternalError
            },
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(error: JwtError) -> Self {
        match error {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::InvalidToken(_) | JwtError::InvalidClaims(_) => AuthError::InvalidToken,
            JwtError::TokenCreation(msg) => AuthError::TokenError(msg),
        }
    }
}

impl From<EmailError> for AuthError {
    fn from(error: EmailError) -> Self {
        AuthError::EmailError(error.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(describe_validation_errors(&errors))
    }
}

/// Structured warn event for a rejected authentication attempt
pub fn log_auth_failure(user_email: &str, error: &AuthError) {
    tracing::warn!(
        email = user_email,
        error_code = error.error_code(),
        "Authentication failure"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::EmailNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::EmailNotVerified.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidResetToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::TokenRevoked.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_messages() {
        assert_eq!(AuthError::EmailNotFound.to_string(), "Email not Found");
        assert_eq!(AuthError::MissingToken.to_string(), "No token provided");
        assert_eq!(AuthError::TokenExpired.to_string(), "Token expired");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AuthError::DatabaseError("relation users does not exist".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(
            AuthError::ValidationError("email: invalid".into()).public_message(),
            "email: invalid"
        );
    }

    #[test]
    fn test_password_error_mapping() {
        assert!(matches!(
            AuthError::from(PasswordError::TooWeak),
            AuthError::ValidationError(_)
        ));
        assert!(matches!(
            AuthError::from(UserError::EmailTaken),
            AuthError::EmailTaken
        ));
    }
}
