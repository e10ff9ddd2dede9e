// Authentication handlers
// Sign-up/sign-in, token refresh and logout, email verification and password management

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::{extract_bearer_token, AuthenticatedUser},
    models::UserRole,
    utils::{api_response, password::validate_password, ApiResponse, AuthError},
};

/// Returned by resend-verification and forgot-password whether or not the account exists
pub const GENERIC_EMAIL_MESSAGE: &str =
    "If an account exists for that email, a message has been sent";

// =============================================================================
// REQUEST TYPES
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 320, message = "Email must be less than 320 characters"))]
    pub email: String,

    #[validate(custom = "validate_password")]
    pub password: String,

    #[serde(default = "default_role")]
    pub role: UserRole,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Full name must be between 1 and 255 characters"
    ))]
    pub full_name: String,
}

fn default_role() -> UserRole {
    UserRole::JobSeeker
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,

    #[validate(custom = "validate_password")]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom = "validate_password")]
    pub new_password: String,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// POST /api/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AuthError> {
    request.validate()?;

    let session = state
        .auth_service
        .sign_up(&request.email, &request.password, request.role, &request.full_name)
        .await?;

    Ok(api_response::created(
        session,
        "Account created. Please check your email to verify your address",
    ))
}

/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, AuthError> {
    request.validate()?;

    let session = state
        .auth_service
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(api_response::ok(session, "Signed in successfully"))
}

/// POST /api/auth/logout
///
/// Not behind the auth middleware: the token is validated here so a token that
/// is already revoked still gets a clean answer.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(&headers)?;
    state.auth_service.logout(token).await?;

    Ok(Json(ApiResponse::message("Logged out successfully")))
}

/// POST /api/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AuthError> {
    if request.refresh_token.trim().is_empty() {
        return Err(AuthError::ValidationError(
            "Refresh token is required".to_string(),
        ));
    }

    let refreshed = state.auth_service.refresh(&request.refresh_token).await?;
    Ok(api_response::ok(refreshed, "Token refreshed"))
}

/// GET /api/auth/verify-email/{token}
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AuthError> {
    let message = state.auth_service.verify_email(&token).await?;
    Ok(Json(ApiResponse::message(message)))
}

/// POST /api/auth/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    request.validate()?;
    state.auth_service.resend_verification(&request.email).await?;

    Ok(Json(ApiResponse::message(GENERIC_EMAIL_MESSAGE)))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    request.validate()?;
    state
        .auth_service
        .request_password_reset(&request.email)
        .await?;

    Ok(Json(ApiResponse::message(GENERIC_EMAIL_MESSAGE)))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    request.validate()?;
    state
        .auth_service
        .reset_password(&request.token, &request.new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password has been reset successfully")))
}

/// PUT /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    request.validate()?;
    state
        .auth_service
        .change_password(user.user_id, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password changed successfully")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AuthError> {
    let profile = state.auth_service.current_user(user.user_id).await?;
    Ok(api_response::ok(profile, "Current user"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_request_defaults_to_jobseeker() {
        let request: SignUpRequest = serde_json::from_value(serde_json::json!({
            "email": "a@x.com",
            "password": "Secret1!",
            "fullName": "Ada Lovelace"
        }))
        .unwrap();
        assert_eq!(request.role, UserRole::JobSeeker);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_sign_up_request_rejects_bad_email() {
        let request: SignUpRequest = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "password": "Secret1!",
            "role": "EMPLOYER",
            "fullName": "Grace"
        }))
        .unwrap();
        assert_eq!(request.role, UserRole::Employer);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_password_requests_use_camel_case() {
        let request: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "currentPassword": "Secret1!",
            "newPassword": "Secret2!"
        }))
        .unwrap();
        assert_eq!(request.current_password, "Secret1!");

        let reset: ResetPasswordRequest = serde_json::from_value(serde_json::json!({
            "token": "abc",
            "newPassword": "Secret2!"
        }))
        .unwrap();
        assert_eq!(reset.new_password, "Secret2!");
    }
}
