// Authentication middleware for protected routes
// Rejects revoked tokens, validates the JWT and injects AuthenticatedUser into request extensions

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    app::AppState,
    models::{AuthenticatedUser, RevokedToken},
    utils::AuthError,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MissingToken),
    }
}

/// Revocation is checked before the signature so a logged-out token fails fast
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
    let token = extract_bearer_token(headers)?;

    let mut conn = state.diesel_pool.get().await?;
    if RevokedToken::is_revoked(&mut conn, token).await? {
        return Err(AuthError::TokenRevoked);
    }
    drop(conn);

    let claims = state.jwt_service.validate_access_token(token)?;
    AuthenticatedUser::from_claims(claims).ok_or(AuthError::InvalidToken)
}

/// Middleware function that authenticates the caller and adds AuthenticatedUser to extensions
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&app_state, request.headers()).await {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        },
        Err(e) => {
            tracing::warn!(code = e.error_code(), "Request authentication failed");
            e.into_response()
        },
    }
}

/// Handlers behind `auth_middleware` take `AuthenticatedUser` directly
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}
