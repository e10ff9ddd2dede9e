// JWT claim sets for the job board session tokens

use serde::{Deserialize, Serialize};

use super::user::UserRole;

/// Access token claims
/// Carries enough identity for the auth middleware to build an `AuthenticatedUser`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// JWT ID, unique per issued token
    pub jti: String,

    pub email: String,

    pub role: UserRole,

    /// Issuer (iss)
    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

/// Refresh token claims
/// Minimal: the stored hash binds the token to its user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub jti: String,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

impl AccessTokenClaims {
    pub fn new(
        user_id: String,
        token_id: String,
        email: String,
        role: UserRole,
        issuer: String,
        issued_at: u64,
        expires_at: u64,
    ) -> Self {
        Self {
            sub: user_id,
            jti: token_id,
            email,
            role,
            iss: issuer,
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        self.exp < unix_now()
    }
}

impl RefreshTokenClaims {
    pub fn new(
        user_id: String,
        token_id: String,
        issuer: String,
        issued_at: u64,
        expires_at: u64,
    ) -> Self {
        Self {
            sub: user_id,
            jti: token_id,
            iss: issuer,
            iat: issued_at,
            exp: expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < unix_now()
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Access/refresh pair returned by sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign-up / sign-in payload: the token pair plus the public user view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: super::user::UserResponse,
}

impl AuthSession {
    pub fn new(tokens: TokenPair, user: super::user::UserResponse) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }
}

/// Caller identity attached to the request by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub role: UserRole,
    pub token_id: String,
    pub exp: u64,
}

impl AuthenticatedUser {
    /// Build from verified claims; a non-UUID subject is rejected
    pub fn from_claims(claims: AccessTokenClaims) -> Option<Self> {
        let user_id = uuid::Uuid::parse_str(&claims.sub).ok()?;
        Some(Self {
            user_id,
            email: claims.email,
            role: claims.role,
            token_id: claims.jti,
            exp: claims.exp,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }
}

/// Result of exchanging a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedAccessToken {
    pub access_token: String,
}
