// JWT token signing and verification
// HS256 access tokens (15 min) and refresh tokens (7 days) with separate secrets

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{AccessTokenClaims, RefreshTokenClaims};
use crate::models::user::User;

// Error types for JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::InvalidToken(err.to_string()),
        }
    }
}

// JWT Configuration with separate keys for access and refresh tokens
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry: u64,
    pub refresh_token_expiry: u64,
    pub algorithm: Algorithm,
    pub issuer: String,

    pub access_encoding_key: EncodingKey,
    pub access_decoding_key: DecodingKey,

    pub refresh_encoding_key: EncodingKey,
    pub refresh_decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("access_encoding_key", &"<redacted>")
            .field("access_decoding_key", &"<redacted>")
            .field("refresh_encoding_key", &"<redacted>")
            .field("refresh_decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    /// Shared by `from_settings` and `for_test`
    fn build_from_params(
        access_secret: &str,
        refresh_secret: &str,
        access_expiry: u64,
        refresh_expiry: u64,
        issuer: String,
    ) -> Self {
        JwtConfig {
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
            algorithm: Algorithm::HS256,
            issuer,
            access_encoding_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Build from the `jwt` section of the application config
    pub fn from_settings(settings: &crate::app_config::JwtConfig) -> Self {
        Self::build_from_params(
            &settings.access_secret,
            &settings.refresh_secret,
            settings.access_expiry,
            settings.refresh_expiry,
            settings.issuer.clone(),
        )
    }

    #[cfg(test)]
    pub fn for_test() -> Self {
        Self::build_from_params(
            "test-access-secret-hs256-at-least-32-bytes",
            "test-refresh-secret-hs256-at-least-32-bytes",
            900,
            604800,
            "test.jobboard".to_string(),
        )
    }
}

/// Signed refresh token plus the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub struct JwtService {
    config: JwtConfig,
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| JwtError::TokenCreation(e.to_string()))
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Sign a 15-minute access token for the user
    pub fn generate_access_token(&self, user: &User) -> Result<String, JwtError> {
        let now = unix_now()?;

        let claims = AccessTokenClaims::new(
            user.id.to_string(),
            Uuid::new_v4().to_string(),
            user.email.clone(),
            user.role,
            self.config.issuer.clone(),
            now,
            now + self.config.access_token_expiry,
        );

        self.encode_access_claims(&claims)
    }

    /// Sign arbitrary access claims with the access secret
    pub fn encode_access_claims(&self, claims: &AccessTokenClaims) -> Result<String, JwtError> {
        encode(
            &Header::new(self.config.algorithm),
            claims,
            &self.config.access_encoding_key,
        )
        .map_err(|e| JwtError::TokenCreation(e.to_string()))
    }

    /// Sign a 7-day refresh token. Persisting it is the caller's job.
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<IssuedRefreshToken, JwtError> {
        let now = unix_now()?;
        let exp = now + self.config.refresh_token_expiry;

        let claims = RefreshTokenClaims::new(
            user_id.to_string(),
            Uuid::new_v4().to_string(),
            self.config.issuer.clone(),
            now,
            exp,
        );

        let token = encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.config.refresh_encoding_key,
        )
        .map_err(|e| JwtError::TokenCreation(e.to_string()))?;

        let expires_at = chrono::DateTime::from_timestamp(exp as i64, 0)
            .ok_or_else(|| JwtError::TokenCreation("refresh expiry out of range".to_string()))?;

        Ok(IssuedRefreshToken { token, expires_at })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0; // No leeway for expiry validation
        validation
    }

    /// Verify signature, issuer and expiry of an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &self.config.access_decoding_key,
            &self.validation(),
        )?;

        Ok(token_data.claims)
    }

    /// Verify signature, issuer and expiry of a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, JwtError> {
        let token_data = decode::<RefreshTokenClaims>(
            token,
            &self.config.refresh_decoding_key,
            &self.validation(),
        )?;

        Ok(token_data.claims)
    }

    /// Subject of verified claims as a user id
    pub fn subject_id(sub: &str) -> Result<Uuid, JwtError> {
        Uuid::parse_str(sub).map_err(|_| JwtError::InvalidClaims("subject is not a UUID".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::Utc;

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Employer,
            is_email_verified: true,
            email_verification_token: None,
            reset_password_token: None,
            reset_password_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = JwtService::new(JwtConfig::for_test());
        let user = test_user();

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, UserRole::Employer);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_expiry_is_seven_days() {
        let service = JwtService::new(JwtConfig::for_test());
        let user_id = Uuid::new_v4();

        let issued = service.generate_refresh_token(user_id).unwrap();
        let claims = service.validate_refresh_token(&issued.token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, 604800);
        assert_eq!(issued.expires_at.timestamp() as u64, claims.exp);
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let service = JwtService::new(JwtConfig::for_test());
        let user = test_user();

        let access = service.generate_access_token(&user).unwrap();
        let refresh = service.generate_refresh_token(user.id).unwrap();

        assert!(service.validate_refresh_token(&access).is_err());
        assert!(service.validate_access_token(&refresh.token).is_err());
    }

    #[test]
    fn test_expired_access_token() {
        let service = JwtService::new(JwtConfig::for_test());
        let now = unix_now().unwrap();
        let claims = AccessTokenClaims::new(
            Uuid::new_v4().to_string(),
            Uuid::new_v4().to_string(),
            "old@example.com".to_string(),
            UserRole::JobSeeker,
            "test.jobboard".to_string(),
            now - 3600,
            now - 60,
        );
        let token = service.encode_access_claims(&claims).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token() {
        let service = JwtService::new(JwtConfig::for_test());
        assert!(matches!(
            service.validate_access_token("not.a.jwt"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_subject_id() {
        let id = Uuid::new_v4();
        assert_eq!(JwtService::subject_id(&id.to_string()).unwrap(), id);
        assert!(JwtService::subject_id("nope").is_err());
    }
}
