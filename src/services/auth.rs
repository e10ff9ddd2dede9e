// Authentication and session lifecycle
// Sign-up/sign-in, email verification, password reset, refresh and logout.

use chrono::{Duration, Utc};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::app_config::SecurityConfig;
use crate::db::DieselPool;
use crate::models::{
    normalize_email, AuthSession, NewUser, Profile, RefreshToken, RefreshedAccessToken,
    RevokedToken, TokenPair, UsedVerificationToken, User, UserError, UserResponse, UserRole,
};
use crate::services::email::EmailService;
use crate::services::jwt::JwtService;
use crate::utils::auth_errors::{log_auth_failure, AuthError};
use crate::utils::password::{check_password_strength, hash_password, verify_password};
use crate::utils::tokens::{hash_token, hashes_match, IssuedToken};

/// Lifetime of a password reset link
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

pub const EMAIL_VERIFIED: &str = "Email verified successfully";
pub const EMAIL_ALREADY_VERIFIED: &str = "Email already verified";

/// Tunables taken from the `security` config section
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub bcrypt_cost: u32,
    pub require_email_verification: bool,
    pub reset_token_ttl_minutes: i64,
}

impl AuthSettings {
    pub fn from_security(security: &SecurityConfig) -> Self {
        Self {
            bcrypt_cost: security.bcrypt_cost,
            require_email_verification: security.require_email_verification,
            reset_token_ttl_minutes: RESET_TOKEN_TTL_MINUTES,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    pool: DieselPool,
    jwt: Arc<JwtService>,
    email: Arc<EmailService>,
    settings: AuthSettings,
}

/// bcrypt is CPU bound; keep it off the async workers
async fn hash_off_thread(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| {
            error!(error = %e, "Password hashing task failed");
            AuthError::InternalError
        })?
        .map_err(AuthError::from)
}

async fn verify_off_thread(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            AuthError::InternalError
        })?
        .map_err(AuthError::from)
}

impl AuthService {
    pub fn new(
        pool: DieselPool,
        jwt: Arc<JwtService>,
        email: Arc<EmailService>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            pool,
            jwt,
            email,
            settings,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Sign both tokens and persist the refresh token hash
    async fn issue_tokens(
        &self,
        conn: &mut AsyncPgConnection,
        user: &User,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self.jwt.generate_access_token(user)?;
        let refresh = self.jwt.generate_refresh_token(user.id)?;

        RefreshToken::store(conn, user.id, &refresh.token, refresh.expires_at).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
        })
    }

    /// Create an unverified account with an empty profile, mail the verification
    /// link and open a session.
    #[instrument(skip(self, password), fields(email = %email, role = %role))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
        full_name: &str,
    ) -> Result<AuthSession, AuthError> {
        if !role.is_self_assignable() {
            return Err(AuthError::ValidationError(
                "Role must be JOBSEEKER or EMPLOYER".to_string(),
            ));
        }
        check_password_strength(password)?;

        let email = normalize_email(email);
        let full_name = full_name.trim().to_string();

        let mut conn = self.pool.get().await?;

        if User::email_exists(&mut conn, &email).await? {
            let err = AuthError::EmailTaken;
            log_auth_failure(&email, &err);
            return Err(err);
        }

        let password_hash = hash_off_thread(password, self.settings.bcrypt_cost).await?;
        let verification = IssuedToken::generate();

        let new_user = NewUser {
            email: email.clone(),
            password_hash,
            role,
            is_email_verified: false,
            email_verification_token: Some(verification.token_hash.clone()),
        };
        let profile_name = full_name.clone();

        let user = conn
            .transaction::<User, AuthError, _>(move |tx| {
                async move {
                    let user = User::create(tx, new_user).await?;
                    Profile::create_empty(tx, user.id, &profile_name).await?;
                    Ok(user)
                }
                .scope_boxed()
            })
            .await?;

        info!(user_id = %user.id, "User registered");

        self.email
            .send_verification_email(&user.email, &full_name, &verification.token)
            .await?;

        let tokens = self.issue_tokens(&mut conn, &user).await?;

        Ok(AuthSession::new(
            tokens,
            UserResponse::from_user(&user, Some(full_name)),
        ))
    }

    /// Unknown email is 401, unverified is 403 before the password is looked at,
    /// wrong password is 401.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let mut conn = self.pool.get().await?;

        let user = match User::find_by_email(&mut conn, email).await {
            Ok(user) => user,
            Err(UserError::NotFound) => {
                let err = AuthError::EmailNotFound;
                log_auth_failure(email, &err);
                return Err(err);
            },
            Err(e) => return Err(e.into()),
        };

        if self.settings.require_email_verification && !user.is_email_verified {
            let err = AuthError::EmailNotVerified;
            log_auth_failure(&user.email, &err);
            return Err(err);
        }

        if !verify_off_thread(password, &user.password_hash).await? {
            let err = AuthError::InvalidCredentials;
            log_auth_failure(&user.email, &err);
            return Err(err);
        }

        let tokens = self.issue_tokens(&mut conn, &user).await?;
        let full_name = Profile::find_by_user(&mut conn, user.id)
            .await?
            .map(|p| p.full_name);

        info!(user_id = %user.id, "User signed in");
        Ok(AuthSession::new(tokens, UserResponse::from_user(&user, full_name)))
    }

    /// Exchange a verification token. Replaying a consumed token reports
    /// "already verified" for as long as the ledger remembers it.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<&'static str, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidVerificationToken);
        }
        let token_hash = hash_token(token);

        let mut conn = self.pool.get().await?;

        if let Some(user) = User::find_by_verification_token(&mut conn, &token_hash).await? {
            let user_id = user.id;
            let ledger_hash = token_hash.clone();
            conn.transaction::<(), AuthError, _>(move |tx| {
                async move {
                    User::mark_email_verified(tx, user_id).await?;
                    UsedVerificationToken::record(tx, user_id, &ledger_hash).await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await?;

            info!(user_id = %user_id, "Email verified");
            return Ok(EMAIL_VERIFIED);
        }

        if UsedVerificationToken::contains(&mut conn, &token_hash).await? {
            return Ok(EMAIL_ALREADY_VERIFIED);
        }

        warn!("Unknown verification token presented");
        Err(AuthError::InvalidVerificationToken)
    }

    /// Issue and mail a fresh verification token for an unverified account.
    /// Unknown or already verified emails are silently ignored.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let mut conn = self.pool.get().await?;

        let user = match User::find_by_email(&mut conn, email).await {
            Ok(user) => user,
            Err(UserError::NotFound) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if user.is_email_verified {
            return Ok(());
        }

        let verification = IssuedToken::generate();
        User::set_verification_token(&mut conn, user.id, &verification.token_hash).await?;

        let name = self.display_name(&mut conn, &user).await?;
        self.email
            .send_verification_email(&user.email, &name, &verification.token)
            .await?;

        info!(user_id = %user.id, "Verification email re-sent");
        Ok(())
    }

    /// Store a one-hour reset token and mail the link. Unknown emails are ignored
    /// so the response never reveals whether an account exists.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let mut conn = self.pool.get().await?;

        let user = match User::find_by_email(&mut conn, email).await {
            Ok(user) => user,
            Err(UserError::NotFound) => {
                info!("Password reset requested for unknown email");
                return Ok(());
            },
            Err(e) => return Err(e.into()),
        };

        let reset = IssuedToken::generate();
        let expiry = Utc::now() + Duration::minutes(self.settings.reset_token_ttl_minutes);
        User::set_reset_token(&mut conn, user.id, &reset.token_hash, expiry).await?;

        let name = self.display_name(&mut conn, &user).await?;
        self.email
            .send_password_reset_email(
                &user.email,
                &name,
                &reset.token,
                self.settings.reset_token_ttl_minutes,
            )
            .await?;

        info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Consume a reset token: new hash, token cleared, every session ended
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        check_password_strength(new_password)?;

        let token_hash = hash_token(token.trim());
        let mut conn = self.pool.get().await?;

        let user = User::find_by_reset_token(&mut conn, &token_hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let stored_matches = user
            .reset_password_token
            .as_deref()
            .map(|stored| hashes_match(stored, &token_hash))
            .unwrap_or(false);
        if !stored_matches || !user.reset_token_is_live(Utc::now()) {
            warn!(user_id = %user.id, "Expired or mismatched reset token");
            return Err(AuthError::InvalidResetToken);
        }

        let new_hash = hash_off_thread(new_password, self.settings.bcrypt_cost).await?;
        let user_id = user.id;

        conn.transaction::<(), AuthError, _>(move |tx| {
            async move {
                User::update_password(tx, user_id, &new_hash).await?;
                RefreshToken::delete_all_for_user(tx, user_id).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    /// Authenticated password change. Existing sessions stay valid.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        check_password_strength(new_password)?;
        if current_password == new_password {
            return Err(AuthError::ValidationError(
                "New password must differ from the current password".to_string(),
            ));
        }

        let mut conn = self.pool.get().await?;
        let user = User::find_by_id(&mut conn, user_id).await?;

        if !verify_off_thread(current_password, &user.password_hash).await? {
            let err = AuthError::WrongPassword;
            log_auth_failure(&user.email, &err);
            return Err(err);
        }

        let new_hash = hash_off_thread(new_password, self.settings.bcrypt_cost).await?;
        User::update_password(&mut conn, user.id, &new_hash).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// New access token for a stored, unexpired refresh token. Not rotated.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccessToken, AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|e| {
                warn!(error = %e, "Refresh token rejected");
                AuthError::InvalidRefreshToken
            })?;
        let user_id =
            JwtService::subject_id(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;

        let mut conn = self.pool.get().await?;

        RefreshToken::find_valid(&mut conn, user_id, refresh_token).await?;

        let user = match User::find_by_id(&mut conn, user_id).await {
            Ok(user) => user,
            Err(UserError::NotFound) => return Err(AuthError::InvalidRefreshToken),
            Err(e) => return Err(e.into()),
        };

        let access_token = self.jwt.generate_access_token(&user)?;
        Ok(RefreshedAccessToken { access_token })
    }

    /// End every session of the token's owner and revoke the presented access token
    #[instrument(skip(self, access_token))]
    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = self.jwt.validate_access_token(access_token)?;
        let user_id = JwtService::subject_id(&claims.sub)?;
        let revoked = access_token.to_string();

        let mut conn = self.pool.get().await?;
        let removed = conn
            .transaction::<usize, AuthError, _>(move |tx| {
                async move {
                    let removed = RefreshToken::delete_all_for_user(tx, user_id).await?;
                    RevokedToken::revoke(tx, user_id, &revoked).await?;
                    Ok(removed)
                }
                .scope_boxed()
            })
            .await?;

        info!(user_id = %user_id, refresh_tokens_removed = removed, "User logged out");
        Ok(())
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let mut conn = self.pool.get().await?;
        let user = User::find_by_id(&mut conn, user_id).await?;
        let full_name = Profile::find_by_user(&mut conn, user.id)
            .await?
            .map(|p| p.full_name);

        Ok(UserResponse::from_user(&user, full_name))
    }

    async fn display_name(
        &self,
        conn: &mut AsyncPgConnection,
        user: &User,
    ) -> Result<String, AuthError> {
        let name = Profile::find_by_user(conn, user.id)
            .await?
            .map(|p| p.full_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user.email.clone());
        Ok(name)
    }
}
