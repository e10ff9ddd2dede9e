// User Database Model
// Credential store: email, bcrypt hash, role and the verification/reset token state

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::users;

/// Account role. Drives dashboard selection and catalog permissions.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
pub enum UserRole {
    #[serde(rename = "JOBSEEKER")]
    JobSeeker,
    #[serde(rename = "EMPLOYER")]
    Employer,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "JOBSEEKER",
            UserRole::Employer => "EMPLOYER",
            UserRole::Admin => "ADMIN",
        }
    }

    /// Roles a visitor may pick at sign-up. ADMIN is provisioned out of band.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, UserRole::JobSeeker | UserRole::Employer)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOBSEEKER" => Ok(UserRole::JobSeeker),
            "EMPLOYER" => Ok(UserRole::Employer),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_text_sql!(UserRole);

/// User database model - queryable from database
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_email_verified: bool,
    /// SHA-256 of the outstanding verification token
    pub email_verification_token: Option<String>,
    /// SHA-256 of the outstanding password reset token
    pub reset_password_token: Option<String>,
    pub reset_password_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user for insertion
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_email_verified: bool,
    pub email_verification_token: Option<String>,
}

/// Public view of a user, safe to return from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_email_verified: bool,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User, full_name: Option<String>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            is_email_verified: user.is_email_verified,
            full_name,
            created_at: user.created_at,
        }
    }
}

/// Errors for user operations
#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("User not found")]
    NotFound,

    #[error("Email already registered")]
    EmailTaken,
}

fn not_found_or(e: diesel::result::Error) -> UserError {
    match e {
        diesel::result::Error::NotFound => UserError::NotFound,
        _ => UserError::Database(e),
    }
}

/// Emails are stored lower-case so lookups can use plain equality
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        users
            .filter(id.eq(user_id))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .map_err(not_found_or)
    }

    /// Find user by email (normalized before comparison)
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        users
            .filter(email.eq(normalize_email(email_str)))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .map_err(not_found_or)
    }

    pub async fn email_exists(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> Result<bool, UserError> {
        use crate::schema::users::dsl::*;

        let found = diesel::select(diesel::dsl::exists(
            users.filter(email.eq(normalize_email(email_str))),
        ))
        .get_result::<bool>(conn)
        .await?;

        Ok(found)
    }

    /// Create a new user. A unique violation on email maps to `EmailTaken`.
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_user: NewUser,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        diesel::insert_into(users)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .await
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    UserError::EmailTaken
                },
                _ => UserError::Database(e),
            })
    }

    /// Look up the holder of an outstanding verification token hash
    pub async fn find_by_verification_token(
        conn: &mut AsyncPgConnection,
        token_hash: &str,
    ) -> Result<Option<Self>, UserError> {
        use crate::schema::users::dsl::*;

        let user = users
            .filter(email_verification_token.eq(token_hash))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()?;

        Ok(user)
    }

    /// Mark verified and clear the verification token
    pub async fn mark_email_verified(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        diesel::update(users.filter(id.eq(user_id)))
            .set((
                is_email_verified.eq(true),
                email_verification_token.eq(None::<String>),
                updated_at.eq(Utc::now()),
            ))
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .await
            .map_err(not_found_or)
    }

    /// Replace the outstanding verification token hash
    pub async fn set_verification_token(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<(), UserError> {
        use crate::schema::users::dsl::*;

        diesel::update(users.filter(id.eq(user_id)))
            .set((
                email_verification_token.eq(Some(token_hash)),
                updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn set_reset_token(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        token_hash: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), UserError> {
        use crate::schema::users::dsl::*;

        diesel::update(users.filter(id.eq(user_id)))
            .set((
                reset_password_token.eq(Some(token_hash)),
                reset_password_expiry.eq(Some(expiry)),
                updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn find_by_reset_token(
        conn: &mut AsyncPgConnection,
        token_hash: &str,
    ) -> Result<Option<Self>, UserError> {
        use crate::schema::users::dsl::*;

        let user = users
            .filter(reset_password_token.eq(token_hash))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()?;

        Ok(user)
    }

    /// Store a new password hash and consume any reset token
    pub async fn update_password(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        new_hash: &str,
    ) -> Result<(), UserError> {
        use crate::schema::users::dsl::*;

        let updated = diesel::update(users.filter(id.eq(user_id)))
            .set((
                password_hash.eq(new_hash),
                reset_password_token.eq(None::<String>),
                reset_password_expiry.eq(None::<DateTime<Utc>>),
                updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .await?;

        if updated == 0 {
            return Err(UserError::NotFound);
        }
        Ok(())
    }

    /// True while a reset token is held and its expiry is still ahead
    pub fn reset_token_is_live(&self, now: DateTime<Utc>) -> bool {
        self.reset_password_token.is_some()
            && self.reset_password_expiry.map(|exp| exp > now).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::JobSeeker,
            is_email_verified: false,
            email_verification_token: None,
            reset_password_token: None,
            reset_password_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_role_conversion() {
        assert_eq!(UserRole::from_str("EMPLOYER").unwrap(), UserRole::Employer);
        assert_eq!(UserRole::Admin.as_str(), "ADMIN");
        assert!(UserRole::from_str("employer").is_err());
        assert!(UserRole::JobSeeker.is_self_assignable());
        assert!(!UserRole::Admin.is_self_assignable());
    }

    #[test]
    fn test_role_deserializes_from_wire_name() {
        let role: UserRole = serde_json::from_str("\"JOBSEEKER\"").unwrap();
        assert_eq!(role, UserRole::JobSeeker);
        assert!(serde_json::from_str::<UserRole>("\"OWNER\"").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn test_reset_token_liveness() {
        let now = Utc::now();
        let mut user = sample_user();
        assert!(!user.reset_token_is_live(now));

        user.reset_password_token = Some("h".to_string());
        user.reset_password_expiry = Some(now + Duration::minutes(30));
        assert!(user.reset_token_is_live(now));

        user.reset_password_expiry = Some(now - Duration::seconds(1));
        assert!(!user.reset_token_is_live(now));
    }

    #[test]
    fn test_user_response_uses_camel_case() {
        let user = sample_user();
        let json = serde_json::to_value(UserResponse::from_user(&user, Some("Ann".into()))).unwrap();
        assert_eq!(json["isEmailVerified"], false);
        assert_eq!(json["fullName"], "Ann");
        assert_eq!(json["role"], "JOBSEEKER");
    }
}
