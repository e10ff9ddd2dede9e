// Refresh Token Database Model
// Persisted refresh tokens bound to a user; many per user (one per device/session).
// Only the SHA-256 of the signed token is stored.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::schema::refresh_tokens;
use crate::utils::tokens::hash_token;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = refresh_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Errors for refresh token operations
#[derive(thiserror::Error, Debug)]
pub enum RefreshTokenError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Token not found")]
    NotFound,
}

impl RefreshToken {
    /// Store the hash of a freshly signed refresh token
    pub async fn store(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        token: &str,
        expires_at_val: DateTime<Utc>,
    ) -> Result<Self, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        let new_token = NewRefreshToken {
            user_id: user_id_val,
            token_hash: hash_token(token),
            expires_at: expires_at_val,
        };

        diesel::insert_into(refresh_tokens)
            .values(&new_token)
            .returning(RefreshToken::as_returning())
            .get_result::<RefreshToken>(conn)
            .await
            .map_err(RefreshTokenError::Database)
    }

    /// Find an unexpired row matching token and owner
    pub async fn find_valid(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        token: &str,
    ) -> Result<Self, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        refresh_tokens
            .filter(token_hash.eq(hash_token(token)))
            .filter(user_id.eq(user_id_val))
            .filter(expires_at.gt(Utc::now()))
            .select(RefreshToken::as_select())
            .first::<RefreshToken>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => RefreshTokenError::NotFound,
                _ => RefreshTokenError::Database(e),
            })
    }

    /// Delete every refresh token a user holds (logout, password reset)
    pub async fn delete_all_for_user(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
    ) -> Result<usize, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        let deleted = diesel::delete(refresh_tokens.filter(user_id.eq(user_id_val)))
            .execute(conn)
            .await?;

        Ok(deleted)
    }

    /// Clean up expired tokens (run periodically)
    pub async fn cleanup_expired(conn: &mut AsyncPgConnection) -> Result<usize, RefreshTokenError> {
        use crate::schema::refresh_tokens::dsl::*;

        let deleted = diesel::delete(refresh_tokens.filter(expires_at.le(Utc::now())))
            .execute(conn)
            .await?;

        Ok(deleted)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
