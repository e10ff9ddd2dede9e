// Revoked access tokens
// Access tokens presented at logout. Checked by the auth middleware before signature
// verification; rows are pruned once past expires_at.

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::schema::revoked_tokens;
use crate::utils::tokens::hash_token;

/// How long a revoked access token stays on the list.
/// Outlives the 15 minute access token lifetime by a wide margin.
pub const REVOCATION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = revoked_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RevokedToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = revoked_tokens)]
pub struct NewRevokedToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl RevokedToken {
    /// Record an access token as revoked. Re-revoking the same token is a no-op.
    pub async fn revoke(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        access_token: &str,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::revoked_tokens::dsl::*;

        let row = NewRevokedToken {
            user_id: user_id_val,
            token_hash: hash_token(access_token),
            expires_at: Utc::now() + Duration::hours(REVOCATION_TTL_HOURS),
        };

        diesel::insert_into(revoked_tokens)
            .values(&row)
            .on_conflict(token_hash)
            .do_nothing()
            .execute(conn)
            .await?;

        Ok(())
    }

    /// True when the token is on the list and the entry has not expired
    pub async fn is_revoked(
        conn: &mut AsyncPgConnection,
        access_token: &str,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::revoked_tokens::dsl::*;

        diesel::select(diesel::dsl::exists(
            revoked_tokens
                .filter(token_hash.eq(hash_token(access_token)))
                .filter(expires_at.gt(Utc::now())),
        ))
        .get_result::<bool>(conn)
        .await
    }

    pub async fn cleanup_expired(
        conn: &mut AsyncPgConnection,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::revoked_tokens::dsl::*;

        diesel::delete(revoked_tokens.filter(expires_at.le(Utc::now())))
            .execute(conn)
            .await
    }
}
