// Ledger of consumed email verification tokens
// Lets a replayed verification link answer "already verified" instead of failing.

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::schema::used_verification_tokens;

/// Retention for consumed verification tokens
pub const LEDGER_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = used_verification_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UsedVerificationToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = used_verification_tokens)]
pub struct NewUsedVerificationToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl UsedVerificationToken {
    /// Record a consumed token by its stored hash
    pub async fn record(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        token_hash_val: &str,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::used_verification_tokens::dsl::*;

        let row = NewUsedVerificationToken {
            user_id: user_id_val,
            token_hash: token_hash_val.to_string(),
            expires_at: Utc::now() + Duration::days(LEDGER_TTL_DAYS),
        };

        diesel::insert_into(used_verification_tokens)
            .values(&row)
            .on_conflict(token_hash)
            .do_nothing()
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn contains(
        conn: &mut AsyncPgConnection,
        token_hash_val: &str,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::used_verification_tokens::dsl::*;

        diesel::select(diesel::dsl::exists(
            used_verification_tokens
                .filter(token_hash.eq(token_hash_val))
                .filter(expires_at.gt(Utc::now())),
        ))
        .get_result::<bool>(conn)
        .await
    }

    pub async fn cleanup_expired(
        conn: &mut AsyncPgConnection,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::used_verification_tokens::dsl::*;

        diesel::delete(used_verification_tokens.filter(expires_at.le(Utc::now())))
            .execute(conn)
            .await
    }
}
