// Integration tests for the expired-token cleanup pass

use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jobboard_backend::{
    models::{NewRevokedToken, NewUsedVerificationToken, RefreshToken},
    schema::{refresh_tokens, revoked_tokens, used_verification_tokens},
    services::run_token_cleanup,
    utils::tokens::hash_token,
};
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{setup_test_app, unique_email};

#[tokio::test]
#[serial]
async fn test_cleanup_prunes_only_expired_rows() {
    let Some(app) = setup_test_app().await else { return };
    let session = app
        .register_verified(&unique_email("cleanup"), "JOBSEEKER", "Clean Up")
        .await;
    let user_id = Uuid::parse_str(session["user"]["id"].as_str().unwrap()).unwrap();

    let past = Utc::now() - Duration::hours(1);
    let future = Utc::now() + Duration::hours(1);
    let expired_hash = hash_token(&format!("expired-{}", Uuid::new_v4()));
    let live_hash = hash_token(&format!("live-{}", Uuid::new_v4()));

    let mut conn = app.diesel_pool.get().await.unwrap();

    let expired_refresh = format!("expired-refresh-{}", Uuid::new_v4());
    let live_refresh = format!("live-refresh-{}", Uuid::new_v4());
    RefreshToken::store(&mut conn, user_id, &expired_refresh, past)
        .await
        .unwrap();
    RefreshToken::store(&mut conn, user_id, &live_refresh, future)
        .await
        .unwrap();

    diesel::insert_into(revoked_tokens::table)
        .values(&vec![
            NewRevokedToken {
                user_id,
                token_hash: expired_hash.clone(),
                expires_at: past,
            },
            NewRevokedToken {
                user_id,
                token_hash: live_hash.clone(),
                expires_at: future,
            },
        ])
        .execute(&mut conn)
        .await
        .unwrap();

    diesel::insert_into(used_verification_tokens::table)
        .values(&vec![
            NewUsedVerificationToken {
                user_id,
                token_hash: expired_hash.clone(),
                expires_at: past,
            },
            NewUsedVerificationToken {
                user_id,
                token_hash: live_hash.clone(),
                expires_at: future,
            },
        ])
        .execute(&mut conn)
        .await
        .unwrap();
    drop(conn);

    let report = run_token_cleanup(&app.diesel_pool).await.unwrap();
    // Other suites may leave expired rows behind, so counts are lower bounds
    assert!(report.refresh_tokens >= 1);
    assert!(report.revoked_tokens >= 1);
    assert!(report.verification_tokens >= 1);
    assert!(report.total() >= 3);

    let mut conn = app.diesel_pool.get().await.unwrap();

    let refresh_left: Vec<String> = refresh_tokens::table
        .filter(refresh_tokens::user_id.eq(user_id))
        .select(refresh_tokens::token_hash)
        .load(&mut conn)
        .await
        .unwrap();
    assert!(refresh_left.contains(&hash_token(&live_refresh)));
    assert!(!refresh_left.contains(&hash_token(&expired_refresh)));

    let revoked_left: Vec<String> = revoked_tokens::table
        .filter(revoked_tokens::user_id.eq(user_id))
        .select(revoked_tokens::token_hash)
        .load(&mut conn)
        .await
        .unwrap();
    assert_eq!(revoked_left, vec![live_hash.clone()]);

    let ledger_left: Vec<String> = used_verification_tokens::table
        .filter(used_verification_tokens::user_id.eq(user_id))
        .select(used_verification_tokens::token_hash)
        .load(&mut conn)
        .await
        .unwrap();
    // Verifying the account above recorded its own ledger row as well
    assert!(ledger_left.contains(&live_hash));
    assert!(!ledger_left.contains(&expired_hash));
}
