// Background maintenance
// Periodically prunes expired refresh tokens, revoked access tokens and
// verification ledger entries. Only rows past their expiry are touched.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::db::DieselPool;
use crate::models::{RefreshToken, RevokedToken, UsedVerificationToken};
use crate::utils::ServiceError;

/// Rows removed by one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub refresh_tokens: usize,
    pub revoked_tokens: usize,
    pub verification_tokens: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.refresh_tokens + self.revoked_tokens + self.verification_tokens
    }
}

/// One cleanup pass over all token tables
pub async fn run_token_cleanup(pool: &DieselPool) -> Result<CleanupReport, ServiceError> {
    let mut conn = pool.get().await?;

    let refresh_tokens = RefreshToken::cleanup_expired(&mut conn)
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;
    let revoked_tokens = RevokedToken::cleanup_expired(&mut conn).await?;
    let verification_tokens = UsedVerificationToken::cleanup_expired(&mut conn).await?;

    Ok(CleanupReport {
        refresh_tokens,
        revoked_tokens,
        verification_tokens,
    })
}

/// Run `run_token_cleanup` every `interval_secs` until the runtime shuts down
pub fn spawn_token_cleanup(pool: DieselPool, interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(interval_secs.max(1));
    info!(interval_secs = period.as_secs(), "Starting token cleanup task");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately; skip it so startup stays quiet
        interval.tick().await;

        loop {
            interval.tick().await;
            match run_token_cleanup(&pool).await {
                Ok(report) if report.total() > 0 => info!(
                    refresh_tokens = report.refresh_tokens,
                    revoked_tokens = report.revoked_tokens,
                    verification_tokens = report.verification_tokens,
                    "Expired tokens pruned"
                ),
                Ok(_) => {},
                Err(e) => error!(error = %e, "Token cleanup failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_total() {
        let report = CleanupReport {
            refresh_tokens: 2,
            revoked_tokens: 3,
            verification_tokens: 1,
        };
        assert_eq!(report.total(), 6);
        assert_eq!(CleanupReport::default().total(), 0);
    }
}
