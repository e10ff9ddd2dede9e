// Diesel migration runner for PostgreSQL
// diesel_migrations needs a sync connection, so every call runs on the blocking pool

use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;
use tracing::{debug, info};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/diesel");

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to establish sync connection: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Migration failed: {0}")]
    Harness(String),

    #[error("Migration task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Migration status information
#[derive(Debug)]
pub struct MigrationStatus {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Run all pending migrations and return how many were applied
pub async fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let database_url = database_url.to_string();

    let applied = tokio::task::spawn_blocking(move || -> Result<Vec<String>, MigrationError> {
        let mut conn = PgConnection::establish(&database_url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| MigrationError::Harness(e.to_string()))?;
        Ok(applied.iter().map(|m| m.to_string()).collect())
    })
    .await??;

    for version in &applied {
        debug!(version = %version, "Applied migration");
    }
    if applied.is_empty() {
        info!("Database schema up to date");
    } else {
        info!(count = applied.len(), "Database migrations applied");
    }

    Ok(applied.len())
}

/// Applied and pending migrations without changing anything
pub async fn check_migration_status(database_url: &str) -> Result<MigrationStatus, MigrationError> {
    let database_url = database_url.to_string();

    let status = tokio::task::spawn_blocking(move || -> Result<MigrationStatus, MigrationError> {
        let mut conn = PgConnection::establish(&database_url)?;

        let applied = conn
            .applied_migrations()
            .map_err(|e| MigrationError::Harness(e.to_string()))?;
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| MigrationError::Harness(e.to_string()))?;

        Ok(MigrationStatus {
            applied: applied.iter().map(|m| m.to_string()).collect(),
            pending: pending.iter().map(|m| m.name().to_string()).collect(),
        })
    })
    .await??;

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_apply_cleanly() {
        dotenv::dotenv().ok();
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        };

        if let Err(e) = run_migrations(&database_url).await {
            eprintln!("Skipping test: database unavailable ({})", e);
            return;
        }

        let status = check_migration_status(&database_url)
            .await
            .expect("Failed to check status");
        assert!(status.is_up_to_date());
        assert!(status.applied.len() >= 3);
    }
}
