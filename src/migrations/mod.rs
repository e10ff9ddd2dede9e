// Embedded PostgreSQL migrations
// Compiled into the binary so the server can bring a fresh database up to date on boot

pub mod diesel;

pub use self::diesel::{check_migration_status, run_migrations, MigrationError, MigrationStatus};

use crate::app_config::AppConfig;

/// Migrations run on boot unless `DISABLE_EMBEDDED_MIGRATIONS=true`
pub fn should_run_migrations(config: &AppConfig) -> bool {
    !config.features.disable_embedded_migrations
}
