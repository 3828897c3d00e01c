/// Schema migrations
///
/// Migration files live in `migrations/` at the workspace root and are
/// embedded into the binary at compile time, so a deployed server brings its
/// own schema.

use sqlx::postgres::PgPool;
use tracing::{error, info};

/// Embedded migrator, shared with `#[sqlx::test]` fixtures
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../migrations");

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Running database migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}
