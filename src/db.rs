//! Connection pool construction and schema migrations.

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;

/// Opens the shared pool with the configured size and acquire timeout.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(1)
        .acquire_timeout(config.database_acquire_timeout)
        .connect(&config.database_url)
        .await?;
    log::info!(
        "database pool ready (max {} connections)",
        config.database_max_connections
    );
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("database migrations applied");
    Ok(())
}

/// Round trip used by the health endpoint.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
