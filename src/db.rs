use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_with(cfg.connect_options()?)
        .await
        .context("connect to database")?;
    tracing::info!(host = %cfg.host, database = %cfg.name, "database connected");
    Ok(pool)
}

/// Create or evolve the schema from `migrations/`.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run database migrations")?;
    tracing::info!("database migrations applied");
    Ok(())
}
