//! Database adapters: connection pool and schema migrations.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{StoreError, map_sqlx_error};

/// Connect to Postgres and apply pending migrations.
pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .map_err(|e| map_sqlx_error("connect", None, e))?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::backend("migrate", e.to_string()))?;

    info!(max_connections = config.max_connections, "postgres catalog connected");
    Ok(pool)
}
