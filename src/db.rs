use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::str::FromStr;
use tokio_postgres::NoTls;

use crate::error::AppError;

const MIGRATIONS: &str = include_str!("../migrations/0001_init.sql");

pub async fn init_pool(database_url: &str) -> Result<Pool, AppError> {
    let pg_config = tokio_postgres::Config::from_str(database_url)
        .map_err(|e| AppError::Config(format!("invalid DATABASE_URL: {e}")))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    let pool = Pool::builder(manager)
        .max_size(16)
        .build()
        .map_err(|e| AppError::StartServer(format!("build pool: {e}")))?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Schema is idempotent (CREATE ... IF NOT EXISTS), so this is safe to run
/// on every startup.
async fn run_migrations(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    client
        .batch_execute(MIGRATIONS)
        .await
        .map_err(|e| AppError::StartServer(format!("apply migrations: {e}")))?;
    tracing::info!("database schema up to date");
    Ok(())
}
