use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::StoreBackend;
use crate::error::AppError;
use crate::store::{DocumentStore, MemoryStore, SeaStore};

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL_MS: u64 = 500;

/// Retry a connection attempt with fixed interval delays.
/// Returns the last error once all attempts are exhausted.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, "connection retry succeeded");
                }
                return Ok(result);
            }
            Err(e) if attempt < max_attempts => {
                warn!(attempt, max_attempts, interval_ms, error = %e, "connection attempt failed");
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Open a connection to `url`. This does NOT run migrations.
pub async fn connect_db(url: &str) -> Result<DatabaseConnection, AppError> {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if url.starts_with("sqlite::memory:") {
        // Every pooled connection would otherwise get its own empty database.
        options.max_connections(1).min_connections(1);
    }

    retry_connection(
        || {
            let options = options.clone();
            async move { Database::connect(options).await.map_err(AppError::from) }
        },
        CONNECT_ATTEMPTS,
        CONNECT_RETRY_INTERVAL_MS,
    )
    .await
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(url: &str) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(url).await?;
    migrate(&conn, MigrationCommand::Up).await?;
    Ok(conn)
}

/// Build the document store selected by `backend`.
pub async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn DocumentStore>, AppError> {
    match backend.url()? {
        None => {
            info!(store = "memory", "document store ready");
            Ok(Arc::new(MemoryStore::new()))
        }
        Some(url) => {
            let conn = bootstrap_db(&url).await?;
            info!(store = ?conn.get_database_backend(), "document store ready");
            Ok(Arc::new(SeaStore::new(conn)))
        }
    }
}
