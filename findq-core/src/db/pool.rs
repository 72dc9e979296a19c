//! Database connection pool management
//!
//! Uses a sqlx SqlitePool with explicit connection limits. SQLite serializes
//! concurrent writers itself; WAL plus a busy timeout keeps readers and the
//! single writer from tripping over each other.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::DbError;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a unit of work waits for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bundled schema, safe to run repeatedly.
const SCHEMA: &str = include_str!("schema.sql");

/// Create a SQLite connection pool, creating the database file if missing.
///
/// # Errors
///
/// Returns [`DbError::Connection`] if the store cannot be opened.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("sqlite://instance/findq.sqlite").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a SQLite connection pool with custom options.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(DbError::Connection)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(DbError::Connection)?;

    tracing::debug!(database_url, max_connections, "database pool ready");
    Ok(pool)
}

/// Create the four findq tables and their indexes.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("database schema ready");
    Ok(())
}
