//! Database client
//!
//! A thin wrapper around an SQLx `Any` pool so the rest of the code never
//! names a concrete driver.

use crate::error::DbError;
use devstats_config::DatabaseConfig;
use sqlx::AnyConnection;
use sqlx::pool::{PoolConnection, PoolOptions};
use sqlx::Pool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;
const IDLE_TIMEOUT_SECS: u64 = 600;

/// Database client shared by the repositories.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: Pool<sqlx::Any>,
}

impl DbClient {
    /// Create a new database client from a database configuration
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database URL is empty
    /// * The database connection fails
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }

        let pool = Self::create_pool(
            &db_config.url,
            db_config.max_connections,
            Duration::from_secs(db_config.acquire_timeout_secs),
        )
        .await?;

        Ok(Self { pool })
    }

    /// Create a new database client from a database URL with default pool settings
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database URL is empty or invalid
    /// * The database connection fails
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }

        let pool = Self::create_pool(
            db_url,
            DEFAULT_MAX_CONNECTIONS,
            Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        )
        .await?;

        Ok(Self { pool })
    }

    async fn create_pool(
        db_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Pool<sqlx::Any>, DbError> {
        debug!("Creating database pool with URL: {}", db_url);

        sqlx::any::install_default_drivers();

        if db_url.starts_with("sqlite:") {
            ensure_sqlite_file(db_url)?;
        }

        let connect_options = sqlx::any::AnyConnectOptions::from_str(db_url)
            .map_err(|e| DbError::UrlError(e.to_string()))?;

        let pool = PoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .idle_timeout(Duration::from_secs(IDLE_TIMEOUT_SECS))
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    /// Begin a write transaction with `BEGIN IMMEDIATE`
    ///
    /// The write lock is taken before the first read, so concurrent writers
    /// wait on SQLite's busy timeout (5s by default) instead of failing with
    /// `database is locked` when a read lock cannot be upgraded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::TransactionError`] if no connection could be
    /// acquired or the lock was not granted in time.
    pub async fn begin_immediate(&self) -> Result<DbTransaction, DbError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        Ok(DbTransaction { conn: Some(conn) })
    }

    /// Execute a statement that returns no rows
    ///
    /// # Returns
    ///
    /// The number of rows affected
    pub async fn execute(&self, query: &str) -> Result<u64, DbError> {
        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// `true` if a trivial query succeeds
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// An open write transaction on a pooled connection.
///
/// Ends with [`DbTransaction::commit`] or [`DbTransaction::rollback`]. A
/// transaction dropped while still open closes its connection instead of
/// returning it to the pool mid-transaction.
pub struct DbTransaction {
    conn: Option<PoolConnection<sqlx::Any>>,
}

impl DbTransaction {
    /// The connection to run statements on.
    pub fn connection(&mut self) -> Result<&mut AnyConnection, DbError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| DbError::TransactionError("transaction already finished".to_string()))
    }

    pub async fn commit(mut self) -> Result<(), DbError> {
        self.finish("COMMIT").await
    }

    pub async fn rollback(mut self) -> Result<(), DbError> {
        self.finish("ROLLBACK").await
    }

    async fn finish(&mut self, statement: &str) -> Result<(), DbError> {
        let mut conn = self
            .conn
            .take()
            .ok_or_else(|| DbError::TransactionError("transaction already finished".to_string()))?;

        match sqlx::query(statement).execute(&mut *conn).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("{} failed, closing connection: {}", statement, e);
                drop(conn.detach());
                Err(DbError::TransactionError(e.to_string()))
            }
        }
    }
}

impl Drop for DbTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            drop(conn.detach());
        }
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient")
    }
}

/// SQLite will not create a missing database file through the `Any` driver,
/// so create the file and its directory up front.
fn ensure_sqlite_file(db_url: &str) -> Result<(), DbError> {
    // Handle both "sqlite:example.db" and "sqlite://example.db" formats
    let db_path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .unwrap_or(db_url);
    // Drop query parameters such as "?mode=rwc"
    let db_path = db_path.split('?').next().unwrap_or(db_path);

    if db_path.is_empty() || db_path.contains(":memory:") {
        return Ok(());
    }

    let path = Path::new(db_path);
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating directory for SQLite database: {:?}", dir);
            std::fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory for SQLite database: {}", e);
                DbError::PoolError(format!("Failed to create directory: {}", e))
            })?;
        }
    }

    if !path.exists() {
        debug!("Creating empty SQLite database file: {}", db_path);
        std::fs::File::create(path).map_err(|e| {
            error!("Failed to create SQLite database file: {}", e);
            DbError::PoolError(format!("Failed to create database file: {}", e))
        })?;
    }

    Ok(())
}
