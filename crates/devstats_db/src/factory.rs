//! Factory for creating database clients

use crate::client::DbClient;
use crate::error::DbError;
use devstats_config::AppConfig;
use std::sync::Arc;
use tracing::debug;

/// Builds [`DbClient`]s from the different configuration sources.
#[derive(Debug, Clone, Default)]
pub struct DbClientFactory;

impl DbClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a database client from the `database` section of `config`.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    ///
    /// * The database section is missing
    /// * The database URL is empty
    /// * The database connection fails
    pub async fn from_app_config(&self, config: &Arc<AppConfig>) -> Result<DbClient, DbError> {
        debug!("Creating database client from application configuration");

        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        DbClient::from_config(db_config).await
    }

    /// Create a database client from a bare URL.
    pub async fn from_url(&self, db_url: &str) -> Result<DbClient, DbError> {
        debug!("Creating database client from URL");
        DbClient::from_url(db_url).await
    }
}
