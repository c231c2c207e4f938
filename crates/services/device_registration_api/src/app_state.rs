use devstats_common::logging;
use devstats_config::AppConfig;
use devstats_db::{
    DbClient, DbClientFactory, DeviceRegistrationRepository, DeviceRegistrationRepositoryFactory,
    RepositoryFactory, SqlDeviceRegistrationRepository,
};
use std::error::Error;
use std::sync::Arc;
use tracing::info;

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_client: DbClient,
    pub repository: SqlDeviceRegistrationRepository,
}

impl AppState {
    pub async fn init(config: Arc<AppConfig>) -> Result<Self, Box<dyn Error>> {
        let db_client = DbClientFactory::new().from_app_config(&config).await?;
        info!("Connected to {}", db_client);

        let repository =
            DeviceRegistrationRepositoryFactory::new().create_repository(db_client.clone());
        logging::log_result(
            repository.init_schema().await,
            "Device registration schema ready",
            "Failed to initialize device registration schema",
        )?;

        Ok(Self {
            config,
            db_client,
            repository,
        })
    }
}
