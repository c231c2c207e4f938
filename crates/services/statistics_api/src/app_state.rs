use devstats_common::{logging, DeviceRegistrar};
use devstats_config::AppConfig;
use devstats_db::{
    DbClient, DbClientFactory, DeviceRegistrationRepository, DeviceRegistrationRepositoryFactory,
    RepositoryFactory, SqlDeviceRegistrationRepository,
};
use devstats_statistics::HttpDeviceRegistrar;
use std::error::Error;
use std::sync::Arc;
use tracing::info;

/// Everything the public router needs, built once at startup.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_client: DbClient,
    pub repository: SqlDeviceRegistrationRepository,
    pub registrar: Arc<dyn DeviceRegistrar>,
}

impl AppState {
    /// Opens the shared store, makes sure the schema exists and builds the
    /// client for the device registration service.
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

        let registrar = HttpDeviceRegistrar::from_config(&config)?;
        info!("Forwarding logins to {}", registrar.register_url());

        Ok(Self {
            config,
            db_client,
            repository,
            registrar: Arc::new(registrar),
        })
    }
}
