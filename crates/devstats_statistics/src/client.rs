//! HTTP client for the internal device registration service.

use devstats_common::{
    config_error, create_client, default_client, external_service_error, BoxFuture,
    DevStatsError, DeviceRegistrar, DeviceRegistrationResponse, RegistrationKey,
    INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME,
};
use devstats_config::AppConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "device-registration-api";
const REGISTER_PATH: &str = "/Device/register";

/// Forwards logins to `POST {base_url}/Device/register`.
#[derive(Debug, Clone)]
pub struct HttpDeviceRegistrar {
    client: Client,
    register_url: String,
}

impl HttpDeviceRegistrar {
    /// Builds a registrar with explicit connect and read timeouts.
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, DevStatsError> {
        let client = create_client(connect_timeout, read_timeout)
            .map_err(|e| config_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Builds a registrar with the 10s connect and 30s read timeouts.
    pub fn with_default_timeouts(base_url: &str) -> Result<Self, DevStatsError> {
        let client = default_client()
            .map_err(|e| config_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Builds a registrar from the `registration_api` section of `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, DevStatsError> {
        let api = config
            .registration_api
            .as_ref()
            .ok_or_else(|| config_error("registration_api configuration is missing"))?;
        Self::new(
            &api.url,
            Duration::from_secs(api.connect_timeout_secs),
            Duration::from_secs(api.read_timeout_secs),
        )
    }

    fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            register_url: format!("{}{}", base_url.trim_end_matches('/'), REGISTER_PATH),
        }
    }

    pub fn register_url(&self) -> &str {
        &self.register_url
    }

    async fn send(
        &self,
        key: &RegistrationKey,
    ) -> Result<Option<DeviceRegistrationResponse>, DevStatsError> {
        debug!("POST {} for device type {}", self.register_url, key.device_type);

        let response = self
            .client
            .post(&self.register_url)
            .header(INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME)
            .json(key)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let reply = if body.is_empty() {
            None
        } else {
            serde_json::from_slice::<DeviceRegistrationResponse>(&body).ok()
        };

        if status.is_success() {
            if reply.is_none() {
                warn!(
                    "{} answered {} with an absent or unreadable body",
                    SERVICE_NAME, status
                );
            }
            return Ok(reply);
        }

        match reply {
            Some(reply) => {
                debug!("{} answered {} with {:?}", SERVICE_NAME, status, reply);
                Ok(Some(reply))
            }
            None => Err(external_service_error(
                SERVICE_NAME,
                format!("HTTP {} without a readable body", status),
            )),
        }
    }
}

impl DeviceRegistrar for HttpDeviceRegistrar {
    fn register<'a>(
        &'a self,
        key: &'a RegistrationKey,
    ) -> BoxFuture<'a, Option<DeviceRegistrationResponse>, DevStatsError> {
        Box::pin(self.send(key))
    }
}
