use devstats_common::{
    DevStatsError, DeviceRegistrar, DeviceType, LoginRequest, LoginResponse, StatisticsResponse,
};
use devstats_db::DeviceRegistrationRepository;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Login recording and per-device-type counts.
///
/// Logins are forwarded through the [`DeviceRegistrar`]; counts are read from
/// the repository directly. Nothing here writes to the store.
pub struct StatisticsService<R> {
    registrar: Arc<dyn DeviceRegistrar>,
    repository: R,
}

impl<R> StatisticsService<R>
where
    R: DeviceRegistrationRepository + Send + Sync,
{
    pub fn new(registrar: Arc<dyn DeviceRegistrar>, repository: R) -> Self {
        Self {
            registrar,
            repository,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates a login and forwards it downstream, mapping the outcome:
    ///
    /// | downstream                               | reply |
    /// |------------------------------------------|-------|
    /// | `statusCode` 200                         | 200   |
    /// | `statusCode` 500                         | 500   |
    /// | any other `statusCode`, absent/bad body  | 400   |
    /// | transport failure                        | 500   |
    ///
    /// Invalid input is answered with 400 without calling downstream.
    pub async fn process_login(&self, request: &LoginRequest) -> LoginResponse {
        let key = match request.validate() {
            Ok(key) => key,
            Err(err) => {
                warn!("Rejected login: {}", err);
                return LoginResponse::from_error(&err);
            }
        };

        match self.registrar.register(&key).await {
            Ok(Some(reply)) => match reply.status_code {
                200 => {
                    info!("Login recorded for device type {}", key.device_type);
                    LoginResponse::success()
                }
                500 => {
                    error!("Device registration service reported an internal error");
                    LoginResponse::internal_error()
                }
                other => {
                    warn!("Device registration service rejected the login with {}", other);
                    LoginResponse::bad_request()
                }
            },
            Ok(None) => {
                warn!("Device registration service sent no usable reply");
                LoginResponse::bad_request()
            }
            Err(err) => {
                error!("Device registration service call failed: {}", err);
                LoginResponse::internal_error()
            }
        }
    }

    /// Counts registrations for `device_type`.
    ///
    /// A missing, blank or unknown device type is answered with the `-1`
    /// sentinel rather than an error.
    ///
    /// # Errors
    ///
    /// [`DevStatsError::DatabaseError`] when the count query fails.
    pub async fn device_statistics(
        &self,
        device_type: Option<&str>,
    ) -> Result<StatisticsResponse, DevStatsError> {
        let echo = device_type.map(str::to_string);

        let Some(parsed) = device_type.and_then(DeviceType::parse) else {
            debug!("Statistics requested for invalid device type {:?}", device_type);
            return Ok(StatisticsResponse::error(echo));
        };

        let count = self.repository.count_by_device_type(parsed).await?;
        Ok(StatisticsResponse::new(echo, count))
    }
}
