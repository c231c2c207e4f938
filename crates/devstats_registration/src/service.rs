use devstats_common::{DevStatsError, DeviceRegistrationRequest};
use devstats_db::{DeviceRegistrationRepository, RegistrationOutcome};
use tracing::debug;

/// Validates registration requests and upserts them through the repository.
///
/// The only writer of `device_registrations`.
#[derive(Debug, Clone)]
pub struct DeviceRegistrationService<R> {
    repository: R,
}

impl<R> DeviceRegistrationService<R>
where
    R: DeviceRegistrationRepository + Send + Sync,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validate `request` and upsert the pair it names.
    ///
    /// # Errors
    ///
    /// * [`DevStatsError::ValidationError`] before the store is touched
    /// * [`DevStatsError::ConflictError`] when a concurrent insert won the race
    /// * [`DevStatsError::DatabaseError`] for any other storage failure
    pub async fn register_device(
        &self,
        request: &DeviceRegistrationRequest,
    ) -> Result<RegistrationOutcome, DevStatsError> {
        let key = request.validate()?;
        debug!("Registering device type {}", key.device_type);

        Ok(self.repository.upsert(&key).await?)
    }
}
