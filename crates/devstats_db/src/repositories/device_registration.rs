//! Repository for device registrations
//!
//! One row per `(userKey, deviceType)` pair. Rows are created on the first
//! login for a pair and touched on every later one; they are never deleted.

use crate::error::DbError;
use devstats_common::{DeviceRegistration, DeviceType, RegistrationKey};

/// What an upsert did to the row for its pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// No row existed; one was inserted.
    Created(DeviceRegistration),
    /// The existing row had its `updated_at` refreshed.
    Touched(DeviceRegistration),
}

impl RegistrationOutcome {
    pub fn registration(&self) -> &DeviceRegistration {
        match self {
            RegistrationOutcome::Created(r) | RegistrationOutcome::Touched(r) => r,
        }
    }

    pub fn into_registration(self) -> DeviceRegistration {
        match self {
            RegistrationOutcome::Created(r) | RegistrationOutcome::Touched(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, RegistrationOutcome::Created(_))
    }
}

/// Storage operations on the `device_registrations` table.
pub trait DeviceRegistrationRepository {
    /// Create the table, its unique constraint and its indexes if missing.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Insert-if-absent, touch-if-present, inside one write transaction.
    ///
    /// Concurrent upserts are serialised on the store's write lock.
    ///
    /// # Errors
    ///
    /// [`DbError::UniqueViolation`] when an insert for the same pair landed
    /// first anyway. The call is not retried.
    fn upsert(
        &self,
        key: &RegistrationKey,
    ) -> impl std::future::Future<Output = Result<RegistrationOutcome, DbError>> + Send;

    /// Look up the row for one pair.
    fn find_by_user_and_device(
        &self,
        user_key: &str,
        device_type: DeviceType,
    ) -> impl std::future::Future<Output = Result<Option<DeviceRegistration>, DbError>> + Send;

    /// Number of rows, and therefore distinct user keys, for a device type.
    fn count_by_device_type(
        &self,
        device_type: DeviceType,
    ) -> impl std::future::Future<Output = Result<i64, DbError>> + Send;
}
