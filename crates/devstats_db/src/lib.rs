//! Storage for device registrations
//!
//! This crate owns the `device_registrations` table: the SQLx connection pool,
//! the schema, and the repository both services use. Reads and writes go
//! through [`DeviceRegistrationRepository`]; only the device registration
//! service calls [`DeviceRegistrationRepository::upsert`].
//!
//! # Example
//!
//! ```rust,no_run
//! use devstats_common::{DeviceType, RegistrationKey};
//! use devstats_db::{
//!     DbClient, DeviceRegistrationRepository, DeviceRegistrationRepositoryFactory,
//!     RepositoryFactory,
//! };
//!
//! async fn record_login() -> Result<i64, devstats_db::DbError> {
//!     let db_client = DbClient::from_url("sqlite://data/device_registrations.db").await?;
//!     let repository = DeviceRegistrationRepositoryFactory::new().create_repository(db_client);
//!     repository.init_schema().await?;
//!     repository
//!         .upsert(&RegistrationKey::new("u1", DeviceType::Ios))
//!         .await?;
//!     repository.count_by_device_type(DeviceType::Ios).await
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod health;
pub mod repositories;
pub mod repository;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use factory::DbClientFactory;
pub use health::health_routes;
pub use repository::RepositoryFactory;

pub use repositories::{
    DeviceRegistrationRepository, DeviceRegistrationRepositoryFactory, RegistrationOutcome,
    SqlDeviceRegistrationRepository,
};
