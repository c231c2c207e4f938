//! Internal device registration service
//!
//! Exposes `POST /Device/register`, which validates a `{userKey, deviceType}`
//! pair and upserts it into `device_registrations` inside one transaction.
//! This is the only component that writes to the table.
//!
//! # Example
//!
//! ```rust,no_run
//! use devstats_db::{DbClient, DeviceRegistrationRepository, SqlDeviceRegistrationRepository};
//!
//! async fn build() -> Result<axum::Router, devstats_db::DbError> {
//!     let db_client = DbClient::from_url("sqlite://data/device_registrations.db").await?;
//!     let repository = SqlDeviceRegistrationRepository::new(db_client);
//!     repository.init_schema().await?;
//!     Ok(devstats_registration::routes(repository))
//! }
//! ```

pub mod auth;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod routes;
pub mod service;
#[cfg(test)]
mod service_test;

pub use routes::routes;
pub use service::DeviceRegistrationService;

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::DeviceRegistrationApiDoc;
}
