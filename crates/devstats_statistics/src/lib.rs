//! Public login statistics service
//!
//! This crate provides the two public endpoints:
//!
//! - `POST /Log/auth` - validate a login and forward it to the internal
//!   device registration service
//! - `GET /Log/auth/statistics?deviceType=...` - count registrations for a
//!   device type, read straight from the shared store
//!
//! The forwarding hop goes through [`devstats_common::DeviceRegistrar`];
//! [`HttpDeviceRegistrar`] is the production implementation.

pub mod client;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
pub mod routes;
pub mod service;

pub use client::HttpDeviceRegistrar;
pub use routes::routes;
pub use service::StatisticsService;

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::StatisticsApiDoc;
}
