//! Shared building blocks for the statistics and device registration services.

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Wire contracts and the registration entity
#[cfg(test)]
mod models_test;
pub mod services; // Service abstractions

pub use error::{
    config_error, conflict, external_service_error, internal_error, validation_error,
    DevStatsError, HttpStatusCode,
};

pub use http::{
    client::{create_client, default_client},
    panic_message, security_headers, shutdown_signal,
};

pub use models::{
    is_valid_device_type, DeviceRegistration, DeviceRegistrationRequest,
    DeviceRegistrationResponse, DeviceType, LoginRequest, LoginResponse, RegistrationKey,
    StatisticsResponse, ERROR_COUNT, INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME,
    MAX_USER_KEY_LENGTH,
};

pub use services::{BoxFuture, DeviceRegistrar};
