//! Service abstractions.
//!
//! The public service reaches the internal one only through
//! [`DeviceRegistrar`], so the login flow can run against the real HTTP client
//! or an in-process stand-in.

use std::future::Future;
use std::pin::Pin;

use crate::error::DevStatsError;
use crate::models::{DeviceRegistrationResponse, RegistrationKey};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Forwards validated logins to the device registration service.
pub trait DeviceRegistrar: Send + Sync {
    /// Registers `key` downstream.
    ///
    /// * `Ok(Some(response))` - the service answered with a parseable body
    /// * `Ok(None)` - the exchange succeeded but the body was absent or malformed
    /// * `Err(_)` - transport failure: refused, timed out, or a non-2xx reply
    ///   without a parseable body
    fn register<'a>(
        &'a self,
        key: &'a RegistrationKey,
    ) -> BoxFuture<'a, Option<DeviceRegistrationResponse>, DevStatsError>;
}
