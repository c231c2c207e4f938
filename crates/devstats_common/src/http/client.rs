use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Connect timeout for service-to-service calls, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Timeout for the whole exchange after connecting, in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Creates an HTTP client for calls between the services.
///
/// # Arguments
///
/// * `connect_timeout` - How long to wait for the TCP/TLS connection
/// * `read_timeout` - Upper bound for the whole request once sent
///
/// Redirects are not followed; the internal service never issues them.
pub fn create_client(
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, ReqwestError> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(read_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// [`create_client`] with the default 10s connect and 30s read timeouts.
pub fn default_client() -> Result<Client, ReqwestError> {
    create_client(
        Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
    )
}
