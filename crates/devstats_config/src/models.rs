use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/device_registrations.db, overridable with DATABASE_URL
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

// --- Internal registration service, as seen from the public service ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistrationApiConfig {
    pub url: String, // overridable with DEVICE_REGISTRATION_API_URL
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

// --- Main Application Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub registration_api: Option<RegistrationApiConfig>,
    pub logging: Option<LoggingConfig>,
}

impl AppConfig {
    /// Configuration with every default filled in for the given service.
    pub fn defaults_for(service: ServiceKind) -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: service.default_port(),
            },
            database: Some(DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: default_max_connections(),
                acquire_timeout_secs: default_acquire_timeout_secs(),
            }),
            registration_api: Some(RegistrationApiConfig {
                url: DEFAULT_REGISTRATION_API_URL.to_string(),
                connect_timeout_secs: default_connect_timeout_secs(),
                read_timeout_secs: default_read_timeout_secs(),
            }),
            logging: Some(LoggingConfig {
                level: DEFAULT_LOG_LEVEL.to_string(),
            }),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .map(|l| l.level.as_str())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Which of the two processes a configuration is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Public service answering `/Log/auth`.
    Statistics,
    /// Internal service owning writes to `device_registrations`.
    DeviceRegistration,
}

impl ServiceKind {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Statistics => 8080,
            ServiceKind::DeviceRegistration => 8081,
        }
    }

    /// Base name of the per-service config file under the config directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ServiceKind::Statistics => "statistics",
            ServiceKind::DeviceRegistration => "device_registration",
        }
    }

    /// Prefix for `PREFIX__SECTION__KEY` environment overrides.
    pub fn env_prefix(self) -> &'static str {
        match self {
            ServiceKind::Statistics => "STATISTICS",
            ServiceKind::DeviceRegistration => "DEVICE_REGISTRATION",
        }
    }
}

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/device_registrations.db";
pub const DEFAULT_REGISTRATION_API_URL: &str = "http://localhost:8081";
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    3
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    30
}
