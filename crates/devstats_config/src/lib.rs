//! Runtime configuration for the statistics and device registration services.
//!
//! Both processes read the same layered sources; [`ServiceKind`] selects the
//! per-service defaults, the per-service config file and the env prefix.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod models;

pub use models::*;

/// Load the configuration for `service`, reading files from `CONFIG_DIR`
/// (default `config`).
pub fn load_config(service: ServiceKind) -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    load_config_from(service, &config_dir)
}

/// Load the configuration for `service` from an explicit config directory.
///
/// Sources, lowest precedence first:
///
/// * built-in defaults for the service
/// * `{config_dir}/default.*`
/// * `{config_dir}/{service}.*`
/// * `{config_dir}/{RUN_ENV}.*`
/// * `{PREFIX}__SECTION__KEY` environment variables
/// * `DATABASE_URL`, `DEVICE_REGISTRATION_API_URL` and `SERVER_PORT`
pub fn load_config_from(service: ServiceKind, config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| service.env_prefix().to_string());

    let default_path = config_dir.join("default");
    let service_path = config_dir.join(service.file_name());
    let env_path = config_dir.join(&run_env);

    debug!(
        "Loading {:?} configuration from {} (RUN_ENV={}, PREFIX={})",
        service,
        config_dir.display(),
        run_env,
        prefix
    );

    let builder = Config::builder()
        .set_default("server.host", DEFAULT_HOST)?
        .set_default("server.port", i64::from(service.default_port()))?
        .set_default("database.url", DEFAULT_DATABASE_URL)?
        .set_default("registration_api.url", DEFAULT_REGISTRATION_API_URL)?
        .set_default("logging.level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&service_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", env::var("DATABASE_URL").ok())?
        .set_override_option(
            "registration_api.url",
            env::var("DEVICE_REGISTRATION_API_URL").ok(),
        )?
        .set_override_option("server.port", env::var("SERVER_PORT").ok())?;

    builder.build()?.try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the `.env` file into the process environment once.
///
/// The file name can be overridden with `DOTENV_OVERRIDE`. A missing file is
/// not an error. Returns the path that was tried.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
