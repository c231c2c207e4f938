//! Logging setup shared by both service binaries.
//!
//! Installs a `tracing` subscriber that prints target, file and line for every
//! event and honours `RUST_LOG` on top of the configured level.

use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Targets that receive the configured level: the workspace crates and the
/// two binaries.
const APP_TARGETS: [&str; 3] = ["devstats", "statistics_api", "device_registration_api"];

/// Initialize the tracing subscriber at INFO.
///
/// # Examples
///
/// ```
/// use devstats_common::logging;
///
/// logging::init();
/// // Calling it again is harmless.
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber from a level name such as `"debug"`.
///
/// Unknown names fall back to INFO.
pub fn init_with_level_str(level: &str) {
    init_with_level(level.parse().unwrap_or(Level::INFO));
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Uses `try_init`, so a subscriber that is already installed (for example
/// by a test harness) is left in place.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    for target in APP_TARGETS {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }
    if let Ok(directive) = format!("tower_http={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
