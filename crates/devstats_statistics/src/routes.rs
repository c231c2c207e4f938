use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use devstats_common::DeviceRegistrar;
use devstats_db::SqlDeviceRegistrationRepository;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::handlers::{
    echo_device_type_on_panic, login_handler, login_panic_response, statistics_handler,
    statistics_panic_response, StatisticsState,
};
use crate::service::StatisticsService;

/// Create the public statistics routes
///
/// * `POST /Log/auth` forwards logins through `registrar`
/// * `GET /Log/auth/statistics` counts rows through `repository`
///
/// Each route answers a panic with its own response shape.
pub fn routes(
    repository: SqlDeviceRegistrationRepository,
    registrar: Arc<dyn DeviceRegistrar>,
) -> Router {
    let state = Arc::new(StatisticsState {
        service: Arc::new(StatisticsService::new(registrar, repository)),
    });

    info!("Statistics routes initialized");

    Router::new()
        .route(
            "/Log/auth",
            post(login_handler).layer(CatchPanicLayer::custom(login_panic_response)),
        )
        .route(
            "/Log/auth/statistics",
            get(statistics_handler)
                .layer(CatchPanicLayer::custom(statistics_panic_response))
                .layer(middleware::from_fn(echo_device_type_on_panic)),
        )
        .with_state(state)
}
