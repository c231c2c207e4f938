use axum::{middleware, routing::post, Router};
use devstats_db::SqlDeviceRegistrationRepository;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::auth::internal_service_middleware;
use crate::handlers::{register_device_handler, registration_panic_response, RegistrationState};
use crate::service::DeviceRegistrationService;

/// Router with `POST /Device/register`.
///
/// The repository's schema must already be initialised.
pub fn routes(repository: SqlDeviceRegistrationRepository) -> Router {
    let state = Arc::new(RegistrationState {
        service: Arc::new(DeviceRegistrationService::new(repository)),
    });

    info!("Device registration routes initialized");

    Router::new()
        .route("/Device/register", post(register_device_handler))
        .route_layer(middleware::from_fn(internal_service_middleware))
        .layer(CatchPanicLayer::custom(registration_panic_response))
        .with_state(state)
}
