//! HTTP handlers for the internal device registration endpoint
//!
//! Every outcome is answered with a `{statusCode}` body whose value equals the
//! HTTP status:
//!
//! - 200: the registration was created or touched
//! - 400: validation failed, or a concurrent insert for the same pair won
//! - 500: any other storage failure

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::{IntoResponse, Response},
};
use devstats_common::{
    panic_message, DevStatsError, DeviceRegistrationRequest, DeviceRegistrationResponse,
};
use devstats_db::SqlDeviceRegistrationRepository;
use std::any::Any;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::service::DeviceRegistrationService;

/// Shared state for the registration handlers
#[derive(Clone)]
pub struct RegistrationState {
    pub service: Arc<DeviceRegistrationService<SqlDeviceRegistrationRepository>>,
}

/// Handler for `POST /Device/register`
///
/// Upserts the `(userKey, deviceType)` pair from the body. A body that is not
/// valid JSON, or not an object of the expected shape, is a validation error.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/Device/register",
    request_body = devstats_common::LoginRequest,
    params(
        ("X-Internal-Service" = Option<String>, Header, description = "Name of the calling service")
    ),
    responses(
        (status = 200, description = "Registration created or refreshed", body = DeviceRegistrationResponse),
        (status = 400, description = "Invalid input or lost insert race", body = DeviceRegistrationResponse),
        (status = 500, description = "Storage failure", body = DeviceRegistrationResponse)
    ),
    tag = "Device"
))]
pub async fn register_device_handler(
    State(state): State<Arc<RegistrationState>>,
    payload: Result<Json<DeviceRegistrationRequest>, JsonRejection>,
) -> DeviceRegistrationResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected unreadable registration body: {}", rejection.body_text());
            return DeviceRegistrationResponse::bad_request();
        }
    };

    match state.service.register_device(&request).await {
        Ok(outcome) => {
            let registration = outcome.registration();
            info!(
                "Registration {:?} for device type {} {}",
                registration.id,
                registration.device_type,
                if outcome.is_created() { "created" } else { "refreshed" }
            );
            DeviceRegistrationResponse::success()
        }
        Err(err) => {
            match &err {
                DevStatsError::ValidationError(reason) => {
                    warn!("Rejected device registration: {}", reason)
                }
                DevStatsError::ConflictError(reason) => {
                    warn!("Device registration lost an insert race: {}", reason)
                }
                other => error!("Device registration failed: {}", other),
            }
            DeviceRegistrationResponse::from_error(&err)
        }
    }
}

/// Answers a panicking registration handler with a 500 `{statusCode}` body.
pub fn registration_panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    error!(
        "Device registration handler panicked: {}",
        panic_message(payload.as_ref())
    );
    DeviceRegistrationResponse::internal_error().into_response()
}
