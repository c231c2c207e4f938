use utoipa::OpenApi;

use devstats_common::{DeviceRegistrationResponse, DeviceType, LoginRequest};
use devstats_db::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Device Registration API",
        version = "0.1.0",
        description = "Internal service that owns writes to device_registrations"
    ),
    paths(crate::handlers::register_device_handler),
    components(schemas(
        LoginRequest,
        DeviceRegistrationResponse,
        DeviceType,
        HealthResponse,
    )),
    tags(
        (name = "Device", description = "Device registration upserts")
    )
)]
pub struct DeviceRegistrationApiDoc;
