use utoipa::OpenApi;

use devstats_common::{DeviceType, LoginRequest, LoginResponse, StatisticsResponse};
use devstats_db::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Statistics API",
        version = "0.1.0",
        description = "Records user logins and reports registrations per device type"
    ),
    paths(
        crate::handlers::login_handler,
        crate::handlers::statistics_handler,
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        StatisticsResponse,
        DeviceType,
        HealthResponse,
    )),
    tags(
        (name = "Log", description = "Login events and device statistics")
    )
)]
pub struct StatisticsApiDoc;
