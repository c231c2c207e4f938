//! HTTP handlers for the public statistics endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, Request, State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use devstats_common::{panic_message, LoginRequest, LoginResponse, StatisticsResponse};
use devstats_db::SqlDeviceRegistrationRepository;
use serde::Deserialize;
use std::any::Any;
use std::sync::Arc;
use tracing::{error, warn};

use crate::service::StatisticsService;

/// Shared state for the statistics handlers
#[derive(Clone)]
pub struct StatisticsState {
    pub service: Arc<StatisticsService<SqlDeviceRegistrationRepository>>,
}

/// Query string of `GET /Log/auth/statistics`
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct StatisticsQuery {
    /// One of `iOS`, `Android`, `Watch`, `TV`
    #[serde(rename = "deviceType")]
    pub device_type: Option<String>,
}

/// Handler for `POST /Log/auth`
///
/// # Responses
///
/// - 200 OK: the login was recorded downstream
/// - 400 Bad Request: invalid input, or the registration service refused it
/// - 500 Internal Server Error: the registration service failed or could not be reached
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/Log/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login recorded", body = LoginResponse),
        (status = 400, description = "Invalid input", body = LoginResponse),
        (status = 500, description = "Registration service failure", body = LoginResponse)
    ),
    tag = "Log"
))]
pub async fn login_handler(
    State(state): State<Arc<StatisticsState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> LoginResponse {
    match payload {
        Ok(Json(request)) => state.service.process_login(&request).await,
        Err(rejection) => {
            warn!("Rejected unreadable login body: {}", rejection.body_text());
            LoginResponse::bad_request()
        }
    }
}

/// Handler for `GET /Log/auth/statistics`
///
/// Always answers 200 for invalid device types, with `count = -1`. Only a
/// failing count query produces a 500, again with `count = -1`.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/Log/auth/statistics",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Count, or -1 for an invalid device type", body = StatisticsResponse),
        (status = 500, description = "Count query failed", body = StatisticsResponse)
    ),
    tag = "Log"
))]
pub async fn statistics_handler(
    State(state): State<Arc<StatisticsState>>,
    query: Result<Query<StatisticsQuery>, QueryRejection>,
) -> Response {
    let device_type = match query {
        Ok(Query(query)) => query.device_type,
        Err(rejection) => {
            warn!("Unreadable statistics query: {}", rejection.body_text());
            None
        }
    };

    match state.service.device_statistics(device_type.as_deref()).await {
        Ok(statistics) => (StatusCode::OK, Json(statistics)).into_response(),
        Err(err) => {
            error!("Statistics query failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatisticsResponse::error(device_type)),
            )
                .into_response()
        }
    }
}

pub fn login_panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    error!("Login handler panicked: {}", panic_message(payload.as_ref()));
    LoginResponse::internal_error().into_response()
}

/// Marks a response produced by [`statistics_panic_response`].
#[derive(Debug, Clone, Copy)]
pub struct StatisticsPanicked;

/// Answers a panicking statistics handler with 500 and `count = -1`.
///
/// The panic payload carries no request data, so the body's `deviceType` is
/// filled in by [`echo_device_type_on_panic`] further out.
pub fn statistics_panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    error!(
        "Statistics handler panicked: {}",
        panic_message(payload.as_ref())
    );
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatisticsResponse::error(None)),
    )
        .into_response();
    response.extensions_mut().insert(StatisticsPanicked);
    response
}

/// Rewrites a [`StatisticsPanicked`] response so it echoes the request's
/// `deviceType`, like every other statistics reply.
pub async fn echo_device_type_on_panic(req: Request, next: Next) -> Response {
    let device_type = Query::<StatisticsQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(query)| query.device_type);

    let response = next.run(req).await;
    if response.extensions().get::<StatisticsPanicked>().is_none() {
        return response;
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatisticsResponse::error(device_type)),
    )
        .into_response()
}
