use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use devstats_common::INTERNAL_SERVICE_HEADER;
use tracing::{debug, warn};

/// Notes which service made the call.
///
/// The `X-Internal-Service` marker is advisory: a missing or blank header is
/// logged at warn level and the request still goes through.
pub async fn internal_service_middleware(req: Request, next: Next) -> Response {
    match calling_service(req.headers()) {
        Some(caller) => debug!("{} {} called by {}", req.method(), req.uri().path(), caller),
        None => warn!(
            "{} {} called without {} header",
            req.method(),
            req.uri().path(),
            INTERNAL_SERVICE_HEADER
        ),
    }

    next.run(req).await
}

/// The trimmed `X-Internal-Service` value, or `None` when it is absent, blank
/// or not visible ASCII.
pub fn calling_service(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(INTERNAL_SERVICE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|caller| !caller.is_empty())
}
