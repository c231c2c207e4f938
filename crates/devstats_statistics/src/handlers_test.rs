#[cfg(test)]
mod tests {
    use crate::handlers::{echo_device_type_on_panic, statistics_panic_response};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Json, Router,
    };
    use devstats_common::StatisticsResponse;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn exploding_count() -> Json<StatisticsResponse> {
        panic!("count query exploded");
    }

    async fn fixed_count() -> Json<StatisticsResponse> {
        Json(StatisticsResponse::new(Some("iOS".to_string()), 7))
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/Log/auth/statistics",
                get(exploding_count)
                    .layer(CatchPanicLayer::custom(statistics_panic_response))
                    .layer(middleware::from_fn(echo_device_type_on_panic)),
            )
            .route(
                "/counted",
                get(fixed_count)
                    .layer(CatchPanicLayer::custom(statistics_panic_response))
                    .layer(middleware::from_fn(echo_device_type_on_panic)),
            )
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_panic_reply_echoes_device_type() {
        let (status, body) = get_json("/Log/auth/statistics?deviceType=Watch").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "deviceType": "Watch", "count": -1 }));
    }

    #[tokio::test]
    async fn test_panic_reply_without_device_type_is_null() {
        let (status, body) = get_json("/Log/auth/statistics").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "deviceType": null, "count": -1 }));
    }

    #[tokio::test]
    async fn test_regular_replies_pass_through_untouched() {
        let (status, body) = get_json("/counted?deviceType=Watch").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "deviceType": "iOS", "count": 7 }));
    }
}
