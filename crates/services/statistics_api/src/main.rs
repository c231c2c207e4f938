use axum::{middleware, Router};
use devstats_common::{logging, security_headers, shutdown_signal};
use devstats_config::{load_config, ServiceKind};
use http::{header, HeaderName, Method};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod app_state;

use app_state::AppState;

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-internal-service"),
        ])
        .max_age(Duration::from_secs(3600))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config(ServiceKind::Statistics)?);
    logging::init_with_level_str(config.log_level());

    let state = AppState::init(config.clone()).await?;

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new()
        .merge(devstats_statistics::routes(
            state.repository.clone(),
            state.registrar.clone(),
        ))
        .merge(devstats_db::health_routes(state.db_client.clone()));

    #[cfg(feature = "openapi")]
    {
        use devstats_statistics::openapi::StatisticsApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /swagger-ui");
        app = app.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", StatisticsApiDoc::openapi()),
        );
    }

    let app = app
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer());

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Statistics API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Statistics API stopped");
    Ok(())
}
