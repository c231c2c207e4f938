use axum::{middleware, Router};
use devstats_common::{logging, security_headers, shutdown_signal};
use devstats_config::{load_config, ServiceKind};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod app_state;

use app_state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config(ServiceKind::DeviceRegistration)?);
    logging::init_with_level_str(config.log_level());

    let state = AppState::init(config.clone()).await?;

    // Internal only: no CORS.
    #[allow(unused_mut)]
    let mut app = Router::new()
        .merge(devstats_registration::routes(state.repository.clone()))
        .merge(devstats_db::health_routes(state.db_client.clone()));

    #[cfg(feature = "openapi")]
    {
        use devstats_registration::openapi::DeviceRegistrationApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        app = app.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", DeviceRegistrationApiDoc::openapi()),
        );
    }

    let app = app
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Device registration API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Device registration API stopped");
    Ok(())
}
