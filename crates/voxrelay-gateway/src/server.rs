//! Axum-based HTTP server.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::routes;
use crate::state::GatewayState;

/// Build the full application router.
///
/// API routes are registered before the landing page so they win over it.
pub fn router(state: Arc<GatewayState>) -> Router {
    let static_dir = state.config.static_dir();
    let body_limit = state.config.max_upload_bytes();

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/generate-voice", post(routes::generate_voice))
        .route("/echo", post(routes::echo))
        .route("/agent/chat/{session_id}", post(routes::agent_chat));

    #[cfg(feature = "metrics")]
    let app = app.route("/metrics", get(crate::metrics::metrics_handler));

    app.with_state(state)
        .nest_service("/static", ServeDir::new(static_dir))
        .merge(voxrelay_web::ui_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

/// Start the gateway and serve until Ctrl+C.
pub async fn start_gateway(state: Arc<GatewayState>, port: u16) -> anyhow::Result<()> {
    let bind_addr = state.config.gateway_bind();
    let static_dir = state.config.static_dir();
    if !static_dir.is_dir() {
        warn!(
            "Static directory {} not found; fallback audio will not be served",
            static_dir.display()
        );
    }

    #[cfg(feature = "metrics")]
    crate::metrics::prometheus_handle();

    let app = router(state);

    let addr = format!("{bind_addr}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
