//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tower_http::trace::TraceLayer;

use nudge_core::config::GatewaySection;
use nudge_core::types::IncomingMessage;
use nudge_store::{ScheduleStore, SubscriberStore};

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub start_time: std::time::Instant,
    /// "polling" or "webhook" — surfaced in the info route.
    pub delivery_mode: String,
    /// Inbound webhook calls must present this token in the path.
    pub bot_token: String,
    pub schedule: ScheduleStore,
    pub subscribers: SubscriberStore,
    /// Hands webhook updates to the command pipeline.
    pub updates_tx: UnboundedSender<IncomingMessage>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/info", get(super::routes::info))
        .route("/webhook/bot/{token}", post(super::routes::telegram_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(config: &GatewaySection, state: AppState) -> anyhow::Result<()> {
    let app = build_router(Arc::new(state));
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
