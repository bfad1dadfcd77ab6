//! Route handlers for the gateway.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use nudge_channels::TelegramUpdate;

use super::server::AppState;

/// Health check endpoint — the uptime monitor polls this.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "nudge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Status endpoint.
pub async fn info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = state.start_time.elapsed();
    Json(serde_json::json!({
        "service": "nudge",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime.as_secs(),
        "delivery_mode": state.delivery_mode,
        "subscribers": state.subscribers.load().len(),
        "scheduled_tasks": state.schedule.load_or_empty().total(),
    }))
}

/// Telegram webhook inbound — the push delivery variant.
///
/// The platform proves itself by calling the bot-token path; anything else
/// is rejected. Updates that do not carry a usable text message are
/// acknowledged and dropped.
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(update): Json<TelegramUpdate>,
) -> (StatusCode, Json<serde_json::Value>) {
    if token != state.bot_token {
        tracing::warn!("🚫 Webhook call with a wrong token rejected");
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"ok": false, "error": "unknown token"})),
        );
    }

    if let Some(message) = update.to_incoming()
        && state.updates_tx.send(message).is_err()
    {
        tracing::error!("❌ Update pipeline closed; dropping webhook update");
    }

    (StatusCode::OK, Json(serde_json::json!({"ok": true})))
}
