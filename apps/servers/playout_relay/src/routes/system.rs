use crate::handlers::health::health;
use crate::metrics::metrics_handler;
use crate::websocket::ws_handler;
use crate::AppState;
use axum::{routing::get, Router};

/// Health, metrics and the notification websocket, outside `/api/v1`.
pub fn system_routes() -> Router<AppState> {
	Router::new()
		.route("/health", get(health))
		.route("/metrics", get(metrics_handler))
		.route("/ws", get(ws_handler))
}
