use crate::handlers::controller as routes;
use crate::AppState;
use axum::{routing::get, Router};

pub fn rundown_routes() -> Router<AppState> {
	Router::new()
		.route("/rundown/load", get(routes::rundown_load))
		.route("/rundown/focusFirst", get(routes::focus_first))
		.route("/rundown/focusNext", get(routes::focus_next))
		.route("/rundown/focusPrevious", get(routes::focus_previous))
		.route("/rundown/focusLast", get(routes::focus_last))
		.route("/rundown/stopAllLayers", get(routes::stop_all_layers))
}

pub fn item_routes() -> Router<AppState> {
	Router::new()
		.route("/item/play", get(routes::item_play))
		.route("/item/play/:id", get(routes::item_play_id))
		.route("/item/continue", get(routes::item_continue))
		.route("/item/continue/:id", get(routes::item_continue_id))
		.route("/item/stop", get(routes::item_stop))
		.route("/item/stop/:id", get(routes::item_stop_id))
}
