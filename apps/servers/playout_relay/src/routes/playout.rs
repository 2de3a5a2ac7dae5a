use crate::handlers::playout::{control_rundown_item_by_id, direct_playout, direct_playout_get, invoke_template_function};
use crate::AppState;
use axum::{routing::get, Router};

pub fn playout_routes() -> Router<AppState> {
	Router::new()
		.route("/invokeTemplateFunction", get(invoke_template_function))
		.route("/directplayout", get(direct_playout_get).post(direct_playout))
		.route("/controlRundownItemByID", get(control_rundown_item_by_id))
}
