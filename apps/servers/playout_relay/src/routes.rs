pub mod helpers;
pub mod playout;
pub mod rundown;
pub mod system;

use crate::handlers::catalog::api_index;
use crate::AppState;
use axum::{routing::get, Router};

/// Everything mounted under `/api/v1`.
pub fn api_v1() -> Router<AppState> {
	Router::new()
		.route("/", get(api_index))
		.merge(playout::playout_routes())
		.merge(rundown::rundown_routes())
		.merge(rundown::item_routes())
		.merge(helpers::helper_routes())
}
