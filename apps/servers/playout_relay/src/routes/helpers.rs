use crate::handlers::{controller::panic, helpers as routes};
use crate::AppState;
use axum::{
	http::{header::CONTENT_TYPE, Method},
	routing::get,
	Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn helper_routes() -> Router<AppState> {
	// Browser extensions read feeds from any origin.
	let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]).allow_headers([CONTENT_TYPE]);

	Router::new()
		.route("/feedproxy", get(routes::feed_proxy).layer(cors))
		.route("/panic", get(panic))
		.route("/changeItemID", get(routes::change_item_id))
}
