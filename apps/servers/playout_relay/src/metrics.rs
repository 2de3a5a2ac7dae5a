use axum::{
	body::Body,
	extract::MatchedPath,
	http::{header::CONTENT_TYPE, Request, Response, StatusCode},
	middleware::Next,
	response::IntoResponse,
};
use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder};

lazy_static! {
	static ref HTTP_REQUESTS_TOTAL: IntCounterVec =
		register_int_counter_vec!("http_requests_total", "Total number of HTTP requests", &["method", "route", "status"]).expect("Failed to register HTTP_REQUESTS_TOTAL");
	static ref HTTP_REQUEST_DURATION: HistogramVec =
		register_histogram_vec!("http_request_duration_seconds", "HTTP request duration in seconds", &["method", "route"]).expect("Failed to register HTTP_REQUEST_DURATION");
	static ref RELAY_DISPATCH_TOTAL: IntCounterVec =
		register_int_counter_vec!("relay_dispatch_total", "Requests handed to the dispatch router", &["kind"]).expect("Failed to register RELAY_DISPATCH_TOTAL");
	static ref RELAY_RENAME_TOTAL: IntCounterVec =
		register_int_counter_vec!("relay_rename_total", "Item ID change attempts by result", &["result"]).expect("Failed to register RELAY_RENAME_TOTAL");
}

/// Dispatch kinds counted by [`record_dispatch`].
#[derive(Debug, Clone, Copy)]
pub enum DispatchKind {
	Playout,
	Controller,
	Panic,
}

impl DispatchKind {
	const fn label(self) -> &'static str {
		match self {
			Self::Playout => "playout",
			Self::Controller => "controller",
			Self::Panic => "panic",
		}
	}
}

pub fn record_dispatch(kind: DispatchKind) {
	RELAY_DISPATCH_TOTAL.with_label_values(&[kind.label()]).inc();
}

/// `result` is `ok` or an `IdentityError::kind()` label.
pub fn record_rename(result: &str) {
	RELAY_RENAME_TOTAL.with_label_values(&[result]).inc();
}

/// Label used for requests no route matched. Client supplied paths would
/// otherwise open a new series each.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Route template, so `/item/play/:id` stays one series.
fn route_label<B>(req: &Request<B>) -> String {
	req.extensions().get::<MatchedPath>().map_or_else(|| UNMATCHED_ROUTE.to_string(), |matched| matched.as_str().to_string())
}

/// Counts every request and times it per method and route.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response<Body> {
	let method = req.method().to_string();
	let route = route_label(&req);

	let timer = HTTP_REQUEST_DURATION.with_label_values(&[&method, &route]).start_timer();
	let response = next.run(req).await;
	timer.observe_duration();

	HTTP_REQUESTS_TOTAL.with_label_values(&[&method, &route, response.status().as_str()]).inc();
	response
}

fn render_metrics() -> Result<(String, Vec<u8>), prometheus::Error> {
	let encoder = TextEncoder::new();
	let mut buffer = Vec::new();
	encoder.encode(&prometheus::gather(), &mut buffer)?;
	Ok((encoder.format_type().to_string(), buffer))
}

/// Text exposition of every registered metric.
pub async fn metrics_handler() -> Result<impl IntoResponse, StatusCode> {
	let (content_type, body) = render_metrics().map_err(|e| {
		tracing::error!(error = %e, "Failed to encode metrics");
		StatusCode::INTERNAL_SERVER_ERROR
	})?;
	Ok(([(CONTENT_TYPE, content_type)], body))
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{routing::get, Router};
	use tower::ServiceExt;

	#[test]
	fn test_relay_counters_are_exported() {
		record_dispatch(DispatchKind::Panic);
		record_rename("conflict");

		let (content_type, body) = render_metrics().unwrap();
		let text = String::from_utf8(body).unwrap();
		assert!(content_type.starts_with("text/plain"));
		assert!(text.contains("relay_dispatch_total{kind=\"panic\"}"));
		assert!(text.contains("relay_rename_total{result=\"conflict\"}"));
	}

	#[tokio::test]
	async fn test_requests_are_labelled_by_route_template() {
		let app = Router::new()
			.route("/item/play/:id", get(|| async { "ok" }))
			.layer(axum::middleware::from_fn(metrics_middleware));

		for uri in ["/item/play/one", "/item/play/two", "/no/such/route"] {
			let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
			app.clone().oneshot(request).await.unwrap();
		}

		let text = String::from_utf8(render_metrics().unwrap().1).unwrap();
		assert!(text.contains("route=\"/item/play/:id\",status=\"200\""));
		assert!(text.contains("route=\"unmatched\",status=\"404\""));
		assert!(!text.contains("/item/play/one"));
	}
}
