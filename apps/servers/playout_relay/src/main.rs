use anyhow::Result;
use axum::{error_handling::HandleErrorLayer, extract::Request, ServiceExt};
use clap::Parser;
use playout_dispatch::run_outbound_worker;
use playout_relay::{app, backend::RelayBackend, metrics, AppState, Config, RelayError};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, time::Duration};
use tokio_util::sync::CancellationToken;
use tower::{limit::ConcurrencyLimitLayer, load_shed::LoadShedLayer, timeout::TimeoutLayer, BoxError, Layer, ServiceBuilder};
use tower_http::{limit::RequestBodyLimitLayer, normalize_path::NormalizePathLayer, trace::TraceLayer};
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, util::SubscriberInitExt, Layer as _};

const DEFAULT_LOG_FILTER: &str = "playout_relay=info,playout_dispatch=info";

async fn handle_tower_error(error: BoxError) -> RelayError {
	if error.is::<tower::timeout::error::Elapsed>() {
		tracing::warn!("Request timeout: {}", error);
		RelayError::RequestTimeout
	} else if error.is::<tower::load_shed::error::Overloaded>() {
		tracing::warn!("Service overloaded: {}", error);
		RelayError::ServiceOverloaded
	} else {
		tracing::error!("Unhandled tower error: {}", error);
		RelayError::TowerError(error)
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let config = Config::parse();

	init_tracing(&config);

	let config = Arc::new(config);
	let shutdown_token = CancellationToken::new();

	let (app_state, outbound_rx) = AppState::build(config.clone(), shutdown_token.clone())?;

	let backend = Arc::new(RelayBackend::from_config(&config)?);
	let worker = tokio::spawn(run_outbound_worker(outbound_rx, backend, shutdown_token.clone()));
	tracing::info!(playout_url = %config.playout_url, servers = ?config.backend_names(), "Backend worker spawned");

	let app = app(app_state.clone()).layer(
		ServiceBuilder::new()
			.layer(axum::middleware::from_fn(metrics::metrics_middleware))
			.layer(TraceLayer::new_for_http())
			.layer(HandleErrorLayer::new(|error: BoxError| async move { handle_tower_error(error).await }))
			.layer(LoadShedLayer::new())
			.layer(ConcurrencyLimitLayer::new(config.max_concurrent_req))
			.layer(TimeoutLayer::new(config.request_timeout()))
			.layer(RequestBodyLimitLayer::new(config.max_request_kb * 1024)),
	);

	// Controllers call both `/rundown/load` and `/rundown/load/`.
	let app = NormalizePathLayer::trim_trailing_slash().layer(app);

	let listener = TcpListener::bind(config.bind_addr()).await?;
	tracing::info!("listening on {}", listener.local_addr()?);

	let signal_shutdown_token = shutdown_token.clone();
	tokio::spawn(async move {
		tokio::signal::ctrl_c().await.ok();
		tracing::info!("Received Ctrl+C, initiating shutdown...");
		signal_shutdown_token.cancel();
	});

	let server_token = shutdown_token.clone();
	axum::serve(listener, ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app))
		.with_graceful_shutdown(async move {
			server_token.cancelled().await;
		})
		.await?;
	tracing::info!("Server stopped");

	let cleanup = async {
		app_state.dispatch.hub.close();
		tracing::info!("Notification hub closed");

		match worker.await {
			Ok(handled) => tracing::info!(handled, "Backend worker finished"),
			Err(e) => tracing::error!("Backend worker panicked: {}", e),
		}
	};

	match tokio::time::timeout(Duration::from_secs(5), cleanup).await {
		Ok(()) => tracing::info!("Graceful shutdown completed"),
		Err(_) => tracing::error!("Shutdown timeout - forcing exit"),
	}

	Ok(())
}

fn init_tracing(config: &Config) {
	use tracing_subscriber::layer::SubscriberExt;

	let directives = config.rust_log.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
	let filter = EnvFilter::try_new(directives).unwrap_or_else(|e| {
		eprintln!("Invalid RUST_LOG `{directives}` ({e}), using `{DEFAULT_LOG_FILTER}`");
		EnvFilter::new(DEFAULT_LOG_FILTER)
	});

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.init();
}
