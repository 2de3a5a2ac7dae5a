use axum::extract::FromRef;
use axum::Router;
use playout_dispatch::{DispatchRouter, EventHub, FsDocumentStore, IdentityResolver, OutboundQueue, OutboundReceiver, RundownCache};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod proxy;
pub mod routes;
pub mod websocket;

pub use config::*;
pub use error::{RelayError, UpstreamFetchError};
pub use proxy::FeedProxy;

/// Core: process-wide settings and lifecycle
#[derive(Clone)]
pub struct CoreContext {
	pub config: Arc<Config>,
	pub cancel_token: CancellationToken,
}

/// Dispatch: routing towards the playout backend and the connected clients
#[derive(Clone)]
pub struct DispatchContext {
	pub router: DispatchRouter,
	pub hub: EventHub,
	pub identity: Arc<IdentityResolver<FsDocumentStore>>,
}

/// External APIs: outbound fetches on behalf of clients
#[derive(Clone)]
pub struct ExternalApis {
	pub feed_proxy: FeedProxy,
}

#[derive(Clone)]
pub struct AppState {
	pub core: CoreContext,
	pub dispatch: DispatchContext,
	pub external: ExternalApis,
}

impl AppState {
	/// Wires the dispatch router to a fresh outbound queue and notification hub.
	/// The returned receiver must be drained by the backend worker.
	pub fn build(config: Arc<Config>, cancel_token: CancellationToken) -> anyhow::Result<(Self, OutboundReceiver)> {
		let (queue, outbound_rx) = OutboundQueue::new(config.backend_names(), config.playout_queue);
		let queue = Arc::new(queue);
		let hub = EventHub::new(config.event_buffer);

		let router = DispatchRouter::new(queue.clone(), queue, Arc::new(hub.clone()));
		let identity = Arc::new(IdentityResolver::new(FsDocumentStore, RundownCache::new()));

		let core = CoreContext {
			config: config.clone(),
			cancel_token,
		};
		let dispatch = DispatchContext { router, hub, identity };
		let external = ExternalApis {
			feed_proxy: FeedProxy::new(config.proxy_timeout())?,
		};

		Ok((Self { core, dispatch, external }, outbound_rx))
	}
}

impl FromRef<AppState> for Arc<Config> {
	fn from_ref(state: &AppState) -> Self {
		state.core.config.clone()
	}
}

impl FromRef<AppState> for DispatchRouter {
	fn from_ref(state: &AppState) -> Self {
		state.dispatch.router.clone()
	}
}

impl FromRef<AppState> for FeedProxy {
	fn from_ref(state: &AppState) -> Self {
		state.external.feed_proxy.clone()
	}
}

/// All routes with state applied. Middleware is added by the binary.
pub fn app(state: AppState) -> Router {
	Router::new()
		.nest("/api/v1", routes::api_v1())
		.merge(routes::system::system_routes())
		.with_state(state)
}
