//! Streams hub notifications to controller and renderer clients.

use crate::AppState;
use async_broadcast::{Receiver, RecvError};
use axum::{
	extract::{
		ws::{Message, WebSocket, WebSocketUpgrade},
		Query, State,
	},
	response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use playout_dispatch::{Audience, Notification};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
	/// Only forward notifications for this audience. All of them when absent.
	pub audience: Option<Audience>,
}

#[instrument(name = "ws_connect", skip_all, fields(audience = ?query.audience))]
pub async fn ws_handler(ws: WebSocketUpgrade, Query(query): Query<WsQuery>, State(state): State<AppState>) -> impl IntoResponse {
	// Subscribe before the upgrade so nothing published in between is missed.
	let receiver = state.dispatch.hub.subscribe();
	let cancel_token = state.core.cancel_token.child_token();

	ws.on_upgrade(move |socket| forward_notifications(socket, receiver, query.audience, cancel_token))
}

fn wanted(filter: Option<Audience>, notification: &Notification) -> bool {
	filter.map_or(true, |audience| audience == notification.audience())
}

async fn forward_notifications(socket: WebSocket, mut events: Receiver<Notification>, filter: Option<Audience>, cancel_token: CancellationToken) {
	let (mut sender, mut inbound) = socket.split();
	let mut forwarded = 0u64;
	info!(audience = ?filter, "Websocket client connected");

	loop {
		tokio::select! {
			() = cancel_token.cancelled() => {
				let _ = sender.send(Message::Close(None)).await;
				break;
			}

			incoming = inbound.next() => match incoming {
				Some(Ok(Message::Close(_))) | None => break,
				Some(Ok(_)) => {}
				Some(Err(e)) => {
					warn!(error = %e, "Websocket receive error");
					break;
				}
			},

			event = events.recv() => match event {
				Ok(notification) => {
					if !wanted(filter, &notification) {
						continue;
					}

					let text = match serde_json::to_string(&notification) {
						Ok(text) => text,
						Err(e) => {
							error!(error = %e, "Failed to serialize notification");
							continue;
						}
					};

					if let Err(e) = sender.send(Message::Text(text)).await {
						debug!(error = %e, "Websocket send failed, closing");
						break;
					}
					forwarded += 1;
				}
				Err(RecvError::Overflowed(count)) => warn!(count, "Websocket client lagged behind, notifications skipped"),
				Err(RecvError::Closed) => break,
			},
		}
	}

	info!(forwarded, "Websocket client disconnected");
}
