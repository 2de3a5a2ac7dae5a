use super::dispatch_controller;
use crate::error::RelayError;
use crate::metrics::{record_dispatch, DispatchKind};
use axum::extract::{Path, Query, State};
use axum::Json;
use playout_dispatch::{ControllerEvent, DispatchRouter, Focus, ItemAction};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub struct LoadQuery {
	pub file: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PanicQuery {
	pub server: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PanicResponse {
	pub message: &'static str,
}

pub const PANIC_MESSAGE: &str = "Panic executed. Layers cleared forcefully.";

#[instrument(name = "rundown_load", skip_all, fields(file = ?query.file))]
pub async fn rundown_load(State(router): State<DispatchRouter>, Query(query): Query<LoadQuery>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::load(query.file))
}

pub async fn focus_first(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::focus(Focus::First))
}

pub async fn focus_next(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::focus(Focus::Next))
}

pub async fn focus_previous(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::focus(Focus::Previous))
}

pub async fn focus_last(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::focus(Focus::Last))
}

pub async fn stop_all_layers(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::stop_all())
}

// Without an ID the controller acts on the focused item.

pub async fn item_play(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::item(ItemAction::Play, None))
}

pub async fn item_play_id(State(router): State<DispatchRouter>, Path(id): Path<String>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::item(ItemAction::Play, Some(id)))
}

pub async fn item_continue(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::item(ItemAction::Continue, None))
}

pub async fn item_continue_id(State(router): State<DispatchRouter>, Path(id): Path<String>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::item(ItemAction::Continue, Some(id)))
}

pub async fn item_stop(State(router): State<DispatchRouter>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::item(ItemAction::Stop, None))
}

pub async fn item_stop_id(State(router): State<DispatchRouter>, Path(id): Path<String>) -> Result<String, RelayError> {
	dispatch_controller(&router, ControllerEvent::item(ItemAction::Stop, Some(id)))
}

#[axum::debug_handler(state = crate::AppState)]
#[instrument(name = "panic", skip_all, fields(server = ?query.server))]
pub async fn panic(State(router): State<DispatchRouter>, Query(query): Query<PanicQuery>) -> Json<PanicResponse> {
	let server = query.server.filter(|s| !s.is_empty());
	let report = router.panic(server);
	record_dispatch(DispatchKind::Panic);

	info!(?report, "Panic executed");
	Json(PanicResponse { message: PANIC_MESSAGE })
}
