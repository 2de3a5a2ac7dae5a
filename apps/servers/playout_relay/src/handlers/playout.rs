use super::dispatch_playout;
use crate::error::{RelayError, DIRECT_PLAYOUT_POST_ONLY};
use crate::Config;
use axum::extract::{Query, State};
use axum::Json;
use playout_dispatch::{build_by_reference, build_direct, build_invoke, DirectPlayoutRequest, DispatchRouter, InvokeParams, ItemReference};
use std::sync::Arc;
use tracing::instrument;

#[axum::debug_handler(state = crate::AppState)]
#[instrument(name = "invoke_template_function", skip_all, fields(function = ?params.function, playserver = ?params.addressing.playserver))]
pub async fn invoke_template_function(State(router): State<DispatchRouter>, Query(params): Query<InvokeParams>) -> Result<String, RelayError> {
	let command = build_invoke(params)?;
	dispatch_playout(&router, command)
}

#[axum::debug_handler(state = crate::AppState)]
#[instrument(name = "direct_playout", skip_all, fields(template = ?request.relative_template_path, command = ?request.command))]
pub async fn direct_playout(State(router): State<DispatchRouter>, Json(request): Json<DirectPlayoutRequest>) -> Result<String, RelayError> {
	let command = build_direct(request)?;
	dispatch_playout(&router, command)
}

pub async fn direct_playout_get() -> RelayError {
	RelayError::PostOnly(DIRECT_PLAYOUT_POST_ONLY)
}

#[axum::debug_handler(state = crate::AppState)]
#[instrument(name = "control_rundown_item_by_id", skip_all, fields(file = ?reference.file, item = ?reference.item, command = ?reference.command))]
pub async fn control_rundown_item_by_id(
	State(router): State<DispatchRouter>,
	State(config): State<Arc<Config>>,
	Query(reference): Query<ItemReference>,
) -> Result<String, RelayError> {
	let command = build_by_reference(&config.dataroot, reference).map_err(RelayError::ItemControl)?;
	dispatch_playout(&router, command)
}
