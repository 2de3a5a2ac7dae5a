pub mod catalog;
pub mod controller;
pub mod health;
pub mod helpers;
pub mod playout;

use crate::error::RelayError;
use crate::metrics::{record_dispatch, DispatchKind};
use playout_dispatch::{ControllerEvent, DispatchRouter, PlayoutCommand};

/// Queues `command` and returns the acknowledgment text.
pub(crate) fn dispatch_playout(router: &DispatchRouter, command: PlayoutCommand) -> Result<String, RelayError> {
	let body = serde_json::to_string(&command)?;
	router.submit(command);
	record_dispatch(DispatchKind::Playout);
	Ok(format!("Sent request to playout server: {body}"))
}

/// Publishes `event` to controller clients and returns the acknowledgment text.
pub(crate) fn dispatch_controller(router: &DispatchRouter, event: ControllerEvent) -> Result<String, RelayError> {
	let body = serde_json::to_string(&event)?;
	router.publish(event);
	record_dispatch(DispatchKind::Controller);
	Ok(format!("Sent request to controller: {body}"))
}
