use crate::envelope::PlayoutCommand;
use crate::event::{ControllerEvent, Notification, RendererEvent};
use crate::sink::{BackendControl, NotificationSink, PlayoutSink};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// What a panic request managed to issue. All steps are best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanicReport {
	pub renderers_cleared: bool,
	pub controller_reset: bool,
	pub backend_clear_issued: bool,
}

/// Decides where each request goes and hands it to the matching sink.
#[derive(Clone)]
pub struct DispatchRouter {
	playout: Arc<dyn PlayoutSink>,
	backend: Arc<dyn BackendControl>,
	notifications: Arc<dyn NotificationSink>,
}

impl DispatchRouter {
	pub fn new(playout: Arc<dyn PlayoutSink>, backend: Arc<dyn BackendControl>, notifications: Arc<dyn NotificationSink>) -> Self {
		Self {
			playout,
			backend,
			notifications,
		}
	}

	/// Queues a playout command. Returns as soon as it is queued.
	pub fn submit(&self, command: PlayoutCommand) {
		self.playout.send(command);
	}

	pub fn publish(&self, event: ControllerEvent) {
		self.notifications.publish(Notification::Controller(event));
	}

	/// Emergency clear of every output.
	///
	/// Renderer and controller notifications go out first; the backend clear is
	/// only queued, so a slow backend never holds up the UI side.
	pub fn panic(&self, server: Option<String>) -> PanicReport {
		warn!(?server, "Panic requested, clearing all layers");

		self.notifications.publish(Notification::Renderer(RendererEvent::clear_all_layers()));
		self.notifications.publish(Notification::Controller(ControllerEvent::all_states_to_stopped()));

		let backend_clear_issued = self.backend.has_backends();
		if backend_clear_issued {
			self.backend.clear_channels(server);
		} else {
			info!("No playout backend configured, skipping channel clear");
		}

		PanicReport {
			renderers_cleared: true,
			controller_reset: true,
			backend_clear_issued,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::envelope::{build_direct, DirectPlayoutRequest};
	use crate::event::{Audience, ControllerOpcode, RendererCommand};
	use std::sync::Mutex;

	#[derive(Default)]
	struct Spy {
		commands: Mutex<Vec<PlayoutCommand>>,
		notifications: Mutex<Vec<Notification>>,
		clears: Mutex<Vec<Option<String>>>,
		backends: bool,
	}

	impl PlayoutSink for Spy {
		fn send(&self, command: PlayoutCommand) {
			self.commands.lock().unwrap().push(command);
		}
	}

	impl NotificationSink for Spy {
		fn publish(&self, notification: Notification) {
			self.notifications.lock().unwrap().push(notification);
		}
	}

	impl BackendControl for Spy {
		fn has_backends(&self) -> bool {
			self.backends
		}

		fn clear_channels(&self, server: Option<String>) {
			self.clears.lock().unwrap().push(server);
		}
	}

	fn router(spy: &Arc<Spy>) -> DispatchRouter {
		DispatchRouter::new(spy.clone(), spy.clone(), spy.clone())
	}

	#[test]
	fn test_submit_goes_to_playout_only() {
		let spy = Arc::new(Spy::default());
		router(&spy).submit(build_direct(DirectPlayoutRequest::default()).unwrap());

		assert_eq!(spy.commands.lock().unwrap().len(), 1);
		assert!(spy.notifications.lock().unwrap().is_empty());
	}

	#[test]
	fn test_publish_goes_to_controller_audience() {
		let spy = Arc::new(Spy::default());
		router(&spy).publish(ControllerEvent::stop_all());

		let notes = spy.notifications.lock().unwrap();
		assert_eq!(notes.len(), 1);
		assert_eq!(notes[0].audience(), Audience::Controller);
		assert!(spy.commands.lock().unwrap().is_empty());
	}

	#[test]
	fn test_panic_without_backend_publishes_both_events() {
		let spy = Arc::new(Spy::default());
		let report = router(&spy).panic(None);

		assert!(!report.backend_clear_issued);
		assert!(spy.clears.lock().unwrap().is_empty());

		let notes = spy.notifications.lock().unwrap();
		assert_eq!(notes.len(), 2);
		assert!(matches!(notes[0], Notification::Renderer(RendererEvent { command: RendererCommand::ClearAllLayers })));
		assert!(matches!(&notes[1], Notification::Controller(ev) if ev.opcode == ControllerOpcode::RundownAllStatesToStopped));
	}

	#[test]
	fn test_panic_with_backend_clears_exactly_once() {
		let spy = Arc::new(Spy { backends: true, ..Default::default() });
		let report = router(&spy).panic(Some("OVERLAY".into()));

		assert!(report.backend_clear_issued);
		assert_eq!(*spy.clears.lock().unwrap(), vec![Some("OVERLAY".to_string())]);
		assert_eq!(spy.notifications.lock().unwrap().len(), 2);
	}
}
