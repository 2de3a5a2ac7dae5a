//! One-way capabilities the router dispatches into.
//!
//! None of these return a result: implementations enqueue and return
//! immediately, logging their own failures. Nothing downstream can report
//! back to the caller that triggered the send.

use crate::envelope::PlayoutCommand;
use crate::event::Notification;

pub trait PlayoutSink: Send + Sync {
	fn send(&self, command: PlayoutCommand);
}

pub trait NotificationSink: Send + Sync {
	fn publish(&self, notification: Notification);
}

pub trait BackendControl: Send + Sync {
	/// Whether at least one playout backend connection is configured.
	fn has_backends(&self) -> bool;

	/// Clear every channel on `server`, or on all configured servers when `None`.
	fn clear_channels(&self, server: Option<String>);
}
