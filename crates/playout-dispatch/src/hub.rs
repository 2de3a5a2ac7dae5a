//! In-process fan-out of notifications to connected controller and renderer
//! clients, built on `async_broadcast`.
//!
//! Publishing never waits: when the buffer is full the oldest message is
//! dropped, and when nobody is subscribed the message is discarded.

use crate::event::Notification;
use crate::sink::NotificationSink;
use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct EventHub {
	sender: Sender<Notification>,
	// Holds the channel open while no client is connected.
	_keep_alive: InactiveReceiver<Notification>,
}

impl EventHub {
	/// `buffer_size` is the number of messages a slow subscriber may fall behind by.
	#[must_use]
	pub fn new(buffer_size: usize) -> Self {
		let (mut sender, receiver) = broadcast::<Notification>(buffer_size.max(1));
		sender.set_await_active(false);
		sender.set_overflow(true);

		Self {
			sender,
			_keep_alive: receiver.deactivate(),
		}
	}

	pub fn subscribe(&self) -> Receiver<Notification> {
		self.sender.new_receiver()
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}

	pub fn close(&self) -> bool {
		self.sender.close()
	}
}

impl NotificationSink for EventHub {
	fn publish(&self, notification: Notification) {
		let audience = notification.audience();
		match self.sender.try_broadcast(notification) {
			Ok(None) => debug!(?audience, subscribers = self.sender.receiver_count(), "Notification published"),
			Ok(Some(_dropped)) => warn!(?audience, "Notification buffer full, oldest message dropped"),
			Err(TrySendError::Inactive(_)) => debug!(?audience, "No subscribers, notification discarded"),
			Err(TrySendError::Closed(_)) => warn!(?audience, "Notification hub closed, message discarded"),
			Err(TrySendError::Full(_)) => warn!(?audience, "Notification buffer full, message discarded"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::{ControllerEvent, RendererEvent};

	#[tokio::test]
	async fn test_publish_reaches_every_subscriber() {
		let hub = EventHub::new(8);
		let mut rx1 = hub.subscribe();
		let mut rx2 = hub.subscribe();

		hub.publish(ControllerEvent::stop_all().into());

		assert_eq!(rx1.recv().await.unwrap(), Notification::Controller(ControllerEvent::stop_all()));
		assert_eq!(rx2.recv().await.unwrap(), Notification::Controller(ControllerEvent::stop_all()));
	}

	#[test]
	fn test_publish_without_subscribers_does_not_fail() {
		let hub = EventHub::new(8);
		assert_eq!(hub.subscriber_count(), 0);
		hub.publish(RendererEvent::clear_all_layers().into());
	}

	#[tokio::test]
	async fn test_overflow_drops_oldest() {
		let hub = EventHub::new(2);
		let mut rx = hub.subscribe();

		hub.publish(ControllerEvent::focus(crate::event::Focus::First).into());
		hub.publish(ControllerEvent::focus(crate::event::Focus::Next).into());
		hub.publish(ControllerEvent::focus(crate::event::Focus::Last).into());

		// First message was overwritten; receiver reports the overflow once.
		assert!(matches!(rx.recv().await, Err(async_broadcast::RecvError::Overflowed(1))));
		assert_eq!(rx.recv().await.unwrap(), Notification::Controller(ControllerEvent::focus(crate::event::Focus::Next)));
	}

	#[test]
	fn test_closed_hub_discards() {
		let hub = EventHub::new(4);
		let _rx = hub.subscribe();
		assert!(hub.close());
		hub.publish(ControllerEvent::stop_all().into());
	}
}
