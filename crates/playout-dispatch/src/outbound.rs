//! Fire-and-forget queues towards the playout backend.
//!
//! Request handlers push messages through [`OutboundQueue`] and return straight
//! away. Playout commands go through a bounded queue and are delivered in order.
//! Channel clears have their own queue and are drained concurrently, so a clear
//! never waits behind a slow playout delivery.

use crate::envelope::PlayoutCommand;
use crate::error::DeliveryError;
use crate::sink::{BackendControl, PlayoutSink};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::mpsc::{channel, unbounded_channel, Receiver, Sender, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_PLAYOUT_QUEUE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
	Playout(PlayoutCommand),
	ClearChannels { server: Option<String> },
}

#[derive(Clone)]
pub struct OutboundQueue {
	playout: Sender<PlayoutCommand>,
	clears: UnboundedSender<Option<String>>,
	backends: Arc<[String]>,
}

/// Receiving half of an [`OutboundQueue`], drained by [`run_outbound_worker`].
pub struct OutboundReceiver {
	playout: Receiver<PlayoutCommand>,
	clears: UnboundedReceiver<Option<String>>,
}

impl OutboundReceiver {
	/// Takes the next pending message without waiting. Clears come first.
	pub fn try_recv(&mut self) -> Result<Outbound, TryRecvError> {
		if let Ok(server) = self.clears.try_recv() {
			return Ok(Outbound::ClearChannels { server });
		}
		self.playout.try_recv().map(Outbound::Playout)
	}
}

impl OutboundQueue {
	/// `backends` are the names of the configured backend connections. At most
	/// `capacity` playout commands wait for delivery; newer ones are dropped.
	pub fn new(backends: Vec<String>, capacity: usize) -> (Self, OutboundReceiver) {
		let (playout, playout_rx) = channel(capacity.max(1));
		let (clears, clears_rx) = unbounded_channel();
		let queue = Self {
			playout,
			clears,
			backends: backends.into(),
		};
		(queue, OutboundReceiver { playout: playout_rx, clears: clears_rx })
	}

	pub fn backends(&self) -> &[String] {
		&self.backends
	}
}

impl PlayoutSink for OutboundQueue {
	fn send(&self, command: PlayoutCommand) {
		debug!(command = command.command_name(), server = ?command.server(), "Queueing playout command");
		match self.playout.try_send(command) {
			Ok(()) => {}
			Err(TrySendError::Full(dropped)) => {
				warn!(command = dropped.command_name(), server = ?dropped.server(), "Playout queue full, command dropped");
			}
			Err(TrySendError::Closed(dropped)) => {
				warn!(command = dropped.command_name(), "Backend worker is gone, command dropped");
			}
		}
	}
}

impl BackendControl for OutboundQueue {
	fn has_backends(&self) -> bool {
		!self.backends.is_empty()
	}

	fn clear_channels(&self, server: Option<String>) {
		debug!(?server, "Queueing backend channel clear");
		if let Err(e) = self.clears.send(server) {
			warn!(server = ?e.0, "Backend worker is gone, channel clear dropped");
		}
	}
}

/// Performs the actual I/O for queued messages.
#[async_trait]
pub trait OutboundHandler: Send + Sync {
	async fn deliver(&self, command: &PlayoutCommand) -> Result<(), DeliveryError>;

	async fn clear_channels(&self, server: Option<&str>) -> Result<(), DeliveryError>;
}

/// Drains both queues until they close or `cancel_token` fires. Returns the
/// number of messages handled.
pub async fn run_outbound_worker<H>(rx: OutboundReceiver, handler: Arc<H>, cancel_token: CancellationToken) -> u64
where
	H: OutboundHandler + ?Sized,
{
	info!("Outbound worker started");
	let OutboundReceiver { playout, clears } = rx;

	let (delivered, cleared) = tokio::join!(
		drain_playout(playout, handler.as_ref(), &cancel_token),
		drain_clears(clears, handler.as_ref(), &cancel_token),
	);

	let handled = delivered + cleared;
	info!(delivered, cleared, "Outbound worker stopped");
	handled
}

async fn drain_playout<H>(mut rx: Receiver<PlayoutCommand>, handler: &H, cancel_token: &CancellationToken) -> u64
where
	H: OutboundHandler + ?Sized,
{
	let mut handled = 0u64;
	loop {
		let command = tokio::select! {
			biased;
			() = cancel_token.cancelled() => break,
			command = rx.recv() => match command {
				Some(command) => command,
				None => break,
			},
		};

		handled += 1;
		tokio::select! {
			biased;
			() = cancel_token.cancelled() => {
				debug!(command = command.command_name(), "Playout delivery abandoned on shutdown");
				break;
			}
			result = handler.deliver(&command) => {
				if let Err(e) = result {
					error!(command = command.command_name(), server = ?command.server(), error = %e, "Playout delivery failed");
				}
			}
		}
	}
	handled
}

async fn drain_clears<H>(mut rx: UnboundedReceiver<Option<String>>, handler: &H, cancel_token: &CancellationToken) -> u64
where
	H: OutboundHandler + ?Sized,
{
	let mut handled = 0u64;
	loop {
		let server = tokio::select! {
			biased;
			() = cancel_token.cancelled() => break,
			server = rx.recv() => match server {
				Some(server) => server,
				None => break,
			},
		};

		handled += 1;
		if let Err(e) = handler.clear_channels(server.as_deref()).await {
			error!(?server, error = %e, "Backend channel clear failed");
		}
	}
	handled
}
