//! Backend worker I/O: playout commands go over HTTP, channel clears over AMCP.

pub mod amcp;
pub mod playout_http;

use crate::config::{CasparServer, Config};
use async_trait::async_trait;
use playout_dispatch::{DeliveryError, OutboundHandler, PlayoutCommand};
use std::time::Duration;
use tracing::{info, warn};

pub use playout_http::PlayoutHttpClient;

pub struct RelayBackend {
	http: PlayoutHttpClient,
	servers: Vec<CasparServer>,
	timeout: Duration,
}

impl RelayBackend {
	pub fn new(http: PlayoutHttpClient, servers: Vec<CasparServer>, timeout: Duration) -> Self {
		Self { http, servers, timeout }
	}

	pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
		let http = PlayoutHttpClient::new(config.playout_url.clone(), config.backend_timeout())?;
		Ok(Self::new(http, config.caspar_servers.clone(), config.backend_timeout()))
	}

	fn targets(&self, server: Option<&str>) -> Result<Vec<&CasparServer>, DeliveryError> {
		match server {
			None => Ok(self.servers.iter().collect()),
			Some(name) => self
				.servers
				.iter()
				.find(|s| s.name.eq_ignore_ascii_case(name))
				.map(|s| vec![s])
				.ok_or_else(|| DeliveryError::UnknownServer(name.to_string())),
		}
	}
}

#[async_trait]
impl OutboundHandler for RelayBackend {
	async fn deliver(&self, command: &PlayoutCommand) -> Result<(), DeliveryError> {
		self.http.post_command(command).await
	}

	/// Clears every channel on the selected servers. One failing server does not
	/// stop the others; the last failure is returned.
	async fn clear_channels(&self, server: Option<&str>) -> Result<(), DeliveryError> {
		let mut last_error = None;

		for target in self.targets(server)? {
			match amcp::clear_all_channels(target, self.timeout).await {
				Ok(()) => info!(server = %target.name, channels = target.channels, "Cleared playout channels"),
				Err(e) => {
					warn!(server = %target.name, error = %e, "Channel clear failed");
					last_error = Some(e);
				}
			}
		}

		last_error.map_or(Ok(()), Err)
	}
}
