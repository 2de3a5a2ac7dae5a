use playout_dispatch::{DeliveryError, PlayoutCommand};
use std::time::Duration;
use tracing::debug;

const PLAYOUT_PATH: &str = "/gc/playout";

/// Posts playout commands to the playout server.
#[derive(Clone)]
pub struct PlayoutHttpClient {
	client: reqwest::Client,
	base_url: String,
}

impl PlayoutHttpClient {
	pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
		let client = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	pub fn endpoint(&self) -> String {
		format!("{}{PLAYOUT_PATH}", self.base_url)
	}

	pub async fn post_command(&self, command: &PlayoutCommand) -> Result<(), DeliveryError> {
		let url = self.endpoint();

		let response = self.client.post(&url).json(command).send().await.map_err(|e| {
			if e.is_timeout() {
				DeliveryError::Timeout(url.clone())
			} else {
				DeliveryError::Backend(e.to_string())
			}
		})?;

		let status = response.status();
		if !status.is_success() {
			return Err(DeliveryError::Backend(format!("{url} answered {status}")));
		}

		debug!(%url, command = command.command_name(), "Playout command delivered");
		Ok(())
	}
}
