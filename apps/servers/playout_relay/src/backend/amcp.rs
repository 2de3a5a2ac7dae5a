//! Minimal CasparCG AMCP client, only what the panic path needs.

use crate::config::CasparServer;
use playout_dispatch::DeliveryError;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

async fn within<T>(timeout: Duration, target: &str, fut: impl Future<Output = std::io::Result<T>>) -> Result<T, DeliveryError> {
	tokio::time::timeout(timeout, fut)
		.await
		.map_err(|_| DeliveryError::Timeout(target.to_string()))?
		.map_err(|source| DeliveryError::Io {
			target: target.to_string(),
			source,
		})
}

/// Sends `CLEAR <n>` for every channel of `server`, waiting for a 2xx reply each time.
pub async fn clear_all_channels(server: &CasparServer, timeout: Duration) -> Result<(), DeliveryError> {
	let target = server.addr.as_str();
	let stream = within(timeout, target, TcpStream::connect(target)).await?;
	let (read, mut write) = stream.into_split();
	let mut replies = BufReader::new(read).lines();

	for channel in 1..=server.channels {
		let request = format!("CLEAR {channel}\r\n");
		within(timeout, target, write.write_all(request.as_bytes())).await?;

		let reply = within(timeout, target, replies.next_line()).await?.ok_or_else(|| DeliveryError::Io {
			target: target.to_string(),
			source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed before reply"),
		})?;

		if !reply.starts_with('2') {
			return Err(DeliveryError::Backend(format!("{} rejected CLEAR {channel}: {reply}", server.name)));
		}
		debug!(server = %server.name, channel, %reply, "AMCP clear acknowledged");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::net::TcpListener;

	async fn fake_caspar(reply: &'static str) -> (String, tokio::task::JoinHandle<Vec<String>>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap().to_string();

		let handle = tokio::spawn(async move {
			let (stream, _) = listener.accept().await.unwrap();
			let (read, mut write) = stream.into_split();
			let mut lines = BufReader::new(read).lines();
			let mut seen = Vec::new();
			while let Ok(Some(line)) = lines.next_line().await {
				seen.push(line);
				write.write_all(reply.as_bytes()).await.unwrap();
			}
			seen
		});

		(addr, handle)
	}

	#[tokio::test]
	async fn test_clear_every_channel() {
		let (addr, handle) = fake_caspar("202 CLEAR OK\r\n").await;
		let server = CasparServer {
			name: "OVERLAY".into(),
			addr,
			channels: 3,
		};

		clear_all_channels(&server, Duration::from_secs(5)).await.unwrap();

		assert_eq!(handle.await.unwrap(), vec!["CLEAR 1", "CLEAR 2", "CLEAR 3"]);
	}

	#[tokio::test]
	async fn test_clear_rejected() {
		let (addr, _handle) = fake_caspar("401 CLEAR ERROR\r\n").await;
		let server = CasparServer {
			name: "OVERLAY".into(),
			addr,
			channels: 1,
		};

		let result = clear_all_channels(&server, Duration::from_secs(5)).await;
		assert!(matches!(result, Err(DeliveryError::Backend(msg)) if msg.contains("401")));
	}
}
