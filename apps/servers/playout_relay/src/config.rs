use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log filter directives
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,

	/// Server host
	#[arg(long, env = "HOST", default_value = "0.0.0.0")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "5656")]
	pub port: u16,

	/// Root folder holding <project>/data/<rundown>.json files
	#[arg(long, env = "DATAROOT", default_value = "./DATAROOT")]
	pub dataroot: PathBuf,

	/// Base URL of the playout server receiving /gc/playout requests
	#[arg(long, env = "PLAYOUT_URL", default_value = "http://127.0.0.1:5660")]
	pub playout_url: String,

	/// CasparCG connections as NAME=HOST:PORT[/CHANNELS], comma separated
	#[arg(long = "caspar-server", env = "CASPAR_SERVERS", value_delimiter = ',')]
	pub caspar_servers: Vec<CasparServer>,

	/// Timeout for playout backend calls in milliseconds
	#[arg(long, env = "BACKEND_TIMEOUT_MS", default_value = "3000")]
	pub backend_timeout_ms: u64,

	/// Timeout for feed proxy fetches in milliseconds
	#[arg(long, env = "PROXY_TIMEOUT_MS", default_value = "10000")]
	pub proxy_timeout_ms: u64,

	/// Overall request timeout in milliseconds
	#[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "15000")]
	pub request_timeout_ms: u64,

	/// Maximum concurrent requests before load shedding
	#[arg(long, env = "MAX_CONCURRENT_REQ", default_value = "256")]
	pub max_concurrent_req: usize,

	/// Maximum request body size in kilobytes
	#[arg(long, env = "MAX_REQUEST_KB", default_value = "512")]
	pub max_request_kb: usize,

	/// Playout commands waiting for the backend before new ones are dropped
	#[arg(long, env = "PLAYOUT_QUEUE", default_value_t = playout_dispatch::DEFAULT_PLAYOUT_QUEUE)]
	pub playout_queue: usize,

	/// Notifications a websocket client may lag behind before dropping old ones
	#[arg(long, env = "EVENT_BUFFER", default_value = "256")]
	pub event_buffer: usize,
}

impl Config {
	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}

	pub const fn backend_timeout(&self) -> Duration {
		Duration::from_millis(self.backend_timeout_ms)
	}

	pub const fn proxy_timeout(&self) -> Duration {
		Duration::from_millis(self.proxy_timeout_ms)
	}

	pub const fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}

	pub fn backend_names(&self) -> Vec<String> {
		self.caspar_servers.iter().map(|s| s.name.clone()).collect()
	}
}

/// A named CasparCG AMCP endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CasparServer {
	pub name: String,
	pub addr: String,
	pub channels: u16,
}

impl FromStr for CasparServer {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (name, rest) = s.trim().split_once('=').ok_or_else(|| format!("expected NAME=HOST:PORT[/CHANNELS], got `{s}`"))?;
		if name.is_empty() {
			return Err(format!("missing server name in `{s}`"));
		}

		let (addr, channels) = match rest.split_once('/') {
			Some((addr, channels)) => (addr, channels.parse::<u16>().map_err(|e| format!("invalid channel count in `{s}`: {e}"))?),
			None => (rest, 1),
		};

		let (host, port) = addr.rsplit_once(':').ok_or_else(|| format!("missing port in `{s}`"))?;
		if host.is_empty() {
			return Err(format!("missing host in `{s}`"));
		}
		port.parse::<u16>().map_err(|e| format!("invalid port in `{s}`: {e}"))?;
		if channels == 0 {
			return Err(format!("channel count must be at least 1 in `{s}`"));
		}

		Ok(Self {
			name: name.to_string(),
			addr: addr.to_string(),
			channels,
		})
	}
}

impl fmt::Display for CasparServer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}/{}", self.name, self.addr, self.channels)
	}
}
