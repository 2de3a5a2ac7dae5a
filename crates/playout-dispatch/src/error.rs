use std::path::PathBuf;
use thiserror::Error;

/// Malformed or incomplete addressing for a playout command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressingError {
	#[error("missing required field `{0}`")]
	MissingField(&'static str),

	#[error("item path `{0}` must have the form <folder>/<file>")]
	MalformedItemPath(String),

	#[error("item path segment `{0}` is not allowed")]
	InvalidPathSegment(String),

	#[error("unknown playout command `{0}`")]
	UnknownCommand(String),

	#[error("`{0}` is not a valid template function name")]
	InvalidFunctionName(String),
}

/// Rundown document storage failures.
#[derive(Error, Debug)]
pub enum DocumentError {
	#[error("failed to read rundown {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse rundown {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("failed to serialize rundown: {0}")]
	Serialize(#[from] serde_json::Error),

	#[error("failed to write rundown {path}: {source}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Outcome of a failed item rename.
#[derive(Error, Debug)]
pub enum IdentityError {
	#[error("missing required value `{0}`")]
	MissingField(&'static str),

	#[error("could not load rundown: {0}")]
	Load(#[source] DocumentError),

	#[error("item ID `{new_id}` is already in use")]
	Conflict { new_id: String },

	#[error("could not save rundown: {0}")]
	Save(#[source] DocumentError),
}

impl IdentityError {
	/// Short label used for logs and metrics.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::MissingField(_) => "invalid",
			Self::Load(_) => "load_error",
			Self::Conflict { .. } => "conflict",
			Self::Save(_) => "save_error",
		}
	}
}

/// Failure reported by the backend worker. Never reaches the HTTP caller.
#[derive(Error, Debug)]
pub enum DeliveryError {
	#[error("playout backend rejected request: {0}")]
	Backend(String),

	#[error("no playout server named `{0}` is configured")]
	UnknownServer(String),

	#[error("I/O error talking to {target}: {source}")]
	Io {
		target: String,
		#[source]
		source: std::io::Error,
	},

	#[error("timed out talking to {0}")]
	Timeout(String),
}
