//! Canonical playout command envelope and the builders that normalize
//! inbound request parameters into it.

use crate::de::{lenient_string, non_empty, opt_lenient_string};
use crate::error::AddressingError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_SERVER: &str = "OVERLAY";
pub const DEFAULT_CHANNEL: &str = "1";
pub const DEFAULT_LAYER: &str = "1";
pub const DEFAULT_WEB_LAYER: &str = "1";
pub const DEFAULT_DATA_FORMAT: &str = "xml";
pub const DEFAULT_TEMPLATE_PATH: &str = "/vendor/pack/template.html";

const RUNDOWN_DATA_DIR: &str = "data";

/// Everything except RFC 3986 unreserved characters gets escaped, so the
/// argument can never terminate the quoted string it is placed in.
const INVOKE_ARG: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayAction {
	#[default]
	Play,
	Stop,
	Continue,
}

impl PlayAction {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Play => "play",
			Self::Stop => "stop",
			Self::Continue => "continue",
		}
	}
}

impl fmt::Display for PlayAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PlayAction {
	type Err = AddressingError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"play" => Ok(Self::Play),
			"stop" => Ok(Self::Stop),
			"continue" => Ok(Self::Continue),
			_ => Err(AddressingError::UnknownCommand(s.to_string())),
		}
	}
}

/// Output addressing on a playout backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Addressing {
	#[serde(rename = "playserver")]
	pub server: String,
	#[serde(rename = "playchannel")]
	pub channel: String,
	#[serde(rename = "playlayer")]
	pub layer: String,
	#[serde(rename = "webplayout")]
	pub web_layer: String,
}

impl Default for Addressing {
	fn default() -> Self {
		Self {
			server: DEFAULT_SERVER.to_string(),
			channel: DEFAULT_CHANNEL.to_string(),
			layer: DEFAULT_LAYER.to_string(),
			web_layer: DEFAULT_WEB_LAYER.to_string(),
		}
	}
}

/// Raw addressing as it arrives on a query string. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressingParams {
	#[serde(default)]
	pub playserver: Option<String>,
	#[serde(default)]
	pub playchannel: Option<String>,
	#[serde(default)]
	pub playlayer: Option<String>,
	#[serde(default)]
	pub webplayout: Option<String>,
}

impl AddressingParams {
	/// Fills every absent or empty field with its default.
	pub fn resolve(self) -> Addressing {
		Addressing {
			server: non_empty(self.playserver).unwrap_or_else(|| DEFAULT_SERVER.to_string()),
			channel: non_empty(self.playchannel).unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
			layer: non_empty(self.playlayer).unwrap_or_else(|| DEFAULT_LAYER.to_string()),
			web_layer: non_empty(self.webplayout).unwrap_or_else(|| DEFAULT_WEB_LAYER.to_string()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
	pub field: String,
	#[serde(default, deserialize_with = "lenient_string")]
	pub value: String,
}

impl DataField {
	pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			value: value.into(),
		}
	}
}

fn placeholder_fields() -> Vec<DataField> {
	vec![DataField::new("f0", "Lorem ipsum")]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
	/// Calls a function inside an already loaded template.
	Invoke { expression: String },
	/// Loads a template with inline data and runs `action` on it.
	Content {
		template_path: String,
		data_format: String,
		fields: Vec<DataField>,
		action: PlayAction,
	},
	/// Points at an item of a stored rundown; the backend resolves its content.
	Reference { datafile: PathBuf, epoch: String, action: PlayAction },
}

/// A fully normalized command for the playout backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "WireCommand")]
pub struct PlayoutCommand {
	/// `None` for by-reference commands, where addressing lives in the rundown item.
	pub addressing: Option<Addressing>,
	pub directive: Directive,
}

impl PlayoutCommand {
	/// Inline commands carry all content; reference commands need a document lookup downstream.
	pub const fn is_prepopulated(&self) -> bool {
		!matches!(self.directive, Directive::Reference { .. })
	}

	pub const fn command_name(&self) -> &'static str {
		match &self.directive {
			Directive::Invoke { .. } => "invoke",
			Directive::Content { action, .. } | Directive::Reference { action, .. } => action.as_str(),
		}
	}

	pub fn server(&self) -> Option<&str> {
		self.addressing.as_ref().map(|a| a.server.as_str())
	}
}

/// Field layout expected by the playout endpoint.
#[derive(Serialize)]
struct WireCommand {
	#[serde(flatten)]
	addressing: Option<Addressing>,
	prepopulated: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	relpath: Option<String>,
	command: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	dataformat: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<DataField>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	invoke: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	datafile: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	epoch: Option<String>,
}

impl From<PlayoutCommand> for WireCommand {
	fn from(cmd: PlayoutCommand) -> Self {
		let prepopulated = if cmd.is_prepopulated() { "true" } else { "false" };
		let command = cmd.command_name();
		let mut wire = Self {
			addressing: cmd.addressing,
			prepopulated,
			relpath: None,
			command,
			dataformat: None,
			fields: None,
			invoke: None,
			datafile: None,
			epoch: None,
		};

		match cmd.directive {
			Directive::Invoke { expression } => wire.invoke = Some(expression),
			Directive::Content {
				template_path,
				data_format,
				fields,
				..
			} => {
				wire.relpath = Some(template_path);
				wire.dataformat = Some(data_format);
				wire.fields = Some(fields);
			}
			Directive::Reference { datafile, epoch, .. } => {
				wire.datafile = Some(datafile.to_string_lossy().into_owned());
				wire.epoch = Some(epoch);
			}
		}

		wire
	}
}

// --- invoke shape ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvokeParams {
	#[serde(flatten)]
	pub addressing: AddressingParams,
	#[serde(default)]
	pub function: Option<String>,
	#[serde(default)]
	pub params: Option<String>,
}

fn is_function_name(name: &str) -> bool {
	let mut chars = name.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$') && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// Builds `function("<percent-encoded params>")`.
pub fn invoke_expression(function: &str, params: &str) -> String {
	format!("{function}(\"{}\")", utf8_percent_encode(params, INVOKE_ARG))
}

pub fn build_invoke(params: InvokeParams) -> Result<PlayoutCommand, AddressingError> {
	let function = non_empty(params.function).ok_or(AddressingError::MissingField("function"))?;
	if !is_function_name(&function) {
		return Err(AddressingError::InvalidFunctionName(function));
	}

	let expression = invoke_expression(&function, params.params.as_deref().unwrap_or_default());

	Ok(PlayoutCommand {
		addressing: Some(params.addressing.resolve()),
		directive: Directive::Invoke { expression },
	})
}

// --- direct-content shape ---

/// JSON body accepted by the direct playout endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectPlayoutRequest {
	#[serde(default, rename = "casparServer", deserialize_with = "opt_lenient_string")]
	pub caspar_server: Option<String>,
	#[serde(default, rename = "casparChannel", deserialize_with = "opt_lenient_string")]
	pub caspar_channel: Option<String>,
	#[serde(default, rename = "casparLayer", deserialize_with = "opt_lenient_string")]
	pub caspar_layer: Option<String>,
	#[serde(default, rename = "webplayoutLayer", deserialize_with = "opt_lenient_string")]
	pub webplayout_layer: Option<String>,
	#[serde(default, rename = "relativeTemplatePath")]
	pub relative_template_path: Option<String>,
	#[serde(default)]
	pub command: Option<String>,
	#[serde(default)]
	pub dataformat: Option<String>,
	#[serde(default, rename = "DataFields")]
	pub data_fields: Option<Vec<DataField>>,
}

pub fn build_direct(request: DirectPlayoutRequest) -> Result<PlayoutCommand, AddressingError> {
	let action = match non_empty(request.command) {
		Some(raw) => raw.parse()?,
		None => PlayAction::default(),
	};

	let addressing = AddressingParams {
		playserver: request.caspar_server,
		playchannel: request.caspar_channel,
		playlayer: request.caspar_layer,
		webplayout: request.webplayout_layer,
	}
	.resolve();

	Ok(PlayoutCommand {
		addressing: Some(addressing),
		directive: Directive::Content {
			template_path: non_empty(request.relative_template_path).unwrap_or_else(|| DEFAULT_TEMPLATE_PATH.to_string()),
			data_format: non_empty(request.dataformat).unwrap_or_else(|| DEFAULT_DATA_FORMAT.to_string()),
			fields: request.data_fields.filter(|f| !f.is_empty()).unwrap_or_else(placeholder_fields),
			action,
		},
	})
}

// --- by-reference shape ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemReference {
	/// `<folder>/<file>` of the rundown, without extension.
	#[serde(default)]
	pub file: Option<String>,
	#[serde(default)]
	pub item: Option<String>,
	#[serde(default)]
	pub command: Option<String>,
}

/// Resolves `<folder>/<file>` to `<data_root>/<folder>/data/<file>.json`.
pub fn rundown_path(data_root: &Path, composite: &str) -> Result<PathBuf, AddressingError> {
	let malformed = || AddressingError::MalformedItemPath(composite.to_string());

	let (folder, file) = composite.split_once('/').ok_or_else(malformed)?;
	if folder.is_empty() || file.is_empty() || file.contains('/') {
		return Err(malformed());
	}

	for segment in [folder, file] {
		if segment == "." || segment == ".." || segment.contains('\\') {
			return Err(AddressingError::InvalidPathSegment(segment.to_string()));
		}
	}

	Ok(data_root.join(folder).join(RUNDOWN_DATA_DIR).join(format!("{file}.json")))
}

pub fn build_by_reference(data_root: &Path, reference: ItemReference) -> Result<PlayoutCommand, AddressingError> {
	let composite = non_empty(reference.file).ok_or(AddressingError::MissingField("file"))?;
	let epoch = non_empty(reference.item).ok_or(AddressingError::MissingField("item"))?;
	let action = non_empty(reference.command).ok_or(AddressingError::MissingField("command"))?.parse()?;
	let datafile = rundown_path(data_root, &composite)?;

	Ok(PlayoutCommand {
		addressing: None,
		directive: Directive::Reference { datafile, epoch, action },
	})
}
