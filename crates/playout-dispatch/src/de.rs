//! Serde helpers for loosely typed controller input.
//!
//! Control surfaces and older rundown files send layer numbers and item IDs
//! either as JSON strings or as bare numbers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_string(value: Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

/// Accepts a string, number or bool. Anything else becomes `None`.
pub fn opt_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_string))
}

/// Like [`opt_lenient_string`] but falls back to an empty string.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(opt_lenient_string(deserializer)?.unwrap_or_default())
}

/// Treats empty strings as absent, matching how query parameters are read.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|s| !s.is_empty())
}
