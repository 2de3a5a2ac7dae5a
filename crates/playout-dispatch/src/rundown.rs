//! Rundown documents, their storage, and the shared in-memory copy.

use crate::error::DocumentError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One entry of `templates`. `itemID` is written back exactly as it was read,
/// including a missing or non-string value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RundownItem {
	#[serde(rename = "itemID", default, skip_serializing_if = "Option::is_none")]
	pub item_id: Option<Value>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl RundownItem {
	pub fn new(item_id: impl Into<String>) -> Self {
		Self {
			item_id: Some(Value::String(item_id.into())),
			extra: Map::new(),
		}
	}

	/// The item ID when it is a string. Items without one never match a rename.
	pub fn id(&self) -> Option<&str> {
		self.item_id.as_ref().and_then(Value::as_str)
	}
}

/// A rundown file. `templates` is required: a JSON object without it is not a rundown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RundownDocument {
	pub templates: Vec<RundownItem>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl RundownDocument {
	pub fn with_items<I, S>(ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			templates: ids.into_iter().map(RundownItem::new).collect(),
			..Self::default()
		}
	}

	pub fn contains_item(&self, item_id: &str) -> bool {
		self.templates.iter().any(|item| item.id() == Some(item_id))
	}

	/// Renames every item carrying `old_id`. Returns how many were changed.
	pub fn rename_items(&mut self, old_id: &str, new_id: &str) -> usize {
		let mut renamed = 0;
		for item in self.templates.iter_mut().filter(|item| item.id() == Some(old_id)) {
			item.item_id = Some(Value::String(new_id.to_string()));
			renamed += 1;
		}
		renamed
	}

	pub fn touch(&mut self, now: DateTime<Utc>) {
		self.updated = Some(now.to_rfc3339_opts(SecondsFormat::Millis, true));
	}

	pub fn updated_at(&self) -> Option<DateTime<Utc>> {
		self.updated.as_deref().and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|t| t.with_timezone(&Utc))
	}
}

/// Lexically normalizes a client supplied document path (`.` and duplicate separators).
pub fn normalize_path(raw: &str) -> PathBuf {
	Path::new(raw).components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
	async fn load(&self, path: &Path) -> Result<RundownDocument, DocumentError>;

	async fn save(&self, path: &Path, document: &RundownDocument) -> Result<(), DocumentError>;
}

/// Rundowns stored as pretty-printed JSON files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentStore;

#[async_trait]
impl DocumentStore for FsDocumentStore {
	async fn load(&self, path: &Path) -> Result<RundownDocument, DocumentError> {
		let bytes = tokio::fs::read(path).await.map_err(|source| DocumentError::Read { path: path.to_path_buf(), source })?;
		serde_json::from_slice(&bytes).map_err(|source| DocumentError::Parse { path: path.to_path_buf(), source })
	}

	async fn save(&self, path: &Path, document: &RundownDocument) -> Result<(), DocumentError> {
		let json = serde_json::to_vec_pretty(document)?;

		// Write next to the target and rename so readers never see a partial file.
		let mut tmp = path.as_os_str().to_owned();
		tmp.push(".tmp");
		let tmp = PathBuf::from(tmp);

		let write_err = |source| DocumentError::Write { path: path.to_path_buf(), source };
		tokio::fs::write(&tmp, json).await.map_err(write_err)?;
		if let Err(source) = tokio::fs::rename(&tmp, path).await {
			let _ = tokio::fs::remove_file(&tmp).await;
			return Err(write_err(source));
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedRundown {
	pub path: PathBuf,
	pub document: RundownDocument,
}

/// Latest known rundown, shared by handle. Only written through [`RundownCache::replace`]
/// after the document has been persisted.
#[derive(Debug, Clone, Default)]
pub struct RundownCache {
	inner: Arc<RwLock<Option<CachedRundown>>>,
}

impl RundownCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn snapshot(&self) -> Option<CachedRundown> {
		self.inner.read().await.clone()
	}

	pub async fn replace(&self, path: PathBuf, document: RundownDocument) {
		*self.inner.write().await = Some(CachedRundown { path, document });
	}

	pub async fn invalidate(&self) {
		*self.inner.write().await = None;
	}
}
