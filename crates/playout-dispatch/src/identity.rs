//! Conflict-checked renaming of rundown item IDs.

use crate::error::IdentityError;
use crate::rundown::{normalize_path, DocumentStore, RundownCache};
use chrono::Utc;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
	/// Log a warning and keep going; a later step will reject bad input.
	LogAndContinue,
	FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameField {
	Document,
	OldId,
	NewId,
}

impl RenameField {
	pub const fn name(self) -> &'static str {
		match self {
			Self::Document => "rundownfile",
			Self::OldId => "ID",
			Self::NewId => "newID",
		}
	}
}

/// How an empty value is treated, per field. Existing controller builds rely on
/// the lenient behavior for all three.
pub const RENAME_POLICY: [(RenameField, ValidationPolicy); 3] = [
	(RenameField::Document, ValidationPolicy::LogAndContinue),
	(RenameField::OldId, ValidationPolicy::LogAndContinue),
	(RenameField::NewId, ValidationPolicy::LogAndContinue),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
	pub document: String,
	pub old_id: String,
	pub new_id: String,
}

impl RenameRequest {
	const fn field(&self, field: RenameField) -> &String {
		match field {
			RenameField::Document => &self.document,
			RenameField::OldId => &self.old_id,
			RenameField::NewId => &self.new_id,
		}
	}

	/// Applies [`RENAME_POLICY`]. Returns the first field whose policy is fail-fast.
	pub fn validate(&self) -> Result<(), RenameField> {
		for (field, policy) in RENAME_POLICY {
			if !self.field(field).is_empty() {
				continue;
			}
			match policy {
				ValidationPolicy::LogAndContinue => warn!(field = field.name(), "Rename request is missing a value, continuing"),
				ValidationPolicy::FailFast => return Err(field),
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
	pub path: PathBuf,
	pub new_id: String,
	pub renamed: usize,
}

type LockMap = DashMap<PathBuf, Arc<Mutex<()>>>;

/// Holds a document lock. Dropping it releases the lock and forgets the entry
/// once nobody else is waiting on it.
struct DocumentLock<'a> {
	locks: &'a LockMap,
	key: PathBuf,
	guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DocumentLock<'_> {
	fn drop(&mut self) {
		self.guard.take();
		self.locks.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
	}
}

/// Resolves symlinks and `..` when the file exists, otherwise keeps the lexical path.
async fn lock_key(path: &Path) -> PathBuf {
	tokio::fs::canonicalize(path).await.unwrap_or_else(|_| path.to_path_buf())
}

/// Owns the rundown cache and serializes read-modify-write cycles per document.
pub struct IdentityResolver<S> {
	store: S,
	cache: RundownCache,
	locks: LockMap,
}

impl<S: DocumentStore> IdentityResolver<S> {
	pub fn new(store: S, cache: RundownCache) -> Self {
		Self {
			store,
			cache,
			locks: DashMap::new(),
		}
	}

	pub const fn cache(&self) -> &RundownCache {
		&self.cache
	}

	/// Documents with a rename in flight.
	pub fn locked_documents(&self) -> usize {
		self.locks.len()
	}

	async fn lock_document(&self, path: &Path) -> DocumentLock<'_> {
		let key = lock_key(path).await;
		let lock = self.locks.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone();

		let mut held = DocumentLock {
			locks: &self.locks,
			key,
			guard: None,
		};
		held.guard = Some(lock.lock_owned().await);
		held
	}

	/// Entry point for raw request values. Empty fields are handled per [`RENAME_POLICY`].
	pub async fn rename(&self, request: &RenameRequest) -> Result<RenameOutcome, IdentityError> {
		info!(document = %request.document, old_id = %request.old_id, new_id = %request.new_id, "Item ID change requested");

		request.validate().map_err(|field| IdentityError::MissingField(field.name()))?;

		let path = normalize_path(&request.document);
		self.change_item_id(&path, &request.old_id, &request.new_id).await
	}

	/// Renames every item `old_id` to `new_id` unless `new_id` is already taken.
	///
	/// The document is re-read under a per-path lock, so the uniqueness check
	/// always sees the latest saved state. Nothing is written on conflict.
	pub async fn change_item_id(&self, path: &Path, old_id: &str, new_id: &str) -> Result<RenameOutcome, IdentityError> {
		let _lock = self.lock_document(path).await;

		let mut document = self.store.load(path).await.map_err(IdentityError::Load)?;

		if document.contains_item(new_id) {
			debug!(path = %path.display(), new_id, "ID not changed, already in use");
			return Err(IdentityError::Conflict { new_id: new_id.to_string() });
		}

		let renamed = document.rename_items(old_id, new_id);
		if renamed > 1 {
			warn!(path = %path.display(), old_id, renamed, "Duplicate item IDs found, all of them were renamed");
		} else if renamed == 0 {
			debug!(path = %path.display(), old_id, "No item carried the old ID");
		}

		document.touch(Utc::now());
		self.store.save(path, &document).await.map_err(IdentityError::Save)?;
		self.cache.replace(path.to_path_buf(), document).await;

		info!(path = %path.display(), new_id, renamed, "Changed item ID");
		Ok(RenameOutcome {
			path: path.to_path_buf(),
			new_id: new_id.to_string(),
			renamed,
		})
	}
}
