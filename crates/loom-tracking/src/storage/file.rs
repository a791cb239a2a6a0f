// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::StorageBackend;
use crate::error::{Result, TrackingError};

/// Storage persisted as a flat JSON object on disk.
///
/// A missing file reads as empty. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStorage {
	path: PathBuf,
	guard: Mutex<()>,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			guard: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load(&self) -> Result<BTreeMap<String, String>> {
		match fs::read_to_string(&self.path) {
			Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
			Ok(contents) => Ok(serde_json::from_str(&contents)?),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
			Err(e) => Err(TrackingError::Storage(format!(
				"failed to read {}: {e}",
				self.path.display()
			))),
		}
	}

	fn store(&self, values: &BTreeMap<String, String>) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent).map_err(|e| {
					TrackingError::Storage(format!("failed to create {}: {e}", parent.display()))
				})?;
			}
		}
		let contents = serde_json::to_string_pretty(values)?;
		fs::write(&self.path, contents).map_err(|e| {
			TrackingError::Storage(format!("failed to write {}: {e}", self.path.display()))
		})?;
		debug!(path = %self.path.display(), entries = values.len(), "Wrote storage file");
		Ok(())
	}

	fn update<F>(&self, f: F) -> Result<()>
	where
		F: FnOnce(&mut BTreeMap<String, String>) -> bool,
	{
		let _guard = self
			.guard
			.lock()
			.map_err(|_| TrackingError::Storage("file storage lock poisoned".to_string()))?;
		let mut values = self.load()?;
		if f(&mut values) {
			self.store(&values)?;
		}
		Ok(())
	}
}

impl StorageBackend for FileStorage {
	fn get(&self, key: &str) -> Result<Option<String>> {
		let _guard = self
			.guard
			.lock()
			.map_err(|_| TrackingError::Storage("file storage lock poisoned".to_string()))?;
		Ok(self.load()?.remove(key))
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.update(|values| {
			values.insert(key.to_string(), value.to_string());
			true
		})
	}

	fn delete(&self, key: &str) -> Result<()> {
		self.update(|values| values.remove(key).is_some())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn missing_file_reads_as_empty() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().join("identity.json"));
		assert_eq!(storage.get("km_ai").unwrap(), None);
	}

	#[test]
	fn values_survive_a_new_instance() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("nested").join("identity.json");

		FileStorage::new(&path).set("km_ai", "abc").unwrap();

		let reopened = FileStorage::new(&path);
		assert_eq!(reopened.get("km_ai").unwrap().as_deref(), Some("abc"));
	}

	#[test]
	fn delete_removes_only_that_key() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().join("identity.json"));
		storage.set("km_ai", "abc").unwrap();
		storage.set("other", "keep").unwrap();

		storage.delete("km_ai").unwrap();

		assert_eq!(storage.get("km_ai").unwrap(), None);
		assert_eq!(storage.get("other").unwrap().as_deref(), Some("keep"));
	}

	#[test]
	fn corrupt_file_is_an_error() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("identity.json");
		fs::write(&path, "not json").unwrap();

		let storage = FileStorage::new(&path);
		assert!(matches!(
			storage.get("km_ai"),
			Err(TrackingError::Serialization(_))
		));
	}
}
