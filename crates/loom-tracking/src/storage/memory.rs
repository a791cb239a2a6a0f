// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::Mutex;

use super::StorageBackend;
use crate::error::{Result, TrackingError};

/// In-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
		self
			.values
			.lock()
			.map_err(|_| TrackingError::Storage("memory storage lock poisoned".to_string()))
	}
}

impl StorageBackend for MemoryStorage {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.lock()?.get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.lock()?.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn delete(&self, key: &str) -> Result<()> {
		self.lock()?.remove(key);
		Ok(())
	}
}
