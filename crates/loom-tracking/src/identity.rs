// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Anonymous identity persistence.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::storage::StorageBackend;

/// Default storage key for the anonymous identity.
pub const DEFAULT_ANONYMOUS_KEY: &str = "km_ai";

const SEGMENTS: usize = 11;

/// Generates a fresh anonymous identity: 44 lowercase hex characters.
pub fn generate_anonymous_id() -> String {
	let mut rng = rand::thread_rng();
	(0..SEGMENTS)
		.map(|_| format!("{:04x}", rng.gen::<u16>()))
		.collect()
}

/// Reads, creates and clears the anonymous identity token under one key.
#[derive(Clone)]
pub struct IdentityStore {
	backend: Arc<dyn StorageBackend>,
	key: String,
}

impl std::fmt::Debug for IdentityStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IdentityStore").field("key", &self.key).finish()
	}
}

impl IdentityStore {
	pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
		Self::with_key(backend, DEFAULT_ANONYMOUS_KEY)
	}

	pub fn with_key(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
		Self {
			backend,
			key: key.into(),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn get(&self) -> Result<Option<String>> {
		self.backend.get(&self.key)
	}

	pub fn set(&self, value: &str) -> Result<()> {
		self.backend.set(&self.key, value)
	}

	pub fn delete(&self) -> Result<()> {
		debug!(key = %self.key, "Clearing anonymous identity");
		self.backend.delete(&self.key)
	}

	/// Returns the stored identity, generating and persisting one if absent.
	///
	/// An empty stored value counts as absent.
	pub fn get_or_create(&self) -> Result<String> {
		if let Some(existing) = self.get()?.filter(|v| !v.is_empty()) {
			return Ok(existing);
		}

		let id = generate_anonymous_id();
		self.set(&id)?;
		debug!(key = %self.key, "Created anonymous identity");
		Ok(id)
	}
}
