// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pluggable key-value storage used for the anonymous identity.
//!
//! Three backends ship with the SDK:
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStorage`] | tests and short-lived processes |
//! | [`FileStorage`] | a JSON file, for CLIs and daemons |
//! | [`CookieStorage`] | a request's `Cookie` header, emitting `Set-Cookie` lines |
//!
//! Any type implementing [`StorageBackend`] can be injected instead.

mod cookie;
mod file;
mod memory;

pub use cookie::{CookieOptions, CookieStorage};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// Get/set/delete by key.
///
/// Absence of a value is `Ok(None)`, not an error.
pub trait StorageBackend: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>>;
	fn set(&self, key: &str, value: &str) -> Result<()>;
	fn delete(&self, key: &str) -> Result<()>;
}
