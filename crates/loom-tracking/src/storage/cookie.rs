// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use loom_tracking_core::query::{decode_component, encode_component};

use super::StorageBackend;
use crate::error::{Result, TrackingError};

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Attributes written on every `Set-Cookie` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
	pub expiry_days: i64,
	pub path: String,
	pub domain: Option<String>,
}

impl Default for CookieOptions {
	fn default() -> Self {
		Self {
			expiry_days: 365,
			path: "/".to_string(),
			domain: None,
		}
	}
}

#[derive(Debug, Default)]
struct CookieState {
	jar: String,
	pending: Vec<String>,
}

/// Storage over a browser-style cookie jar.
///
/// Seed it with the incoming `Cookie` header, then forward
/// [`CookieStorage::take_set_cookie_headers`] on the response.
#[derive(Debug, Default)]
pub struct CookieStorage {
	options: CookieOptions,
	state: Mutex<CookieState>,
}

impl CookieStorage {
	pub fn new(options: CookieOptions) -> Self {
		Self {
			options,
			state: Mutex::default(),
		}
	}

	/// Creates storage seeded from a `Cookie` request header.
	pub fn from_header(header: impl Into<String>, options: CookieOptions) -> Self {
		Self {
			options,
			state: Mutex::new(CookieState {
				jar: header.into(),
				pending: Vec::new(),
			}),
		}
	}

	/// The jar as a `Cookie` header value.
	pub fn cookie_header(&self) -> Result<String> {
		Ok(self.lock()?.jar.clone())
	}

	/// Drains the `Set-Cookie` values produced since the last call.
	pub fn take_set_cookie_headers(&self) -> Result<Vec<String>> {
		Ok(std::mem::take(&mut self.lock()?.pending))
	}

	fn lock(&self) -> Result<MutexGuard<'_, CookieState>> {
		self
			.state
			.lock()
			.map_err(|_| TrackingError::Storage("cookie storage lock poisoned".to_string()))
	}

	fn set_cookie_line(&self, key: &str, value: &str, expires: &str) -> String {
		let mut line = format!("{key}={value}; expires={expires}; path={}", self.options.path);
		if let Some(domain) = &self.options.domain {
			line.push_str("; domain=");
			line.push_str(domain);
		}
		line
	}

	fn expiry(&self, now: DateTime<Utc>) -> String {
		(now + Duration::days(self.options.expiry_days))
			.format("%a, %d %b %Y %H:%M:%S GMT")
			.to_string()
	}
}

/// Finds `key` in a `Cookie` header. Only a cookie whose name is exactly
/// `key` matches.
fn lookup<'a>(jar: &'a str, key: &str) -> Option<&'a str> {
	let prefix = format!("{key}=");
	jar
		.split(';')
		.map(str::trim_start)
		.find_map(|pair| pair.strip_prefix(prefix.as_str()))
}

fn without(jar: &str, key: &str) -> Vec<String> {
	let prefix = format!("{key}=");
	jar
		.split(';')
		.map(str::trim)
		.filter(|pair| !pair.is_empty() && !pair.starts_with(prefix.as_str()))
		.map(str::to_string)
		.collect()
}

impl StorageBackend for CookieStorage {
	fn get(&self, key: &str) -> Result<Option<String>> {
		let state = self.lock()?;
		match lookup(&state.jar, key) {
			Some(raw) => Ok(Some(decode_component(raw)?)),
			None => Ok(None),
		}
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		let encoded = encode_component(value);
		let line = self.set_cookie_line(key, &encoded, &self.expiry(Utc::now()));

		let mut state = self.lock()?;
		let mut pairs = without(&state.jar, key);
		pairs.push(format!("{key}={encoded}"));
		state.jar = pairs.join("; ");
		state.pending.push(line);
		Ok(())
	}

	fn delete(&self, key: &str) -> Result<()> {
		let line = self.set_cookie_line(key, "", EXPIRED);

		let mut state = self.lock()?;
		state.jar = without(&state.jar, key).join("; ");
		state.pending.push(line);
		Ok(())
	}
}
