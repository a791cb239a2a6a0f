// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batch submission credentials.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::error::CredentialsError;

/// Placeholder printed in place of the secret.
pub const REDACTED: &str = "[REDACTED]";

pub const API_KEY_VAR: &str = "KM_API_KEY";
pub const API_SECRET_VAR: &str = "KM_API_SECRET";
pub const PRODUCT_ID_VAR: &str = "KM_PRODUCT_ID";

/// The API secret used to sign batch requests.
///
/// Debug, Display and Serialize all print `[REDACTED]`; the value is zeroed
/// on drop and only reachable through [`ApiSecret::expose`].
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct ApiSecret {
	inner: String,
}

impl ApiSecret {
	pub fn new(inner: impl Into<String>) -> Self {
		Self {
			inner: inner.into(),
		}
	}

	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl fmt::Debug for ApiSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ApiSecret").field(&REDACTED).finish()
	}
}

impl fmt::Display for ApiSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl Serialize for ApiSecret {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for ApiSecret {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(ApiSecret::new)
	}
}

/// Credentials for one product, fixed for the life of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	pub api_key: String,
	pub api_secret: ApiSecret,
	pub product_id: String,
}

impl Credentials {
	pub fn new(
		api_key: impl Into<String>,
		api_secret: impl Into<String>,
		product_id: impl Into<String>,
	) -> Self {
		Self {
			api_key: api_key.into(),
			api_secret: ApiSecret::new(api_secret),
			product_id: product_id.into(),
		}
	}

	/// Loads credentials from `KM_API_KEY`, `KM_API_SECRET` and `KM_PRODUCT_ID`.
	pub fn from_env() -> Result<Self, CredentialsError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
	where
		F: Fn(&'static str) -> Option<String>,
	{
		let read = |name: &'static str| {
			lookup(name)
				.filter(|v| !v.is_empty())
				.ok_or(CredentialsError::MissingVar(name))
		};

		Ok(Self::new(
			read(API_KEY_VAR)?,
			read(API_SECRET_VAR)?,
			read(PRODUCT_ID_VAR)?,
		))
	}
}
