// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for event encoding and request signing.

use thiserror::Error;

/// Errors raised while turning an event into its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
	/// A property value is not a string, number or boolean.
	#[error("property '{key}' is not a scalar value")]
	NonScalar { key: String },

	/// A timestamp override could not be read as seconds since the epoch.
	#[error("invalid timestamp in '{key}': {value}")]
	InvalidTimestamp { key: String, value: String },

	/// A percent-encoded component did not decode to UTF-8.
	#[error("malformed percent-encoding: {0}")]
	MalformedComponent(String),
}

/// Errors raised by the request signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
	/// The API secret is empty.
	#[error("API secret is required to sign batch requests")]
	EmptySecret,

	/// The HMAC key could not be initialized.
	#[error("invalid signing key")]
	InvalidKey,
}

/// Errors raised while loading credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
	/// A required environment variable is unset or empty.
	#[error("environment variable {0} is not set")]
	MissingVar(&'static str),
}
