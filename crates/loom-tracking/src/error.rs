// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the tracking SDK.

use std::time::Duration;

use loom_tracking_core::{EncodeError, SignatureError};
use thiserror::Error;

/// Tracking SDK errors.
#[derive(Debug, Error)]
pub enum TrackingError {
	/// Immediate delivery needs an API key on the client.
	#[error("missing configuration: API key")]
	MissingApiKey,

	/// The event has no resolved identity.
	#[error("missing configuration: identity")]
	MissingIdentity,

	/// Batch submission needs a product id for the endpoint path.
	#[error("missing configuration: product id")]
	MissingProductId,

	/// Immediate delivery needs a tokio runtime to dispatch on.
	#[error("missing configuration: no tokio runtime available for dispatch")]
	MissingRuntime,

	/// The collector host is empty or malformed.
	#[error("invalid collector host: {0}")]
	InvalidHost(String),

	/// The event could not be encoded.
	#[error("encoding failed: {0}")]
	Encoding(#[from] EncodeError),

	/// The batch request could not be signed.
	#[error("signing failed: {0}")]
	Signing(#[from] SignatureError),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// The request did not complete within the configured timeout.
	#[error("request timed out after {timeout:?}")]
	Timeout { timeout: Duration },

	/// Collector returned an error response.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// A dispatched request task panicked or was cancelled.
	#[error("request task failed: {0}")]
	TaskFailed(String),

	/// The storage backend failed.
	#[error("storage error: {0}")]
	Storage(String),

	/// The batch queue failed.
	#[error("queue error: {0}")]
	Queue(String),

	/// Serialization error.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl TrackingError {
	/// Returns `true` for errors caused by missing or invalid configuration.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			TrackingError::MissingApiKey
				| TrackingError::MissingIdentity
				| TrackingError::MissingProductId
				| TrackingError::MissingRuntime
				| TrackingError::InvalidHost(_)
				| TrackingError::Signing(SignatureError::EmptySecret)
		)
	}

	/// Returns `true` for errors raised by the transport or collector.
	pub fn is_transport(&self) -> bool {
		matches!(
			self,
			TrackingError::RequestFailed(_)
				| TrackingError::Timeout { .. }
				| TrackingError::ServerError { .. }
				| TrackingError::TaskFailed(_)
		)
	}
}

/// Result type alias for tracking operations.
pub type Result<T> = std::result::Result<T, TrackingError>;
