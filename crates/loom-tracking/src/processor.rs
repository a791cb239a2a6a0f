// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signed batch submission and the background drain loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use loom_tracking_core::signature::{self, SIGNATURE_PARAM};
use loom_tracking_core::{Credentials, WireEvent};
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::error::{Result, TrackingError};
use crate::queue::BatchQueue;
use crate::transport::{HttpTransport, Transport, TransportRequest};

/// Default batch collector host.
pub const DEFAULT_BATCH_HOST: &str = "api.kissmetrics.com";

/// Header carrying the API key on batch submissions.
pub const API_KEY_HEADER: &str = "X-KM-ApiKey";

/// Configuration for batch submission.
#[derive(Debug, Clone)]
pub struct BatchConfig {
	/// Collector host, optionally with a port.
	pub host: String,
	pub scheme: String,
	pub api_version: String,
	/// Interval between drains in [`BatchProcessor::run`].
	pub flush_interval: Duration,
	/// Bound on one submission, including the response.
	pub request_timeout: Duration,
}

impl Default for BatchConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_BATCH_HOST.to_string(),
			scheme: "http".to_string(),
			api_version: "v1".to_string(),
			flush_interval: Duration::from_secs(10),
			request_timeout: Duration::from_secs(10),
		}
	}
}

/// Result of one drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
	/// The queue held nothing; no request was made.
	Empty,
	/// The collector accepted `count` events.
	Submitted { count: usize, status: u16 },
}

#[derive(Serialize)]
struct BatchBody<'a> {
	data: &'a [WireEvent],
}

/// Drains a [`BatchQueue`] into one signed POST.
pub struct BatchProcessor {
	transport: Arc<dyn Transport>,
	config: BatchConfig,
	shutdown: AtomicBool,
	flush_notify: Notify,
}

impl BatchProcessor {
	pub fn new(transport: Arc<dyn Transport>, config: BatchConfig) -> Self {
		Self {
			transport,
			config,
			shutdown: AtomicBool::new(false),
			flush_notify: Notify::new(),
		}
	}

	/// Creates a processor over the reqwest transport.
	pub fn with_http(config: BatchConfig) -> Result<Self> {
		let transport = HttpTransport::new(config.request_timeout)?;
		Ok(Self::new(Arc::new(transport), config))
	}

	pub fn config(&self) -> &BatchConfig {
		&self.config
	}

	/// Path of the batch endpoint for `product_id`, without a leading slash.
	pub fn batch_path(&self, product_id: &str) -> String {
		format!(
			"{}/products/{}/tracking/e",
			self.config.api_version, product_id
		)
	}

	/// The URL covered by the signature.
	pub fn batch_url(&self, product_id: &str) -> String {
		format!(
			"{}://{}/{}",
			self.config.scheme,
			self.config.host,
			self.batch_path(product_id)
		)
	}

	/// Submits every pending event in `queue` as one signed request.
	///
	/// `queue.done()` is called only after the collector answers with a 2xx
	/// status. On any failure the queue is left untouched so the next drain
	/// resubmits the same events.
	pub async fn process(
		&self,
		queue: &dyn BatchQueue,
		credentials: &Credentials,
	) -> Result<BatchOutcome> {
		if credentials.api_key.is_empty() {
			return Err(TrackingError::MissingApiKey);
		}
		if credentials.product_id.trim().is_empty() {
			return Err(TrackingError::MissingProductId);
		}
		if self.config.host.is_empty() {
			return Err(TrackingError::InvalidHost(self.config.host.clone()));
		}

		let url = self.batch_url(&credentials.product_id);
		let sig = signature::sign(&Method::POST, &url, credentials.api_secret.expose())?;

		let events = queue.get()?;
		if events.is_empty() {
			debug!("Batch queue empty, nothing to submit");
			return Ok(BatchOutcome::Empty);
		}
		let count = events.len();

		let body = serde_json::to_vec(&BatchBody { data: &events })?;
		let request = TransportRequest::post(
			self.config.scheme.as_str(),
			self.config.host.as_str(),
			format!(
				"/{}?{}={}",
				self.batch_path(&credentials.product_id),
				SIGNATURE_PARAM,
				sig
			),
			body,
		)
		.with_header(API_KEY_HEADER, credentials.api_key.as_str())
		.with_header("Connection", "close")
		.with_header("Content-Type", "application/json");

		debug!(count, endpoint = %url, "Submitting event batch");

		let response = match tokio::time::timeout(
			self.config.request_timeout,
			self.transport.send(request),
		)
		.await
		{
			Ok(Ok(response)) => response,
			Ok(Err(e)) => {
				warn!(count, error = %e, "Batch submission failed, events left queued");
				return Err(e);
			}
			Err(_) => {
				warn!(
					count,
					timeout_secs = self.config.request_timeout.as_secs(),
					"Batch submission timed out, events left queued"
				);
				return Err(TrackingError::Timeout {
					timeout: self.config.request_timeout,
				});
			}
		};

		if !response.is_success() {
			warn!(
				count,
				status = response.status,
				"Collector rejected batch, events left queued"
			);
			return Err(TrackingError::ServerError {
				status: response.status,
				message: response.body,
			});
		}

		queue.done()?;
		info!(count, status = response.status, "Submitted event batch");

		Ok(BatchOutcome::Submitted {
			count,
			status: response.status,
		})
	}

	/// Requests a drain without waiting for the next interval.
	pub fn flush_now(&self) {
		self.flush_notify.notify_one();
	}

	/// Signals [`run`](Self::run) to drain once more and stop.
	pub fn shutdown(&self) {
		self.shutdown.store(true, Ordering::SeqCst);
		self.flush_notify.notify_one();
	}

	pub fn is_shutdown(&self) -> bool {
		self.shutdown.load(Ordering::SeqCst)
	}

	/// Drains `queue` every `flush_interval` until [`shutdown`](Self::shutdown).
	///
	/// Failures are logged and the events stay queued for the next tick.
	pub async fn run(&self, queue: &dyn BatchQueue, credentials: &Credentials) {
		info!(
			flush_interval_secs = self.config.flush_interval.as_secs(),
			host = %self.config.host,
			"Starting tracking batch processor"
		);

		loop {
			tokio::select! {
				_ = tokio::time::sleep(self.config.flush_interval) => {
					if self.is_shutdown() {
						break;
					}
					self.drain(queue, credentials, "interval").await;
				}
				_ = self.flush_notify.notified() => {
					if self.is_shutdown() {
						self.drain(queue, credentials, "shutdown").await;
						break;
					}
					self.drain(queue, credentials, "requested").await;
				}
			}
		}

		info!("Tracking batch processor stopped");
	}

	async fn drain(&self, queue: &dyn BatchQueue, credentials: &Credentials, trigger: &str) {
		if let Err(e) = self.process(queue, credentials).await {
			error!(trigger, error = %e, "Failed to drain tracking batch");
		}
	}
}
