// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The HTTP transport capability and fire-and-forget request handles.

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use loom_tracking_core::EventKind;
use reqwest::Client;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{Result, TrackingError};

/// SDK version for the User-Agent header.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// SDK name for the User-Agent header.
const SDK_NAME: &str = "loom-tracking";

/// Returns the User-Agent sent by [`HttpTransport`].
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{SDK_VERSION}")
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
	pub method: Method,
	pub scheme: String,
	pub host: String,
	/// Path with leading slash, including any query string.
	pub path: String,
	pub headers: Vec<(String, String)>,
	pub body: Option<Vec<u8>>,
}

impl TransportRequest {
	pub fn get(scheme: impl Into<String>, host: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			method: Method::GET,
			scheme: scheme.into(),
			host: host.into(),
			path: path.into(),
			headers: Vec::new(),
			body: None,
		}
	}

	pub fn post(
		scheme: impl Into<String>,
		host: impl Into<String>,
		path: impl Into<String>,
		body: Vec<u8>,
	) -> Self {
		Self {
			method: Method::POST,
			body: Some(body),
			..Self::get(scheme, host, path)
		}
	}

	/// Adds a header (builder pattern).
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self
			.headers
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(name))
			.map(|(_, v)| v.as_str())
	}

	/// The full request URL.
	pub fn url(&self) -> String {
		format!("{}://{}{}", self.scheme, self.host, self.path)
	}

	/// The URL without its query string.
	pub fn endpoint(&self) -> String {
		let path = self.path.split('?').next().unwrap_or_default();
		format!("{}://{}{}", self.scheme, self.host, path)
	}
}

/// The collector's answer to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
	pub status: u16,
	pub body: String,
}

impl TransportResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Sends requests to the collector.
///
/// Implementations complete when the response arrives. Fire-and-forget
/// dispatch is layered on top by spawning the call (see [`RequestHandle`]).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by reqwest.
pub struct HttpTransport {
	client: Client,
	timeout: Duration,
}

impl HttpTransport {
	/// Creates a transport whose requests fail with
	/// [`TrackingError::Timeout`] after `timeout`.
	pub fn new(timeout: Duration) -> Result<Self> {
		let client = Client::builder()
			.user_agent(user_agent())
			.timeout(timeout)
			.build()
			.map_err(TrackingError::RequestFailed)?;

		Ok(Self { client, timeout })
	}

	/// Wraps an existing client. `timeout` is only used to label timeouts.
	pub fn with_client(client: Client, timeout: Duration) -> Self {
		Self { client, timeout }
	}

	fn classify(&self, err: reqwest::Error) -> TrackingError {
		if err.is_timeout() {
			TrackingError::Timeout {
				timeout: self.timeout,
			}
		} else {
			TrackingError::RequestFailed(err)
		}
	}
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
	async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
		let mut builder = self.client.request(request.method.clone(), request.url());
		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await.map_err(|e| self.classify(e))?;
		let status = response.status().as_u16();
		let body = response.text().await.map_err(|e| self.classify(e))?;

		Ok(TransportResponse { status, body })
	}
}

/// A dispatched immediate-mode request.
///
/// The request runs on its own task; the caller is never blocked. Await
/// [`RequestHandle::outcome`] to observe the result, or drop the handle to
/// let it run unobserved.
#[derive(Debug)]
pub struct RequestHandle {
	kind: EventKind,
	endpoint: String,
	task: JoinHandle<Result<TransportResponse>>,
}

impl RequestHandle {
	/// Spawns `request` on `runtime` and returns its handle.
	pub(crate) fn dispatch(
		runtime: &Handle,
		transport: Arc<dyn Transport>,
		kind: EventKind,
		request: TransportRequest,
	) -> Self {
		let endpoint = request.endpoint();
		debug!(kind = %kind, endpoint = %endpoint, "Dispatching tracking request");

		let task_endpoint = endpoint.clone();
		let task = runtime.spawn(async move {
			let result = transport.send(request).await;
			match &result {
				Ok(response) if !response.is_success() => {
					warn!(
						kind = %kind,
						endpoint = %task_endpoint,
						status = response.status,
						"Collector rejected tracking request"
					);
				}
				Ok(_) => {}
				Err(e) => {
					error!(kind = %kind, endpoint = %task_endpoint, error = %e, "Tracking request failed");
				}
			}
			result
		});

		Self {
			kind,
			endpoint,
			task,
		}
	}

	pub fn kind(&self) -> EventKind {
		self.kind
	}

	/// The request URL without its query string.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}

	/// Waits for the request to complete.
	pub async fn outcome(self) -> Result<TransportResponse> {
		match self.task.await {
			Ok(result) => result,
			Err(e) => Err(TrackingError::TaskFailed(e.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{body_string, header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn host_of(server: &MockServer) -> String {
		server.address().to_string()
	}

	#[test]
	fn request_urls() {
		let request = TransportRequest::get("https", "trk.kissmetrics.com", "/e?_k=K1&_p=U1");
		assert_eq!(request.url(), "https://trk.kissmetrics.com/e?_k=K1&_p=U1");
		assert_eq!(request.endpoint(), "https://trk.kissmetrics.com/e");
	}

	#[test]
	fn header_lookup_ignores_case() {
		let request = TransportRequest::post("http", "h", "/", Vec::new())
			.with_header("X-KM-ApiKey", "K1");
		assert_eq!(request.header("x-km-apikey"), Some("K1"));
		assert_eq!(request.header("missing"), None);
	}

	#[test]
	fn response_success_range() {
		let ok = TransportResponse {
			status: 204,
			body: String::new(),
		};
		let bad = TransportResponse {
			status: 500,
			body: String::new(),
		};
		assert!(ok.is_success());
		assert!(!bad.is_success());
	}

	#[test]
	fn user_agent_has_sdk_name() {
		assert!(user_agent().starts_with("loom-tracking/"));
	}

	#[tokio::test]
	async fn http_transport_sends_get() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/e"))
			.and(query_param("_k", "K1"))
			.and(query_param("event", "signed up"))
			.respond_with(ResponseTemplate::new(200))
			.expect(1)
			.mount(&server)
			.await;

		let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
		let response = transport
			.send(TransportRequest::get(
				"http",
				host_of(&server),
				"/e?_k=K1&event=signed%20up",
			))
			.await
			.unwrap();

		assert_eq!(response.status, 200);
	}

	#[tokio::test]
	async fn http_transport_sends_post_with_headers() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/batch"))
			.and(header("X-KM-ApiKey", "K1"))
			.and(body_string(r#"{"data":[]}"#))
			.respond_with(ResponseTemplate::new(202).set_body_string("queued"))
			.expect(1)
			.mount(&server)
			.await;

		let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
		let request = TransportRequest::post(
			"http",
			host_of(&server),
			"/v1/batch",
			br#"{"data":[]}"#.to_vec(),
		)
		.with_header("X-KM-ApiKey", "K1");

		let response = transport.send(request).await.unwrap();
		assert_eq!(response.status, 202);
		assert_eq!(response.body, "queued");
	}

	#[tokio::test]
	async fn http_transport_reports_timeout() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
			.mount(&server)
			.await;

		let transport = HttpTransport::new(Duration::from_millis(100)).unwrap();
		let result = transport
			.send(TransportRequest::get("http", host_of(&server), "/e"))
			.await;

		assert!(matches!(result, Err(TrackingError::Timeout { .. })));
	}

	#[tokio::test]
	async fn handle_reports_outcome() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;

		let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(Duration::from_secs(5)).unwrap());
		let handle = RequestHandle::dispatch(
			&Handle::current(),
			transport,
			EventKind::Set,
			TransportRequest::get("http", host_of(&server), "/s?_k=K1"),
		);

		assert_eq!(handle.kind(), EventKind::Set);
		assert!(handle.endpoint().ends_with("/s"));
		assert_eq!(handle.outcome().await.unwrap().status, 200);
	}
}
