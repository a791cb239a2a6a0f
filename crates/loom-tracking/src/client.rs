// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The tracking client: `record`, `set` and `alias`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use loom_tracking_core::{normalize, query, reserved, EventKind, Properties};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::error::{Result, TrackingError};
use crate::identity::{IdentityStore, DEFAULT_ANONYMOUS_KEY};
use crate::queue::BatchQueue;
use crate::storage::StorageBackend;
use crate::transport::{HttpTransport, RequestHandle, Transport, TransportRequest};

/// Default immediate-mode collector host.
pub const DEFAULT_TRACKING_HOST: &str = "trk.kissmetrics.com";

/// Most request handles a client retains. Older handles are detached: their
/// requests still run and failures are still logged.
pub const MAX_RETAINED_HANDLES: usize = 1000;

/// Configuration for the tracking client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Immediate-mode collector host, optionally with a port.
	pub host: String,
	pub scheme: String,
	/// Timeout for the default HTTP transport.
	pub request_timeout: Duration,
	/// Storage key of the anonymous identity.
	pub anonymous_key: String,
	/// Whether `alias` clears the stored anonymous identity.
	pub delete_anonymous_on_alias: bool,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_TRACKING_HOST.to_string(),
			scheme: "https".to_string(),
			request_timeout: Duration::from_secs(10),
			anonymous_key: DEFAULT_ANONYMOUS_KEY.to_string(),
			delete_anonymous_on_alias: true,
		}
	}
}

/// Builder for constructing a [`TrackingClient`].
pub struct TrackingClientBuilder {
	api_key: Option<String>,
	identity: Option<String>,
	anonymous_storage: Option<Arc<dyn StorageBackend>>,
	transport: Option<Arc<dyn Transport>>,
	queue: Option<Arc<dyn BatchQueue>>,
	runtime: Option<Handle>,
	config: ClientConfig,
}

impl Default for TrackingClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl TrackingClientBuilder {
	pub fn new() -> Self {
		Self {
			api_key: None,
			identity: None,
			anonymous_storage: None,
			transport: None,
			queue: None,
			runtime: None,
			config: ClientConfig::default(),
		}
	}

	/// Sets the API key sent as `_k` on immediate-mode requests.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets a known identity. Takes precedence over anonymous storage.
	pub fn identity(mut self, identity: impl Into<String>) -> Self {
		self.identity = Some(identity.into());
		self
	}

	/// Derives the identity from anonymous storage, creating one on first use.
	pub fn anonymous_identity(mut self, storage: Arc<dyn StorageBackend>) -> Self {
		self.anonymous_storage = Some(storage);
		self
	}

	pub fn anonymous_key(mut self, key: impl Into<String>) -> Self {
		self.config.anonymous_key = key.into();
		self
	}

	pub fn delete_anonymous_on_alias(mut self, delete: bool) -> Self {
		self.config.delete_anonymous_on_alias = delete;
		self
	}

	/// Sets the immediate-mode collector host, e.g. `trk.kissmetrics.com`.
	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.config.host = host.into();
		self
	}

	pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
		self.config.scheme = scheme.into();
		self
	}

	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Replaces the default reqwest transport.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Switches the client to batch mode: events go to `queue` instead of
	/// the network.
	pub fn batch_queue(mut self, queue: Arc<dyn BatchQueue>) -> Self {
		self.queue = Some(queue);
		self
	}

	/// Sets the runtime immediate-mode requests are spawned on. Defaults to
	/// the runtime the client is built in.
	pub fn runtime(mut self, runtime: Handle) -> Self {
		self.runtime = Some(runtime);
		self
	}

	/// Builds the client.
	///
	/// With anonymous storage and no explicit identity this reads the stored
	/// identity once, generating and storing a new one if absent.
	pub fn build(self) -> Result<TrackingClient> {
		let config = self.config;
		if config.host.trim().is_empty() || config.host.contains('/') {
			return Err(TrackingError::InvalidHost(config.host));
		}

		let identity_store = self
			.anonymous_storage
			.map(|storage| IdentityStore::with_key(storage, config.anonymous_key.clone()));

		let identity = match (self.identity, &identity_store) {
			(Some(identity), _) => Some(identity),
			(None, Some(store)) => Some(store.get_or_create()?),
			(None, None) => None,
		};

		let delivery = match self.queue {
			Some(queue) => Delivery::Batch { queue },
			None => {
				let runtime = match self.runtime {
					Some(runtime) => runtime,
					None => Handle::try_current().map_err(|_| TrackingError::MissingRuntime)?,
				};
				let transport: Arc<dyn Transport> = match self.transport {
					Some(transport) => transport,
					None => Arc::new(HttpTransport::new(config.request_timeout)?),
				};
				Delivery::Immediate { transport, runtime }
			}
		};

		info!(
			mode = delivery.mode(),
			host = %config.host,
			anonymous = identity_store.is_some(),
			"Tracking client initialized"
		);

		Ok(TrackingClient {
			api_key: self.api_key,
			identity,
			identity_store,
			delivery,
			config,
			handles: Vec::new(),
		})
	}
}

enum Delivery {
	Immediate {
		transport: Arc<dyn Transport>,
		runtime: Handle,
	},
	Batch {
		queue: Arc<dyn BatchQueue>,
	},
}

impl Delivery {
	fn mode(&self) -> &'static str {
		match self {
			Delivery::Immediate { .. } => "immediate",
			Delivery::Batch { .. } => "batch",
		}
	}
}

/// Records events for one subject.
///
/// In immediate mode every call dispatches one GET without waiting for it.
/// Handles of requests still in flight are kept until
/// [`take_handles`](Self::take_handles); finished ones are released on the
/// next dispatch.
/// In batch mode every call appends to the queue and a
/// [`BatchProcessor`](crate::BatchProcessor) submits them later.
///
/// # Example
///
/// ```no_run
/// use loom_tracking::{Properties, TrackingClient};
///
/// # async fn example() -> loom_tracking::Result<()> {
/// let mut client = TrackingClient::builder()
///     .api_key("K1")
///     .identity("U1")
///     .build()?;
///
/// client
///     .record("purchase", Properties::new().insert("amount", 42))?
///     .set(Properties::new().insert("plan", "pro"))?;
///
/// for handle in client.take_handles() {
///     handle.outcome().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct TrackingClient {
	api_key: Option<String>,
	identity: Option<String>,
	identity_store: Option<IdentityStore>,
	delivery: Delivery,
	config: ClientConfig,
	handles: Vec<RequestHandle>,
}

impl std::fmt::Debug for TrackingClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TrackingClient")
			.field("identity", &self.identity)
			.field("mode", &self.delivery.mode())
			.field("host", &self.config.host)
			.field("pending_handles", &self.handles.len())
			.finish()
	}
}

impl TrackingClient {
	pub fn builder() -> TrackingClientBuilder {
		TrackingClientBuilder::new()
	}

	/// Records that the subject performed `action`.
	pub fn record(&mut self, action: &str, properties: Properties) -> Result<&mut Self> {
		self.track(EventKind::Record, properties.insert(reserved::NAME, action))
	}

	/// Records `action` at an explicit time instead of now.
	pub fn record_at(
		&mut self,
		action: &str,
		properties: Properties,
		at: DateTime<Utc>,
	) -> Result<&mut Self> {
		let raw = properties
			.insert(reserved::NAME, action)
			.insert(reserved::TIMESTAMP, at.timestamp());
		self.track(EventKind::Record, raw)
	}

	/// Sets properties on the subject.
	pub fn set(&mut self, properties: Properties) -> Result<&mut Self> {
		self.track(EventKind::Set, properties)
	}

	/// Links the current identity to `target`, then becomes `target`.
	///
	/// The alias event carries the previous identity. When the client was
	/// built over anonymous storage the stored anonymous identity is cleared
	/// unless disabled in [`ClientConfig`].
	///
	/// Once the alias event is accepted the call succeeds. A failure to clear
	/// the stored identity is logged and does not fail the call.
	pub fn alias(&mut self, target: &str) -> Result<&mut Self> {
		self.track(
			EventKind::Alias,
			Properties::new().insert(reserved::NAME, target),
		)?;

		let previous = self.identity.replace(target.to_string());
		debug!(
			previous = previous.as_deref().unwrap_or_default(),
			identity = %target,
			"Switched tracking identity"
		);

		if self.config.delete_anonymous_on_alias {
			if let Some(store) = &self.identity_store {
				if let Err(e) = store.delete() {
					warn!(
						key = %store.key(),
						error = %e,
						"Failed to clear anonymous identity after alias"
					);
				}
			}
		}

		Ok(self)
	}

	fn track(&mut self, kind: EventKind, raw: Properties) -> Result<&mut Self> {
		let handle = match &self.delivery {
			Delivery::Batch { queue } => {
				let event = normalize(kind, &raw, self.identity.as_deref())?;
				queue.add(event)?;
				debug!(kind = %kind, "Queued tracking event");
				None
			}
			Delivery::Immediate { transport, runtime } => {
				let api_key = self
					.api_key
					.as_deref()
					.filter(|k| !k.is_empty())
					.ok_or(TrackingError::MissingApiKey)?;

				let event = normalize(kind, &raw, self.identity.as_deref())?;
				if event.identity.as_deref().map_or(true, str::is_empty) {
					return Err(TrackingError::MissingIdentity);
				}

				let query = query::encode_event(&event, api_key)?;
				let request = TransportRequest::get(
					self.config.scheme.as_str(),
					self.config.host.as_str(),
					format!("/{}?{}", kind.query_code(), query),
				);
				Some(RequestHandle::dispatch(
					runtime,
					transport.clone(),
					kind,
					request,
				))
			}
		};

		if let Some(handle) = handle {
			self.retain_handle(handle);
		}
		Ok(self)
	}

	fn retain_handle(&mut self, handle: RequestHandle) {
		let before = self.handles.len();
		self.handles.retain(|h| !h.is_finished());
		if self.handles.len() >= MAX_RETAINED_HANDLES {
			let excess = self.handles.len() + 1 - MAX_RETAINED_HANDLES;
			self.handles.drain(..excess);
		}

		let released = before - self.handles.len();
		if released > 0 {
			debug!(released, retained = self.handles.len(), "Released request handles");
		}
		self.handles.push(handle);
	}

	/// The identity attached to subsequent events.
	pub fn identity(&self) -> Option<&str> {
		self.identity.as_deref()
	}

	pub fn is_batch(&self) -> bool {
		matches!(self.delivery, Delivery::Batch { .. })
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Handles of immediate-mode requests not yet released.
	pub fn handles(&self) -> &[RequestHandle] {
		&self.handles
	}

	/// Removes and returns the accumulated request handles.
	pub fn take_handles(&mut self) -> Vec<RequestHandle> {
		std::mem::take(&mut self.handles)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::queue::MemoryQueue;
	use crate::storage::MemoryStorage;
	use crate::transport::TransportResponse;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingTransport {
		requests: Mutex<Vec<TransportRequest>>,
	}

	impl RecordingTransport {
		fn paths(&self) -> Vec<String> {
			self
				.requests
				.lock()
				.unwrap()
				.iter()
				.map(|r| r.path.clone())
				.collect()
		}
	}

	#[async_trait::async_trait]
	impl Transport for RecordingTransport {
		async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
			self.requests.lock().unwrap().push(request);
			Ok(TransportResponse {
				status: 200,
				body: String::new(),
			})
		}
	}

	async fn settle(client: &mut TrackingClient) {
		for handle in client.take_handles() {
			handle.outcome().await.unwrap();
		}
	}

	#[test]
	fn default_config() {
		let config = ClientConfig::default();
		assert_eq!(config.host, "trk.kissmetrics.com");
		assert_eq!(config.scheme, "https");
		assert_eq!(config.request_timeout, Duration::from_secs(10));
		assert_eq!(config.anonymous_key, "km_ai");
		assert!(config.delete_anonymous_on_alias);
	}

	#[test]
	fn immediate_mode_needs_a_runtime() {
		let err = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.build()
			.unwrap_err();
		assert!(matches!(err, TrackingError::MissingRuntime));
	}

	#[test]
	fn rejects_invalid_host() {
		let err = TrackingClient::builder()
			.host("https://trk.kissmetrics.com")
			.batch_queue(Arc::new(MemoryQueue::new()))
			.build()
			.unwrap_err();
		assert!(matches!(err, TrackingError::InvalidHost(_)));
	}

	#[tokio::test]
	async fn record_dispatches_purchase_query() {
		let transport = Arc::new(RecordingTransport::default());
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.transport(transport.clone())
			.build()
			.unwrap();

		let before = Utc::now().timestamp();
		client
			.record("purchase", Properties::new().insert("amount", 42))
			.unwrap();
		assert_eq!(client.handles().len(), 1);
		assert_eq!(client.handles()[0].kind(), EventKind::Record);
		settle(&mut client).await;

		let requests = transport.requests.lock().unwrap();
		let request = &requests[0];
		assert_eq!(request.method, http::Method::GET);
		assert_eq!(request.scheme, "https");
		assert_eq!(request.host, "trk.kissmetrics.com");

		let (prefix, ts) = request.path.rsplit_once("&timestamp=").unwrap();
		assert_eq!(prefix, "/e?_k=K1&_p=U1&event=purchase&amount=42");
		assert!(ts.parse::<i64>().unwrap() >= before);
	}

	#[tokio::test]
	async fn calls_chain_in_order() {
		let transport = Arc::new(RecordingTransport::default());
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.transport(transport.clone())
			.build()
			.unwrap();

		client
			.record("signed up", Properties::new())
			.unwrap()
			.set(Properties::new().insert("plan", "pro"))
			.unwrap();

		let kinds: Vec<_> = client.handles().iter().map(|h| h.kind()).collect();
		assert_eq!(kinds, vec![EventKind::Record, EventKind::Set]);
		settle(&mut client).await;

		let mut paths = transport.paths();
		paths.sort();
		assert!(paths[0].starts_with("/e?_k=K1&_p=U1&event=signed%20up&timestamp="));
		assert!(paths[1].starts_with("/s?_k=K1&_p=U1&plan=pro&timestamp="));
	}

	#[tokio::test]
	async fn record_at_uses_explicit_time() {
		let transport = Arc::new(RecordingTransport::default());
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.transport(transport.clone())
			.build()
			.unwrap();

		let at = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
		client.record_at("login", Properties::new(), at).unwrap();
		settle(&mut client).await;

		assert_eq!(
			transport.paths(),
			vec!["/e?_k=K1&_p=U1&event=login&timestamp=1600000000"]
		);
	}

	#[tokio::test]
	async fn per_event_identity_override() {
		let transport = Arc::new(RecordingTransport::default());
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.transport(transport.clone())
			.build()
			.unwrap();

		client
			.set(Properties::new().insert("_p", "U2").insert("_t", 5))
			.unwrap();
		settle(&mut client).await;

		assert_eq!(transport.paths(), vec!["/s?_k=K1&_p=U2&timestamp=5"]);
		assert_eq!(client.identity(), Some("U1"));
	}

	#[tokio::test]
	async fn missing_api_key_is_rejected() {
		let mut client = TrackingClient::builder()
			.identity("U1")
			.transport(Arc::new(RecordingTransport::default()))
			.build()
			.unwrap();

		let err = client.record("x", Properties::new()).unwrap_err();
		assert!(matches!(err, TrackingError::MissingApiKey));
		assert!(err.is_configuration());
		assert!(client.handles().is_empty());
	}

	#[tokio::test]
	async fn missing_identity_is_rejected() {
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.transport(Arc::new(RecordingTransport::default()))
			.build()
			.unwrap();

		let err = client.record("x", Properties::new()).unwrap_err();
		assert!(matches!(err, TrackingError::MissingIdentity));
	}

	#[tokio::test]
	async fn non_scalar_property_is_rejected() {
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.transport(Arc::new(RecordingTransport::default()))
			.build()
			.unwrap();

		let err = client
			.record("x", Properties::new().insert("cart", vec![1, 2]))
			.unwrap_err();
		assert!(matches!(err, TrackingError::Encoding(_)));
		assert!(client.handles().is_empty());
	}

	#[tokio::test]
	async fn alias_uses_previous_identity_then_switches() {
		let storage = Arc::new(MemoryStorage::new());
		storage.set("km_ai", "anon-123").unwrap();
		let transport = Arc::new(RecordingTransport::default());

		let mut client = TrackingClient::builder()
			.api_key("K1")
			.anonymous_identity(storage.clone())
			.transport(transport.clone())
			.build()
			.unwrap();
		assert_eq!(client.identity(), Some("anon-123"));

		client.alias("new-id").unwrap();
		settle(&mut client).await;

		let paths = transport.paths();
		assert_eq!(paths.len(), 1);
		assert!(paths[0].starts_with("/a?_k=K1&_p=anon-123&alias=new-id&timestamp="));
		assert_eq!(client.identity(), Some("new-id"));
		assert_eq!(storage.get("km_ai").unwrap(), None);
	}

	#[tokio::test]
	async fn alias_can_keep_anonymous_identity() {
		let storage = Arc::new(MemoryStorage::new());
		storage.set("anon", "anon-123").unwrap();

		let mut client = TrackingClient::builder()
			.api_key("K1")
			.anonymous_identity(storage.clone())
			.anonymous_key("anon")
			.delete_anonymous_on_alias(false)
			.transport(Arc::new(RecordingTransport::default()))
			.build()
			.unwrap();

		client.alias("new-id").unwrap();
		assert_eq!(client.identity(), Some("new-id"));
		assert_eq!(storage.get("anon").unwrap().as_deref(), Some("anon-123"));
	}

	#[tokio::test]
	async fn failed_alias_keeps_identity() {
		let storage = Arc::new(MemoryStorage::new());
		let mut client = TrackingClient::builder()
			.anonymous_identity(storage.clone())
			.transport(Arc::new(RecordingTransport::default()))
			.build()
			.unwrap();
		let anonymous = client.identity().map(str::to_string);

		assert!(client.alias("new-id").is_err());
		assert_eq!(client.identity().map(str::to_string), anonymous);
		assert!(storage.get("km_ai").unwrap().is_some());
	}

	/// Storage whose `delete` always fails.
	#[derive(Default)]
	struct StuckStorage {
		inner: MemoryStorage,
	}

	impl StorageBackend for StuckStorage {
		fn get(&self, key: &str) -> Result<Option<String>> {
			self.inner.get(key)
		}

		fn set(&self, key: &str, value: &str) -> Result<()> {
			self.inner.set(key, value)
		}

		fn delete(&self, _key: &str) -> Result<()> {
			Err(TrackingError::Storage("read-only".to_string()))
		}
	}

	#[tokio::test]
	async fn alias_succeeds_when_clearing_storage_fails() {
		let storage = Arc::new(StuckStorage::default());
		storage.set("km_ai", "anon-123").unwrap();
		let transport = Arc::new(RecordingTransport::default());

		let mut client = TrackingClient::builder()
			.api_key("K1")
			.anonymous_identity(storage.clone())
			.transport(transport.clone())
			.build()
			.unwrap();

		client.alias("new-id").unwrap();
		assert_eq!(client.identity(), Some("new-id"));
		assert_eq!(client.handles().len(), 1);
		settle(&mut client).await;

		let paths = transport.paths();
		assert_eq!(paths.len(), 1);
		assert!(paths[0].starts_with("/a?_k=K1&_p=anon-123&alias=new-id&timestamp="));
		assert_eq!(storage.get("km_ai").unwrap().as_deref(), Some("anon-123"));
	}

	#[tokio::test]
	async fn empty_person_override_uses_client_identity() {
		let transport = Arc::new(RecordingTransport::default());
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.transport(transport.clone())
			.build()
			.unwrap();

		client
			.set(Properties::new().insert("_p", "").insert("_t", 5))
			.unwrap();
		settle(&mut client).await;

		assert_eq!(transport.paths(), vec!["/s?_k=K1&_p=U1&timestamp=5"]);
	}

	#[tokio::test]
	async fn retained_handles_stay_bounded() {
		let transport = Arc::new(RecordingTransport::default());
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.transport(transport.clone())
			.build()
			.unwrap();

		for i in 0..(2 * MAX_RETAINED_HANDLES) {
			client
				.record("viewed page", Properties::new().insert("n", i as u64))
				.unwrap();
			assert!(client.handles().len() <= MAX_RETAINED_HANDLES);
		}

		while client.handles().iter().any(|h| !h.is_finished()) {
			tokio::task::yield_now().await;
		}
		client.record("viewed page", Properties::new()).unwrap();
		assert_eq!(client.handles().len(), 1);

		settle(&mut client).await;
		while transport.requests.lock().unwrap().len() < 2 * MAX_RETAINED_HANDLES + 1 {
			tokio::task::yield_now().await;
		}
	}

	#[test]
	fn anonymous_identity_is_created_and_persisted() {
		let storage = Arc::new(MemoryStorage::new());
		let client = TrackingClient::builder()
			.anonymous_identity(storage.clone())
			.batch_queue(Arc::new(MemoryQueue::new()))
			.build()
			.unwrap();

		let identity = client.identity().unwrap().to_string();
		assert_eq!(identity.len(), 44);
		assert_eq!(storage.get("km_ai").unwrap(), Some(identity.clone()));

		let again = TrackingClient::builder()
			.anonymous_identity(storage)
			.batch_queue(Arc::new(MemoryQueue::new()))
			.build()
			.unwrap();
		assert_eq!(again.identity(), Some(identity.as_str()));
	}

	#[test]
	fn explicit_identity_wins_over_storage() {
		let storage = Arc::new(MemoryStorage::new());
		let client = TrackingClient::builder()
			.identity("U1")
			.anonymous_identity(storage.clone())
			.batch_queue(Arc::new(MemoryQueue::new()))
			.build()
			.unwrap();

		assert_eq!(client.identity(), Some("U1"));
		assert_eq!(storage.get("km_ai").unwrap(), None);
	}

	#[test]
	fn batch_mode_queues_without_api_key() {
		let queue = Arc::new(MemoryQueue::new());
		let mut client = TrackingClient::builder()
			.identity("U1")
			.batch_queue(queue.clone())
			.build()
			.unwrap();
		assert!(client.is_batch());

		client
			.record("purchase", Properties::new().insert("amount", 42))
			.unwrap()
			.alias("U2")
			.unwrap();

		let events = queue.get().unwrap();
		assert_eq!(events.len(), 2);
		assert_eq!(events[0].kind, EventKind::Record);
		assert_eq!(events[0].identity.as_deref(), Some("U1"));
		assert_eq!(events[0].name.as_deref(), Some("purchase"));
		assert_eq!(events[1].kind, EventKind::Alias);
		assert_eq!(events[1].identity.as_deref(), Some("U1"));
		assert_eq!(events[1].name.as_deref(), Some("U2"));
		assert!(client.handles().is_empty());
	}

	#[test]
	fn explicit_runtime_handle_from_sync_code() {
		let runtime = tokio::runtime::Runtime::new().unwrap();
		let transport = Arc::new(RecordingTransport::default());
		let mut client = TrackingClient::builder()
			.api_key("K1")
			.identity("U1")
			.runtime(runtime.handle().clone())
			.transport(transport.clone())
			.build()
			.unwrap();

		client.set(Properties::new().insert("plan", "pro")).unwrap();
		for handle in client.take_handles() {
			let response = tokio_test::block_on(handle.outcome()).unwrap();
			assert!(response.is_success());
		}
		assert_eq!(transport.paths().len(), 1);
	}
}
