// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK for Loom behavioral tracking.
//!
//! The client records three kinds of event for a subject: actions
//! (`record`), properties (`set`) and identity links (`alias`). Each event is
//! delivered in one of two modes:
//!
//! - **Immediate**: one fire-and-forget GET per event to the tracking
//!   collector, carrying the API key and identity in the query string.
//! - **Batch**: events are appended to a [`BatchQueue`] and a
//!   [`BatchProcessor`] later submits them as one HMAC-signed POST.
//!
//! # Quick Start
//!
//! ```ignore
//! use loom_tracking::{Properties, TrackingClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = TrackingClient::builder()
//!         .api_key("K1")
//!         .identity("user@example.com")
//!         .build()?;
//!
//!     client
//!         .record("purchase", Properties::new().insert("amount", 42))?
//!         .set(Properties::new().insert("plan", "pro"))?;
//!
//!     for handle in client.take_handles() {
//!         handle.outcome().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Batching
//!
//! ```ignore
//! use std::sync::Arc;
//! use loom_tracking::{BatchConfig, BatchProcessor, Credentials, MemoryQueue, TrackingClient};
//!
//! let queue = Arc::new(MemoryQueue::new());
//! let mut client = TrackingClient::builder()
//!     .identity("user@example.com")
//!     .batch_queue(queue.clone())
//!     .build()?;
//! client.record("signed up", Properties::new())?;
//!
//! let processor = BatchProcessor::with_http(BatchConfig::default())?;
//! processor.process(queue.as_ref(), &Credentials::from_env()?).await?;
//! ```
//!
//! Events stay queued until the collector accepts the batch, so a failed
//! submission is retried by the next drain.
//!
//! # Anonymous identity
//!
//! Without a known identity the client can derive one from a
//! [`StorageBackend`]: the stored token is read once at build time and
//! generated if absent. `alias` clears it once the subject is known.

pub mod client;
pub mod error;
pub mod identity;
pub mod processor;
pub mod queue;
pub mod storage;
pub mod transport;

pub use client::{
	ClientConfig, TrackingClient, TrackingClientBuilder, DEFAULT_TRACKING_HOST, MAX_RETAINED_HANDLES,
};
pub use error::{Result, TrackingError};
pub use identity::{generate_anonymous_id, IdentityStore, DEFAULT_ANONYMOUS_KEY};
pub use processor::{BatchConfig, BatchOutcome, BatchProcessor, API_KEY_HEADER, DEFAULT_BATCH_HOST};
pub use queue::{BatchQueue, MemoryQueue};
pub use storage::{CookieOptions, CookieStorage, FileStorage, MemoryStorage, StorageBackend};
pub use transport::{HttpTransport, RequestHandle, Transport, TransportRequest, TransportResponse};

pub use loom_tracking_core::{ApiSecret, Credentials, EventKind, Properties, WireEvent};
