// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Record events immediately, then submit a signed batch.
//!
//! Run with:
//!   KM_API_KEY=... KM_API_SECRET=... KM_PRODUCT_ID=... \
//!     cargo run --example record -p loom-tracking

use std::sync::Arc;

use loom_tracking::{
	BatchConfig, BatchOutcome, BatchProcessor, Credentials, FileStorage, MemoryQueue, Properties,
	TrackingClient,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loom_tracking=debug")),
		)
		.init();

	let credentials = Credentials::from_env()?;
	println!("Loaded credentials: {:?}", credentials);

	// Anonymous visitor persisted between runs
	let storage_path = std::env::temp_dir().join("loom-tracking-example.json");
	let mut client = TrackingClient::builder()
		.api_key(&credentials.api_key)
		.anonymous_identity(Arc::new(FileStorage::new(&storage_path)))
		.build()?;
	println!("Anonymous identity: {:?}", client.identity());

	client
		.record("viewed pricing", Properties::new().insert("plan", "pro"))?
		.alias("example@example.com")?
		.set(Properties::new().insert("company", "Acme Inc"))?;

	for handle in client.take_handles() {
		let kind = handle.kind();
		match handle.outcome().await {
			Ok(response) => println!("  {kind}: HTTP {}", response.status),
			Err(e) => println!("  {kind}: failed: {e}"),
		}
	}

	// Batch mode: queue locally, submit once
	let queue = Arc::new(MemoryQueue::new());
	let mut batch_client = TrackingClient::builder()
		.identity("example@example.com")
		.batch_queue(queue.clone())
		.build()?;

	batch_client
		.record("purchase", Properties::new().insert("amount", 42))?
		.record("purchase", Properties::new().insert("amount", 7))?;
	println!("Queued {} events", queue.len());

	let processor = BatchProcessor::with_http(BatchConfig::default())?;
	match processor.process(queue.as_ref(), &credentials).await? {
		BatchOutcome::Submitted { count, status } => {
			println!("Submitted {count} events (HTTP {status})")
		}
		BatchOutcome::Empty => println!("Nothing to submit"),
	}

	Ok(())
}
