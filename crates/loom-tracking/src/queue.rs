// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The batch queue capability and an in-memory implementation.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use loom_tracking_core::WireEvent;
use tracing::{debug, warn};

use crate::error::{Result, TrackingError};

/// Default bound on [`MemoryQueue`] before the oldest events are dropped.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 1000;

/// Buffers normalized events until the [`BatchProcessor`](crate::BatchProcessor)
/// drains them.
///
/// The queue owns buffered events. `get` returns everything pending; `done`
/// discards what the last `get` returned and is only called after a
/// successful submission. Implementations must serialize `add` against
/// `get`+`done` so that events added during a drain survive it.
pub trait BatchQueue: Send + Sync {
	fn add(&self, event: WireEvent) -> Result<()>;
	fn get(&self) -> Result<Vec<WireEvent>>;
	fn done(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct QueueState {
	pending: VecDeque<WireEvent>,
	/// Length of the prefix of `pending` handed out by the last `get`.
	in_flight: usize,
}

/// In-process FIFO [`BatchQueue`].
#[derive(Debug)]
pub struct MemoryQueue {
	state: Mutex<QueueState>,
	max_size: usize,
}

impl Default for MemoryQueue {
	fn default() -> Self {
		Self::with_max_size(DEFAULT_MAX_QUEUE_SIZE)
	}
}

impl MemoryQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_max_size(max_size: usize) -> Self {
		Self {
			state: Mutex::default(),
			max_size: max_size.max(1),
		}
	}

	/// Number of pending events, including any in flight.
	pub fn len(&self) -> usize {
		self.lock().map(|s| s.pending.len()).unwrap_or_default()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> Result<MutexGuard<'_, QueueState>> {
		self
			.state
			.lock()
			.map_err(|_| TrackingError::Queue("memory queue lock poisoned".to_string()))
	}
}

impl BatchQueue for MemoryQueue {
	fn add(&self, event: WireEvent) -> Result<()> {
		let mut state = self.lock()?;

		while state.pending.len() >= self.max_size {
			if let Some(dropped) = state.pending.pop_front() {
				warn!(
					kind = %dropped.kind,
					identity = dropped.identity.as_deref().unwrap_or_default(),
					"Dropped event due to queue overflow"
				);
			}
			state.in_flight = state.in_flight.saturating_sub(1);
		}

		state.pending.push_back(event);
		Ok(())
	}

	fn get(&self) -> Result<Vec<WireEvent>> {
		let mut state = self.lock()?;
		state.in_flight = state.pending.len();
		Ok(state.pending.iter().cloned().collect())
	}

	fn done(&self) -> Result<()> {
		let mut state = self.lock()?;
		let drained = state.in_flight.min(state.pending.len());
		state.pending.drain(..drained);
		state.in_flight = 0;
		debug!(drained, remaining = state.pending.len(), "Discarded submitted events");
		Ok(())
	}
}
