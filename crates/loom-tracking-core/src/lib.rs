// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom behavioral tracking.
//!
//! This crate is free of I/O. It turns caller events into the collector's
//! wire schema and authenticates batch requests:
//!
//! - [`normalize`] resolves identity, name and timestamp and strips the
//!   reserved input keys (`_k`, `_n`, `_p`, `_t`, `_d`, `__type`).
//! - [`query`] renders a [`WireEvent`] as an immediate-mode query string.
//! - [`signature`] computes the HMAC-SHA256 `_signature` for batch requests.
//! - [`Credentials`] holds the API key, secret and product id for batching.
//!
//! ```
//! use loom_tracking_core::{normalize_at, query, EventKind, Properties};
//!
//! let raw = Properties::new().insert("_n", "purchase").insert("amount", 42);
//! let event = normalize_at(EventKind::Record, &raw, Some("U1"), 1_700_000_000).unwrap();
//!
//! assert_eq!(
//!     query::encode_event(&event, "K1").unwrap(),
//!     "_k=K1&_p=U1&event=purchase&amount=42&timestamp=1700000000",
//! );
//! ```

pub mod credentials;
pub mod error;
pub mod event;
pub mod normalize;
pub mod properties;
pub mod query;
pub mod signature;

pub use credentials::{ApiSecret, Credentials};
pub use error::{CredentialsError, EncodeError, SignatureError};
pub use event::{reserved, EventKind, WireEvent, IDENTITY_FIELD, TIMESTAMP_FIELD};
pub use normalize::{normalize, normalize_at};
pub use properties::Properties;
