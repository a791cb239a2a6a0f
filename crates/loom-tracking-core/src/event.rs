// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event kinds, reserved keys and the normalized wire event.
//!
//! The collector protocol reserves a handful of short field names on input:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `_k` | API key |
//! | `_p` | person (identity) |
//! | `_n` | action name or alias target |
//! | `_t` | explicit timestamp override |
//! | `_d` | deprecated, consumed and dropped |
//! | `__type` | batch dispatch discriminator |
//!
//! None of these survive normalization. A [`WireEvent`] carries the resolved
//! values in typed fields and renders them for either delivery path.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::properties::Properties;

/// Reserved input keys consumed during normalization.
pub mod reserved {
	pub const API_KEY: &str = "_k";
	pub const NAME: &str = "_n";
	pub const PERSON: &str = "_p";
	pub const TIMESTAMP: &str = "_t";
	pub const DEPRECATED: &str = "_d";
	pub const TYPE: &str = "__type";

	pub const ALL: [&str; 6] = [API_KEY, NAME, PERSON, TIMESTAMP, DEPRECATED, TYPE];

	/// Returns `true` if `key` is one of the reserved input keys.
	pub fn is_reserved(key: &str) -> bool {
		ALL.contains(&key)
	}
}

/// Wire field carrying the identity in batch records.
pub const IDENTITY_FIELD: &str = "identity";
/// Wire field carrying the resolved timestamp.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// The three kinds of tracking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	/// An action performed by a person.
	Record,
	/// Properties set on a person.
	Set,
	/// One identity linked to another.
	Alias,
}

impl EventKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			EventKind::Record => "record",
			EventKind::Set => "set",
			EventKind::Alias => "alias",
		}
	}

	/// Path segment of the immediate-mode endpoint.
	pub fn query_code(&self) -> &'static str {
		match self {
			EventKind::Record => "e",
			EventKind::Set => "s",
			EventKind::Alias => "a",
		}
	}

	/// Wire field that receives the `_n` value, if this kind has one.
	pub fn name_field(&self) -> Option<&'static str> {
		match self {
			EventKind::Record => Some("event"),
			EventKind::Alias => Some("alias"),
			EventKind::Set => None,
		}
	}
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for EventKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"record" => Ok(EventKind::Record),
			"set" => Ok(EventKind::Set),
			"alias" => Ok(EventKind::Alias),
			_ => Err(format!("invalid event kind: {}", s)),
		}
	}
}

/// A normalized event, free of reserved input keys.
///
/// `kind` is the transient discriminator: it selects the endpoint and the name
/// field but is never itself serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct WireEvent {
	pub kind: EventKind,
	pub identity: Option<String>,
	pub name: Option<String>,
	pub timestamp: i64,
	pub properties: Properties,
}

impl WireEvent {
	/// Renders the record submitted in a batch body.
	///
	/// Field order: `identity`, then the name field, business properties and
	/// `timestamp`.
	pub fn to_record(&self) -> Properties {
		let mut out = Properties::new();
		if let Some(identity) = &self.identity {
			out.put(IDENTITY_FIELD, identity.as_str());
		}
		self.push_fields(&mut out);
		out
	}

	/// Renders the fields of an immediate-mode query.
	///
	/// Field order: `_k`, `_p`, then the name field, business properties and
	/// `timestamp`.
	pub fn to_query_fields(&self, api_key: &str) -> Properties {
		let mut out = Properties::new();
		out.put(reserved::API_KEY, api_key);
		if let Some(identity) = &self.identity {
			out.put(reserved::PERSON, identity.as_str());
		}
		self.push_fields(&mut out);
		out
	}

	fn push_fields(&self, out: &mut Properties) {
		if let (Some(field), Some(name)) = (self.kind.name_field(), &self.name) {
			out.put(field, name.as_str());
		}
		for (k, v) in self.properties.iter() {
			out.put(k, v.clone());
		}
		out.put(TIMESTAMP_FIELD, Value::from(self.timestamp));
	}
}

impl Serialize for WireEvent {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.to_record().serialize(serializer)
	}
}
