// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Normalization of caller events into the collector's wire schema.
//!
//! Normalization reads the reserved input keys, resolves identity, name and
//! timestamp, and copies every remaining business property forward into a
//! fresh mapping. The caller's properties are never mutated.
//!
//! Resolution order:
//!
//! - identity: `_p`, then `identity`, then the client identity
//! - name (record/alias only): `_n`, then the kind's name field
//! - timestamp: `_t`, then `timestamp`, then the current time
//!
//! Reading the rendered wire fields as fallbacks makes a second pass over
//! [`WireEvent::to_record`] produce the same event.

use chrono::Utc;
use serde_json::Value;

use crate::error::EncodeError;
use crate::event::{reserved, EventKind, WireEvent, IDENTITY_FIELD, TIMESTAMP_FIELD};
use crate::properties::Properties;

/// Normalizes `raw` using the current wall-clock time as the default timestamp.
pub fn normalize(
	kind: EventKind,
	raw: &Properties,
	identity: Option<&str>,
) -> Result<WireEvent, EncodeError> {
	normalize_at(kind, raw, identity, Utc::now().timestamp())
}

/// Normalizes `raw` with `now` (seconds since the epoch) as the default
/// timestamp.
///
/// An explicit override always wins over `now`.
pub fn normalize_at(
	kind: EventKind,
	raw: &Properties,
	identity: Option<&str>,
	now: i64,
) -> Result<WireEvent, EncodeError> {
	let explicit_identity =
		first_scalar_where(raw, &[reserved::PERSON, IDENTITY_FIELD], |s| !s.is_empty())?;
	let identity = explicit_identity.or_else(|| identity.map(str::to_string));

	let name = match kind.name_field() {
		Some(field) => first_scalar(raw, &[reserved::NAME, field])?,
		None => None,
	};

	let timestamp = match first_timestamp(raw, &[reserved::TIMESTAMP, TIMESTAMP_FIELD])? {
		Some(ts) => ts,
		None => now,
	};

	let properties: Properties = raw
		.iter()
		.filter(|(key, _)| !is_consumed(kind, key))
		.map(|(key, value)| (key, value.clone()))
		.collect();

	Ok(WireEvent {
		kind,
		identity,
		name,
		timestamp,
		properties,
	})
}

fn is_consumed(kind: EventKind, key: &str) -> bool {
	reserved::is_reserved(key)
		|| key == IDENTITY_FIELD
		|| key == TIMESTAMP_FIELD
		|| kind.name_field() == Some(key)
}

fn first_scalar(raw: &Properties, keys: &[&str]) -> Result<Option<String>, EncodeError> {
	first_scalar_where(raw, keys, |_| true)
}

/// Like [`first_scalar`], skipping values `accept` rejects.
fn first_scalar_where<F>(
	raw: &Properties,
	keys: &[&str],
	accept: F,
) -> Result<Option<String>, EncodeError>
where
	F: Fn(&str) -> bool,
{
	for key in keys {
		if let Some(value) = raw.get(key) {
			if let Some(s) = scalar_to_string(key, value)?.filter(|s| accept(s)) {
				return Ok(Some(s));
			}
		}
	}
	Ok(None)
}

fn first_timestamp(raw: &Properties, keys: &[&str]) -> Result<Option<i64>, EncodeError> {
	for key in keys {
		match raw.get(key) {
			None | Some(Value::Null) => continue,
			Some(value) => return parse_timestamp(key, value).map(Some),
		}
	}
	Ok(None)
}

/// Renders a scalar as the string the collector receives.
///
/// `null` reads as absent; arrays and objects are rejected.
pub(crate) fn scalar_to_string(key: &str, value: &Value) -> Result<Option<String>, EncodeError> {
	match value {
		Value::Null => Ok(None),
		Value::String(s) => Ok(Some(s.clone())),
		Value::Number(n) => Ok(Some(n.to_string())),
		Value::Bool(b) => Ok(Some(b.to_string())),
		Value::Array(_) | Value::Object(_) => Err(EncodeError::NonScalar {
			key: key.to_string(),
		}),
	}
}

fn parse_timestamp(key: &str, value: &Value) -> Result<i64, EncodeError> {
	let invalid = || EncodeError::InvalidTimestamp {
		key: key.to_string(),
		value: value.to_string(),
	};

	match value {
		Value::Number(n) => n
			.as_i64()
			.or_else(|| n.as_f64().map(|f| f.round() as i64))
			.ok_or_else(invalid),
		Value::String(s) => {
			let s = s.trim();
			s.parse::<i64>()
				.ok()
				.or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
				.ok_or_else(invalid)
		}
		_ => Err(invalid()),
	}
}
