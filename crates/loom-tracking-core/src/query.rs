// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query-string encoding for immediate-mode delivery.
//!
//! Keys and values are encoded independently with URI-component rules: every
//! byte except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is percent-encoded, and spaces
//! become `%20` rather than `+`.

use crate::error::EncodeError;
use crate::event::WireEvent;
use crate::normalize::scalar_to_string;
use crate::properties::Properties;

/// Sub-delimiters URI-component encoding leaves as-is but `urlencoding`
/// escapes.
const UNESCAPED: [(&str, &str); 5] = [
	("%21", "!"),
	("%2A", "*"),
	("%27", "'"),
	("%28", "("),
	("%29", ")"),
];

/// Percent-encodes a single URI component.
pub fn encode_component(input: &str) -> String {
	let mut encoded = urlencoding::encode(input).into_owned();
	for (escaped, raw) in UNESCAPED {
		if encoded.contains(escaped) {
			encoded = encoded.replace(escaped, raw);
		}
	}
	encoded
}

/// Decodes a percent-encoded URI component.
pub fn decode_component(input: &str) -> Result<String, EncodeError> {
	urlencoding::decode(input)
		.map(|s| s.into_owned())
		.map_err(|e| EncodeError::MalformedComponent(e.to_string()))
}

/// Encodes `fields` as `key1=val1&key2=val2`, in insertion order.
///
/// `null` values encode as an empty string. Arrays and objects fail with
/// [`EncodeError::NonScalar`].
pub fn encode(fields: &Properties) -> Result<String, EncodeError> {
	let mut parts = Vec::with_capacity(fields.len());
	for (key, value) in fields.iter() {
		let value = scalar_to_string(key, value)?.unwrap_or_default();
		parts.push(format!(
			"{}={}",
			encode_component(key),
			encode_component(&value)
		));
	}
	Ok(parts.join("&"))
}

/// Encodes the immediate-mode query for `event`, authenticated by `api_key`.
pub fn encode_event(event: &WireEvent, api_key: &str) -> Result<String, EncodeError> {
	encode(&event.to_query_fields(api_key))
}

/// Splits and decodes a query string produced by [`encode`].
pub fn decode(query: &str) -> Result<Vec<(String, String)>, EncodeError> {
	if query.is_empty() {
		return Ok(Vec::new());
	}

	query
		.split('&')
		.map(|pair| {
			let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
			Ok((decode_component(key)?, decode_component(value)?))
		})
		.collect()
}
