// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HMAC-SHA256 request signatures for batch submissions.
//!
//! The signed string is `METHOD&` followed by the URI-component encoding of
//! the full request URL. The raw digest is base64-encoded and then
//! URI-component encoded once more, so it can be attached directly as the
//! `_signature` query parameter.
//!
//! Signatures are a pure function of method, URL and secret. Callers wanting
//! replay protection put a timestamp in the URL before signing.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use http::Method;
use sha2::Sha256;

use crate::error::SignatureError;
use crate::query::{decode_component, encode_component};

type HmacSha256 = Hmac<Sha256>;

/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "_signature";

/// Signs a request, returning the query-ready signature.
pub fn sign(method: &Method, url: &str, secret: &str) -> Result<String, SignatureError> {
	let mac = signed_mac(method, url, secret)?;
	let digest = STANDARD.encode(mac.finalize().into_bytes());
	Ok(encode_component(&digest))
}

/// Verifies a query-ready signature produced by [`sign`].
///
/// Returns `Ok(false)` for signatures that do not decode or do not match.
pub fn verify(
	method: &Method,
	url: &str,
	secret: &str,
	signature: &str,
) -> Result<bool, SignatureError> {
	let mac = signed_mac(method, url, secret)?;

	let decoded = match decode_component(signature) {
		Ok(s) => s,
		Err(_) => return Ok(false),
	};
	let expected = match STANDARD.decode(decoded) {
		Ok(bytes) => bytes,
		Err(_) => return Ok(false),
	};

	Ok(mac.verify_slice(&expected).is_ok())
}

/// The string covered by the signature.
pub fn string_to_sign(method: &Method, url: &str) -> String {
	format!("{}&{}", method.as_str(), encode_component(url))
}

fn signed_mac(method: &Method, url: &str, secret: &str) -> Result<HmacSha256, SignatureError> {
	if secret.is_empty() {
		return Err(SignatureError::EmptySecret);
	}

	let mut mac =
		HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
	mac.update(string_to_sign(method, url).as_bytes());
	Ok(mac)
}
