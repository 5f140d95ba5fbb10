//! Unverified claim decoding for compact identity tokens.
//!
//! A token is split into its `header.payload.signature` segments and the payload is
//! base64url-decoded into a JSON object. Nothing here checks the signature: the result is a
//! bag of claims asserted by whoever produced the string.

// crates.io
use base64::{
	DecodeError,
	Engine as _,
	engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Reasons a token (or a stored claim set) could not be decoded.
#[derive(Debug, ThisError)]
pub enum TokenDecodeError {
	/// The token does not have exactly three dot-separated segments.
	#[error("Token has {segments} segments; expected 3.")]
	Structure {
		/// Number of segments found.
		segments: usize,
	},
	/// The payload segment is empty.
	#[error("Token payload segment is empty.")]
	EmptyPayload,
	/// The payload is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Base64 {
		/// Underlying decoding failure.
		#[source]
		source: DecodeError,
	},
	/// The decoded payload is not valid JSON.
	#[error("Token payload is not valid JSON.")]
	Json {
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// The decoded payload is JSON but not an object.
	#[error("Token payload is not a JSON object.")]
	NotAnObject,
}

/// Decoded claims carried by an identity token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);
impl ClaimSet {
	/// Decodes the payload segment of a compact token.
	pub fn decode(token: &str) -> Result<Self, TokenDecodeError> {
		let segments = token.split('.').collect::<Vec<_>>();

		if segments.len() != 3 {
			return Err(TokenDecodeError::Structure { segments: segments.len() });
		}

		Self::from_encoded_json(segments[1])
	}

	/// Decodes the value produced by [`ClaimSet::to_storage_value`].
	pub fn from_storage_value(value: &str) -> Result<Self, TokenDecodeError> {
		Self::from_encoded_json(value)
	}

	/// Encodes the claims as base64url JSON, safe to place in a cookie verbatim.
	pub fn to_storage_value(&self) -> String {
		URL_SAFE_NO_PAD.encode(Value::Object(self.0.clone()).to_string())
	}

	/// Returns a claim by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// Returns a string-valued claim by name.
	pub fn get_str(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(Value::as_str)
	}

	/// Subject identifier (`sub`).
	pub fn subject(&self) -> Option<&str> {
		self.get_str("sub")
	}

	/// Email address (`email`).
	pub fn email(&self) -> Option<&str> {
		self.get_str("email")
	}

	/// Display name (`name`).
	pub fn name(&self) -> Option<&str> {
		self.get_str("name")
	}

	/// Expiry instant derived from the numeric `exp` claim.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let exp = self.get("exp")?;
		let seconds = exp.as_i64().or_else(|| exp.as_f64().map(|secs| secs.trunc() as i64))?;

		OffsetDateTime::from_unix_timestamp(seconds).ok()
	}

	/// Returns true when `exp` is present and not after `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| expires_at <= now)
	}

	/// Number of claims.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if the claim set is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over claim names and values.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	fn from_encoded_json(segment: &str) -> Result<Self, TokenDecodeError> {
		if segment.is_empty() {
			return Err(TokenDecodeError::EmptyPayload);
		}

		let bytes = URL_SAFE_NO_PAD
			.decode(segment)
			.or_else(|_| URL_SAFE.decode(segment))
			.map_err(|source| TokenDecodeError::Base64 { source })?;

		match serde_json::from_slice(&bytes).map_err(|source| TokenDecodeError::Json { source })? {
			Value::Object(map) => Ok(Self(map)),
			_ => Err(TokenDecodeError::NotAnObject),
		}
	}
}
impl From<Map<String, Value>> for ClaimSet {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
