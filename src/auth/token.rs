//! Redacted token wrapper keeping sensitive material out of logs.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{ClaimSet, TokenDecodeError},
};

const FINGERPRINT_BYTES: usize = 6;

/// Bearer or identity token exactly as the provider issued it.
///
/// The wrapper never verifies the token's signature; [`TokenSecret::claims`] only decodes the
/// payload segment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a raw token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Decodes the payload segment into a claim set.
	pub fn claims(&self) -> Result<ClaimSet, TokenDecodeError> {
		ClaimSet::decode(&self.0)
	}

	/// Short digest safe to log.
	pub fn fingerprint(&self) -> String {
		fingerprint(&self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Base64url (no padding) encoding of the first bytes of a SHA-256 digest.
pub fn fingerprint(value: &str) -> String {
	let digest = Sha256::digest(value.as_bytes());

	URL_SAFE_NO_PAD.encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = TokenSecret::new("header.payload.signature");

		assert_eq!(format!("{token:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn fingerprint_is_short_and_stable() {
		let token = TokenSecret::new("header.payload.signature");

		assert_eq!(token.fingerprint(), fingerprint("header.payload.signature"));
		assert_eq!(token.fingerprint().len(), 8);
		assert_ne!(token.fingerprint(), fingerprint("header.payload.other"));
	}
}
