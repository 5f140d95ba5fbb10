//! One-time login nonces bound to the widget's `state` parameter.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::fingerprint};

/// Number of alphanumeric characters in a generated nonce (~190 bits of entropy).
pub const NONCE_LEN: usize = 32;

/// Opaque random value binding a login attempt to its redirect.
///
/// Comparison against the returned `state` is exact and byte-wise. `Debug` output only shows
/// a fingerprint so nonces do not leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(String);
impl Nonce {
	/// Generates a fresh nonce from the thread-local CSPRNG.
	pub fn generate() -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect())
	}

	/// Wraps an existing value, e.g. one read back from storage.
	pub fn from_stored(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw nonce for embedding into the widget configuration.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns true when the redirect's `state` equals this nonce exactly.
	pub fn matches(&self, state: &str) -> bool {
		self.0 == state
	}

	/// Short digest safe to log.
	pub fn fingerprint(&self) -> String {
		fingerprint(&self.0)
	}
}
impl AsRef<str> for Nonce {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
impl Debug for Nonce {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Nonce").field(&self.fingerprint()).finish()
	}
}
