//! Bridge-level error types shared across login handling, storage, and configuration.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical bridge error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Redirect did not carry an identity token.
	#[error("Redirect is missing the id_token parameter.")]
	MissingToken,
	/// Redirect state did not match a pending login attempt.
	#[error("Redirect state was rejected: {reason}.")]
	ReplayOrForgery {
		/// Why the state was rejected.
		reason: ReplayReason,
	},
	/// Token payload segment could not be decoded into claims.
	#[error("Identity token is malformed.")]
	MalformedToken(#[from] crate::auth::TokenDecodeError),
	/// Provider reported an authorization failure on the redirect.
	#[error("Provider denied the authorization: {error}.")]
	AuthorizationDenied {
		/// Provider error code, e.g. `access_denied`.
		error: String,
		/// Optional human-readable description supplied by the provider.
		description: Option<String>,
	},
}

/// Reasons a redirect `state` is treated as a replay or forgery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayReason {
	/// The redirect omitted the `state` parameter.
	MissingState,
	/// No nonce was pending, either never issued or already consumed.
	NoPendingNonce,
	/// The `state` parameter differs from the pending nonce.
	Mismatch,
}
impl ReplayReason {
	/// Returns a stable label suitable for logs and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			ReplayReason::MissingState => "missing_state",
			ReplayReason::NoPendingNonce => "no_pending_nonce",
			ReplayReason::Mismatch => "state_mismatch",
		}
	}
}
impl Display for ReplayReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures raised by the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration document could not be parsed.
	#[error("Bridge configuration is invalid at `{path}`.")]
	Parse {
		/// JSON path of the offending value.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Widget configuration failed validation.
	#[error(transparent)]
	Widget(#[from] crate::widget::WidgetConfigError),
	/// Storage keys collide with one another.
	#[error("Storage key `{key}` is used more than once.")]
	DuplicateStorageKey {
		/// The colliding key.
		key: String,
	},
	/// A storage key is empty or contains characters unusable in a cookie name.
	#[error("Storage key `{key}` is not a valid cookie name.")]
	InvalidStorageKey {
		/// The offending key.
		key: String,
	},
	/// Authorize URL could not be assembled.
	#[error("Authorize URL is invalid.")]
	InvalidAuthorizeUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path, source: e.into_inner() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn replay_error_names_its_reason() {
		let err = Error::ReplayOrForgery { reason: ReplayReason::Mismatch };

		assert_eq!(err.to_string(), "Redirect state was rejected: state_mismatch.");
	}

	#[test]
	fn parse_error_keeps_json_path() {
		#[derive(Debug, Deserialize)]
		struct Probe {
			#[allow(dead_code)]
			inner: Inner,
		}
		#[derive(Debug, Deserialize)]
		struct Inner {
			#[allow(dead_code)]
			flag: bool,
		}

		let de = &mut serde_json::Deserializer::from_str(r#"{"inner":{"flag":"yes"}}"#);
		let err = serde_path_to_error::deserialize::<_, Probe>(de)
			.expect_err("String should not deserialize into a bool.");
		let config_error = ConfigError::from(err);

		assert!(matches!(&config_error, ConfigError::Parse { path, .. } if path == "inner.flag"));
		assert!(StdError::source(&config_error).is_some());
	}
}
