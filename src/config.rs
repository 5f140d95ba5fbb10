//! Bridge configuration: storage keys, cookie attributes, widget settings, and policy flags.
//!
//! Every field except `widget` has a default, so the smallest useful JSON document only
//! describes the widget:
//!
//! ```json
//! {
//!   "widget": {
//!     "client_id": "abc123",
//!     "domain": "tenant.eu.auth0.com",
//!     "redirect_uri": "http://localhost:3000/signed-in"
//!   }
//! }
//! ```

// self
use crate::{_prelude::*, error::ConfigError, store::CookieAttributes, widget::WidgetConfig};

/// Reserved storage keys used by the bridge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
	/// Raw identity token (cookie storage).
	pub token: String,
	/// Encoded claim set (cookie storage).
	pub claims: String,
	/// Pending login nonce (cookie storage, transient).
	pub nonce: String,
	/// Logout broadcast timestamp (shared storage).
	pub logout: String,
}
impl StorageKeys {
	/// Checks that every key is a valid cookie name and that no two keys collide.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let keys = [&self.token, &self.claims, &self.nonce, &self.logout];

		for (i, key) in keys.iter().enumerate() {
			if key.is_empty() || !key.chars().all(is_cookie_name_char) {
				return Err(ConfigError::InvalidStorageKey { key: key.to_string() });
			}
			if keys[..i].contains(key) {
				return Err(ConfigError::DuplicateStorageKey { key: key.to_string() });
			}
		}

		Ok(())
	}
}
impl Default for StorageKeys {
	fn default() -> Self {
		Self {
			token: "id_token".into(),
			claims: "user".into(),
			nonce: "login_nonce".into(),
			logout: "logout".into(),
		}
	}
}

/// Complete bridge configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
	/// Login widget settings.
	pub widget: WidgetConfig,
	/// Reserved storage keys.
	#[serde(default)]
	pub keys: StorageKeys,
	/// Attributes for `Set-Cookie` values rendered on the server path.
	#[serde(default)]
	pub cookie: CookieAttributes,
	/// Let logins complete, unverified and unpersisted, when storage is unavailable.
	#[serde(default = "default_degraded_login")]
	pub degraded_login: bool,
	/// Treat claim sets whose `exp` has passed as signed out.
	#[serde(default)]
	pub enforce_expiry: bool,
}
impl BridgeConfig {
	/// Configuration with default keys, cookie attributes, and policy flags.
	pub fn new(widget: WidgetConfig) -> Self {
		Self {
			widget,
			keys: StorageKeys::default(),
			cookie: CookieAttributes::default(),
			degraded_login: default_degraded_login(),
			enforce_expiry: false,
		}
	}

	/// Parses and validates a JSON configuration document.
	///
	/// Parse failures report the JSON path of the offending value.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(json);
		let config: Self = serde_path_to_error::deserialize(de)?;

		config.keys.validate()?;

		Ok(config)
	}

	/// Overrides the storage keys.
	pub fn with_keys(mut self, keys: StorageKeys) -> Self {
		self.keys = keys;

		self
	}

	/// Overrides the cookie attributes.
	pub fn with_cookie(mut self, cookie: CookieAttributes) -> Self {
		self.cookie = cookie;

		self
	}

	/// Enables or disables degraded logins.
	pub fn with_degraded_login(mut self, enabled: bool) -> Self {
		self.degraded_login = enabled;

		self
	}

	/// Enables or disables expiry enforcement.
	pub fn with_enforce_expiry(mut self, enabled: bool) -> Self {
		self.enforce_expiry = enabled;

		self
	}
}

fn default_degraded_login() -> bool {
	true
}

fn is_cookie_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric()
		|| matches!(
			c,
			'!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
		)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::TEST_REDIRECT;

	fn minimal(extra: &str) -> String {
		format!(
			r#"{{"widget":{{"client_id":"abc123","domain":"tenant.example.com","redirect_uri":"{TEST_REDIRECT}"}}{extra}}}"#
		)
	}

	#[test]
	fn minimal_document_uses_defaults() {
		let config = BridgeConfig::from_json(&minimal("")).expect("Minimal config should load.");

		assert_eq!(config.keys, StorageKeys::default());
		assert_eq!(config.cookie, CookieAttributes::default());
		assert!(config.degraded_login);
		assert!(!config.enforce_expiry);
		assert_eq!(config.widget.client_id.as_ref(), "abc123");
	}

	#[test]
	fn overrides_are_applied() {
		let config = BridgeConfig::from_json(&minimal(
			r#","keys":{"claims":"profile"},"degraded_login":false,"cookie":{"secure":true}"#,
		))
		.expect("Config with overrides should load.");

		assert_eq!(config.keys.claims, "profile");
		assert_eq!(config.keys.token, "id_token");
		assert!(!config.degraded_login);
		assert!(config.cookie.secure);
		assert_eq!(config.cookie.path, "/");
	}

	#[test]
	fn parse_errors_report_the_path() {
		let err = BridgeConfig::from_json(&minimal(r#","enforce_expiry":"yes""#))
			.expect_err("A string is not a bool.");

		assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "enforce_expiry"));

		let err = BridgeConfig::from_json(r#"{"widget":{"client_id":"a b","domain":"d"}}"#)
			.expect_err("Invalid widget identifiers should be rejected.");

		assert!(matches!(err, ConfigError::Parse { .. }));
	}

	#[test]
	fn storage_keys_must_be_distinct_cookie_names() {
		let err = BridgeConfig::from_json(&minimal(r#","keys":{"token":"user"}"#))
			.expect_err("Colliding keys should be rejected.");

		assert!(matches!(err, ConfigError::DuplicateStorageKey { ref key } if key == "user"));

		let keys = StorageKeys { nonce: "login nonce".into(), ..Default::default() };

		assert!(matches!(keys.validate(), Err(ConfigError::InvalidStorageKey { .. })));
	}
}
