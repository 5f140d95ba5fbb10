//! Bridge an identity provider's embeddable login widget into server-rendered apps: nonce-bound
//! redirect capture, unverified claim decoding, and cookie-backed sessions readable from both the
//! server render path and the client render path.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod bridge;
pub mod config;
pub mod error;
pub mod obs;
pub mod redirect;
pub mod render;
pub mod signal;
pub mod store;
pub mod widget;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and fixtures shared by unit and integration tests.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use crate::{
		auth::{ClientId, ProviderDomain},
		bridge::SessionBridge,
		config::BridgeConfig,
		signal::LogoutBroadcast,
		store::{MemoryStore, SessionStore},
		widget::WidgetConfig,
	};

	/// Redirect target registered for the fixture widget.
	pub const TEST_REDIRECT: &str = "http://localhost:3000/signed-in";

	/// Encodes a compact, unsigned token whose payload segment carries `claims`.
	pub fn encode_test_token(claims: &serde_json::Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

		format!("{header}.{payload}.c2lnbmF0dXJl")
	}

	/// Widget configuration used across tests.
	pub fn test_widget_config() -> WidgetConfig {
		WidgetConfig::builder(
			ClientId::new("test-client").expect("Client fixture should be valid."),
			ProviderDomain::new("tenant.example.com").expect("Domain fixture should be valid."),
		)
		.audience("https://api.example.com")
		.redirect_uri(Url::parse(TEST_REDIRECT).expect("Redirect fixture should parse."))
		.build()
		.expect("Widget fixture should build.")
	}

	/// Bridge configuration with default storage keys and policy flags.
	pub fn test_bridge_config() -> BridgeConfig {
		BridgeConfig::new(test_widget_config())
	}

	/// Builds a bridge over fresh in-memory cookie and shared stores.
	pub fn build_test_bridge() -> (SessionBridge, MemoryStore, MemoryStore) {
		let cookies = MemoryStore::default();
		let shared = MemoryStore::default();
		let bridge = build_test_bridge_with(Arc::new(cookies.clone()), Arc::new(shared.clone()));

		(bridge, cookies, shared)
	}

	/// Builds a bridge over caller-provided stores and a fresh broadcast channel.
	pub fn build_test_bridge_with(
		cookies: Arc<dyn SessionStore>,
		shared: Arc<dyn SessionStore>,
	) -> SessionBridge {
		SessionBridge::new(test_bridge_config(), cookies, shared, LogoutBroadcast::default())
	}

	/// Redirect URL carrying the token and state in its fragment.
	pub fn redirect_with(token: &str, state: &str) -> Url {
		Url::parse(&format!("{TEST_REDIRECT}#id_token={token}&state={state}"))
			.expect("Redirect URL fixture should parse.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use color_eyre as _;
