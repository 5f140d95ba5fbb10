//! The session token bridge.
//!
//! A [`SessionBridge`] is the explicit session context for one application instance (client)
//! or one request (server). It owns handles to the cookie-scoped store that carries the token,
//! claim set, and pending nonce; the shared store that carries the logout timestamp; and the
//! logout broadcast channel. Nothing in the crate touches storage outside a bridge.
//!
//! A login attempt moves `Idle → NonceIssued → (redirected) → Verified | Rejected → Idle`;
//! a verified attempt leaves a standing `Authenticated` session until [`end_session`].
//!
//! [`end_session`]: SessionBridge::end_session

mod login;
mod session;

pub use login::*;

// self
use crate::{
	_prelude::*,
	auth::Nonce,
	config::BridgeConfig,
	error::ConfigError,
	render::RequestContext,
	signal::{LogoutBroadcast, LogoutSignal, LogoutSubscription},
	store::SessionStore,
	widget::WidgetOptions,
};

/// Where a bridge currently stands in the login lifecycle, as visible from storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginState {
	/// No pending nonce and no session.
	Idle,
	/// A nonce was issued and the redirect has not been handled yet.
	NonceIssued,
	/// A verified session record is present.
	Authenticated,
}

/// Session context bridging widget redirects and both render paths.
#[derive(Clone)]
pub struct SessionBridge {
	/// Configuration applied to every operation.
	pub config: BridgeConfig,
	cookies: Arc<dyn SessionStore>,
	shared: Arc<dyn SessionStore>,
	broadcast: LogoutBroadcast,
}
impl SessionBridge {
	/// Creates a bridge over the given cookie-scoped store, shared store, and broadcast channel.
	pub fn new(
		config: BridgeConfig,
		cookies: Arc<dyn SessionStore>,
		shared: Arc<dyn SessionStore>,
		broadcast: LogoutBroadcast,
	) -> Self {
		Self { config, cookies, shared, broadcast }
	}

	/// Creates a per-request bridge whose cookie store is the request's cookie jar.
	///
	/// Writes made through the bridge show up in
	/// [`CookieJar::set_cookie_headers`](crate::store::CookieJar::set_cookie_headers).
	pub fn for_request(
		config: BridgeConfig,
		request: &RequestContext,
		shared: Arc<dyn SessionStore>,
		broadcast: LogoutBroadcast,
	) -> Self {
		Self::new(config, Arc::new(request.cookies().clone()), shared, broadcast)
	}

	/// Widget constructor object bound to `nonce`.
	pub fn widget_options(&self, nonce: &Nonce) -> WidgetOptions {
		self.config.widget.options(nonce)
	}

	/// Hosted-login URL bound to `nonce`.
	pub fn authorize_url(&self, nonce: &Nonce) -> Result<Url, ConfigError> {
		self.config.widget.authorize_url(nonce)
	}

	/// Starts listening for logouts published by any instance sharing the broadcast channel.
	pub fn subscribe_logout(&self) -> LogoutSubscription {
		self.broadcast.subscribe()
	}

	/// Most recent logout recorded in shared storage, if readable.
	pub fn last_logout(&self) -> Option<LogoutSignal> {
		match self.shared.get(&self.config.keys.logout) {
			Ok(value) => value.as_deref().and_then(LogoutSignal::from_storage_value),
			Err(e) => {
				tracing::debug!(error = %e, "Shared storage is unreadable; assuming no logout.");

				None
			},
		}
	}

	/// Poll-on-focus check: true when a logout was recorded at or after `since`.
	pub fn logout_observed_since(&self, since: OffsetDateTime) -> bool {
		self.last_logout().is_some_and(|signal| signal.at >= since)
	}

	/// Lifecycle state as visible from the cookie-scoped store.
	pub fn login_state(&self) -> LoginState {
		if self.current_session(None).is_some() {
			return LoginState::Authenticated;
		}

		match self.cookies.get(&self.config.keys.nonce) {
			Ok(Some(nonce)) if !nonce.is_empty() => LoginState::NonceIssued,
			_ => LoginState::Idle,
		}
	}
}
impl Debug for SessionBridge {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionBridge")
			.field("config", &self.config)
			.field("logout_subscribers", &self.broadcast.subscriber_count())
			.finish()
	}
}
