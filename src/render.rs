//! Render-time data boundary.
//!
//! Views never call into the bridge while rendering. A request handler (server) or the
//! application shell (client) resolves an [`AuthState`] up front and passes it to the view as
//! a plain property.

// self
use crate::{_prelude::*, auth::ClaimSet, store::CookieJar};

/// Inbound request data the server render path needs.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
	cookies: CookieJar,
}
impl RequestContext {
	/// Context for a request carrying the given raw `Cookie` header.
	pub fn from_cookie_header(header: &str) -> Self {
		Self { cookies: CookieJar::parse(header) }
	}

	/// Context for a request split across several `Cookie` headers.
	pub fn from_cookie_headers<'a, I>(headers: I) -> Self
	where
		I: IntoIterator<Item = &'a str>,
	{
		Self::from_cookie_header(&headers.into_iter().collect::<Vec<_>>().join("; "))
	}

	/// Context for a request without cookies.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Cookies of this request, including writes made while handling it.
	pub fn cookies(&self) -> &CookieJar {
		&self.cookies
	}

	/// Value of a single cookie.
	pub fn cookie(&self, name: &str) -> Option<String> {
		self.cookies.value(name)
	}
}

/// Precomputed authentication state handed to views.
///
/// `authenticated` is true exactly when `claims` is present.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AuthState {
	authenticated: bool,
	claims: Option<ClaimSet>,
}
impl AuthState {
	/// State for a resolved session lookup.
	pub fn from_claims(claims: Option<ClaimSet>) -> Self {
		Self { authenticated: claims.is_some(), claims }
	}

	/// Signed-out state.
	pub fn signed_out() -> Self {
		Self::default()
	}

	/// Whether the view should render its authenticated variant.
	pub fn is_authenticated(&self) -> bool {
		self.authenticated
	}

	/// Claims of the signed-in user.
	pub fn claims(&self) -> Option<&ClaimSet> {
		self.claims.as_ref()
	}

	/// Email of the signed-in user, if the token carried one.
	pub fn email(&self) -> Option<&str> {
		self.claims.as_ref().and_then(ClaimSet::email)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn auth_state_tracks_claim_presence() {
		let claims = ClaimSet::from(
			json!({ "email": "user@example.com" })
				.as_object()
				.cloned()
				.expect("Fixture should be an object."),
		);
		let state = AuthState::from_claims(Some(claims));

		assert!(state.is_authenticated());
		assert_eq!(state.email(), Some("user@example.com"));
		assert_eq!(
			serde_json::to_value(&state).expect("State should serialize."),
			json!({ "authenticated": true, "claims": { "email": "user@example.com" } })
		);

		let signed_out = AuthState::signed_out();

		assert!(!signed_out.is_authenticated());
		assert_eq!(signed_out, AuthState::from_claims(None));
	}

	#[test]
	fn request_context_joins_split_headers() {
		let context = RequestContext::from_cookie_headers(["id_token=a.b.c", "user=e30"]);

		assert_eq!(context.cookie("id_token").as_deref(), Some("a.b.c"));
		assert_eq!(context.cookie("user").as_deref(), Some("e30"));
		assert_eq!(RequestContext::empty().cookie("id_token"), None);
	}
}
