//! Redirect callback parsing.
//!
//! The provider appends token material as `key=value` pairs to the fixed callback URL,
//! normally in the fragment. Both the query and the fragment are read, in that order, and
//! every pair is applied last-write-wins: a fragment value overrides a query value with the
//! same key and later duplicates override earlier ones. A bare `key` segment yields an empty
//! value.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Parameter carrying the identity token.
pub const ID_TOKEN_PARAM: &str = "id_token";
/// Parameter carrying the access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";
/// Parameter echoing the opaque state value.
pub const STATE_PARAM: &str = "state";
/// Parameter carrying a provider error code.
pub const ERROR_PARAM: &str = "error";
/// Parameter carrying a provider error description.
pub const ERROR_DESCRIPTION_PARAM: &str = "error_description";

/// Key/value parameters extracted from a redirect callback URL.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RedirectParams(HashMap<String, String>);
impl RedirectParams {
	/// Extracts parameters from the query and fragment of `url`.
	pub fn from_url(url: &Url) -> Self {
		let mut params = Self::default();

		if let Some(query) = url.query() {
			params.extend_from(query);
		}
		if let Some(fragment) = url.fragment() {
			params.extend_from(fragment);
		}

		params
	}

	/// Parses a bare `key=value&...` component.
	pub fn from_component(component: &str) -> Self {
		let mut params = Self::default();

		params.extend_from(component);

		params
	}

	/// Returns a parameter by name.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Echoed state value, if present and non-empty.
	pub fn state(&self) -> Option<&str> {
		self.get(STATE_PARAM).filter(|state| !state.is_empty())
	}

	/// Identity token, if present and non-empty.
	pub fn id_token(&self) -> Option<&str> {
		self.get(ID_TOKEN_PARAM).filter(|token| !token.is_empty())
	}

	/// Access token, if present and non-empty.
	pub fn access_token(&self) -> Option<&str> {
		self.get(ACCESS_TOKEN_PARAM).filter(|token| !token.is_empty())
	}

	/// Provider error code, if the redirect reports a failure.
	pub fn error(&self) -> Option<&str> {
		self.get(ERROR_PARAM)
	}

	/// Provider error description, if any.
	pub fn error_description(&self) -> Option<&str> {
		self.get(ERROR_DESCRIPTION_PARAM)
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no parameters were found.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn extend_from(&mut self, component: &str) {
		for (key, value) in form_urlencoded::parse(component.as_bytes()) {
			self.0.insert(key.into_owned(), value.into_owned());
		}
	}
}
impl Debug for RedirectParams {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut keys = self.0.keys().collect::<Vec<_>>();

		keys.sort();

		f.debug_struct("RedirectParams").field("keys", &keys).finish()
	}
}
