//! Cookie-header backed [`SessionStore`].
//!
//! A [`CookieJar`] is built from the raw `Cookie` request header. Reads see the parsed cookies
//! plus any writes made through the jar; writes are also recorded as pending changes which
//! [`CookieJar::set_cookie_headers`] renders as `Set-Cookie` values for the response. Values are
//! percent-encoded on the way out and decoded on the way in, so any string round-trips.

// crates.io
use cookie::{Cookie, SameSite};
// self
use crate::{
	_prelude::*,
	store::{SessionStore, StoreError},
};

/// Attributes applied to every rendered `Set-Cookie` value.
///
/// The default is a session cookie scoped to the whole origin (`Path=/`, no `Domain`, no
/// expiry) that client-side code may read, which is what both render paths need.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieAttributes {
	/// `Path` attribute.
	pub path: String,
	/// Optional `Domain` attribute.
	pub domain: Option<String>,
	/// Optional `Max-Age` attribute; `None` yields a session cookie.
	pub max_age: Option<Duration>,
	/// Adds `Secure`.
	pub secure: bool,
	/// Adds `HttpOnly`; client-mode reads need this off.
	pub http_only: bool,
	/// Optional `SameSite` attribute, written as `Strict`, `Lax`, or `None`.
	#[serde(with = "same_site")]
	pub same_site: Option<SameSite>,
}
impl CookieAttributes {
	fn apply(&self, name: &str, value: Option<&str>) -> Cookie<'static> {
		let mut builder = Cookie::build((name.to_owned(), value.unwrap_or_default().to_owned()))
			.path(self.path.clone())
			.secure(self.secure)
			.http_only(self.http_only);

		if let Some(domain) = &self.domain {
			builder = builder.domain(domain.clone());
		}
		if let Some(same_site) = self.same_site {
			builder = builder.same_site(same_site);
		}
		if let Some(max_age) = self.max_age {
			builder = builder.max_age(max_age);
		}

		let mut cookie = builder.build();

		if value.is_none() {
			cookie.make_removal();
		}

		cookie
	}
}
impl Default for CookieAttributes {
	fn default() -> Self {
		Self {
			path: "/".into(),
			domain: None,
			max_age: None,
			secure: false,
			http_only: false,
			same_site: Some(SameSite::Lax),
		}
	}
}

#[derive(Debug, Default)]
struct JarState {
	values: HashMap<String, String>,
	changes: BTreeMap<String, Option<String>>,
}

/// Cookies of one request, plus the changes to send back with its response.
#[derive(Clone, Debug, Default)]
pub struct CookieJar(Arc<RwLock<JarState>>);
impl CookieJar {
	/// Parses a raw `Cookie` header.
	///
	/// Segments that are not `name=value` pairs are skipped, surrounding double quotes are
	/// stripped from values, and the first occurrence of a name wins.
	pub fn parse(header: &str) -> Self {
		let mut values = HashMap::new();

		for cookie in Cookie::split_parse_encoded(header).filter_map(|parsed| parsed.ok()) {
			values
				.entry(cookie.name().to_owned())
				.or_insert_with(|| cookie.value_trimmed().to_owned());
		}

		Self(Arc::new(RwLock::new(JarState { values, changes: BTreeMap::new() })))
	}

	/// Returns the current value of a cookie.
	pub fn value(&self, name: &str) -> Option<String> {
		self.0.read().values.get(name).cloned()
	}

	/// Returns true if writes or removals are pending.
	pub fn has_changes(&self) -> bool {
		!self.0.read().changes.is_empty()
	}

	/// Renders pending changes as `Set-Cookie` header values, sorted by cookie name.
	///
	/// Removals are rendered as empty, already-expired cookies with the same scope.
	pub fn set_cookie_headers(&self, attributes: &CookieAttributes) -> Vec<String> {
		self.0
			.read()
			.changes
			.iter()
			.map(|(name, value)| attributes.apply(name, value.as_deref()).encoded().to_string())
			.collect()
	}
}
impl SessionStore for CookieJar {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.value(key))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let mut state = self.0.write();

		state.values.insert(key.to_owned(), value.to_owned());
		state.changes.insert(key.to_owned(), Some(value.to_owned()));

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.take(key).map(|_| ())
	}

	fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
		let mut state = self.0.write();
		let previous = state.values.remove(key);

		if previous.is_some() || state.changes.contains_key(key) {
			state.changes.insert(key.to_owned(), None);
		}

		Ok(previous)
	}
}

mod same_site {
	// crates.io
	use cookie::SameSite;
	use serde::{Deserializer, Serializer, de::Error as _};
	// self
	use crate::_prelude::*;

	pub(super) fn serialize<S>(value: &Option<SameSite>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.map(|same_site| same_site.to_string()).serialize(serializer)
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<SameSite>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let Some(value) = Option::<String>::deserialize(deserializer)? else {
			return Ok(None);
		};

		match value.to_ascii_lowercase().as_str() {
			"strict" => Ok(Some(SameSite::Strict)),
			"lax" => Ok(Some(SameSite::Lax)),
			"none" => Ok(Some(SameSite::None)),
			_ => Err(D::Error::custom(format!("unknown SameSite value `{value}`"))),
		}
	}
}
