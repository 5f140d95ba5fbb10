//! Storage contracts and built-in backends for the shared session medium.
//!
//! The bridge only ever reads and writes short string values under a handful of reserved
//! keys, so the contract is a synchronous key/value map. Every call completes before it
//! returns; backends must never block on I/O they cannot finish immediately.

pub mod cookie;
pub mod file;
pub mod memory;

pub use self::cookie::{CookieAttributes, CookieJar};
pub use ::cookie::SameSite;
pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Storage backend contract implemented by session stores.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`, if present.
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Stores `value` under `key`, replacing any prior value.
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

	/// Removes `key`. Removing an absent key is not an error.
	fn remove(&self, key: &str) -> Result<(), StoreError>;

	/// Removes `key` and returns the value it held.
	///
	/// Backends shared between instances override this so that at most one caller observes a
	/// given value; the default reads, then removes.
	fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
		let value = self.get(key)?;

		self.remove(key)?;

		Ok(value)
	}
}
impl<S> SessionStore for Arc<S>
where
	S: ?Sized + SessionStore,
{
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		(**self).get(key)
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		(**self).set(key, value)
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		(**self).remove(key)
	}

	fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
		(**self).take(key)
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The storage medium is disabled or inaccessible.
	#[error("Storage is unavailable: {message}.")]
	Unavailable {
		/// Human-readable error payload.
		message: String,
	},
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Store that rejects every call, modelling storage disabled by the user agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStore;
impl UnavailableStore {
	fn error() -> StoreError {
		StoreError::Unavailable { message: "storage access is disabled".into() }
	}
}
impl SessionStore for UnavailableStore {
	fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
		Err(Self::error())
	}

	fn set(&self, _: &str, _: &str) -> Result<(), StoreError> {
		Err(Self::error())
	}

	fn remove(&self, _: &str) -> Result<(), StoreError> {
		Err(Self::error())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_bridge_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let bridge_error: Error = store_error.clone().into();

		assert!(matches!(bridge_error, Error::Storage(_)));
		assert!(bridge_error.to_string().contains("disk full"));

		let source = StdError::source(&bridge_error)
			.expect("Bridge error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn unavailable_store_rejects_everything() {
		let store = UnavailableStore;

		assert!(matches!(store.get("k"), Err(StoreError::Unavailable { .. })));
		assert!(matches!(store.set("k", "v"), Err(StoreError::Unavailable { .. })));
		assert!(matches!(store.remove("k"), Err(StoreError::Unavailable { .. })));
	}

	#[test]
	fn shared_handles_delegate() {
		let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());

		store.set("k", "v").expect("Memory store should accept writes.");

		assert_eq!(store.get("k").expect("Memory store should read."), Some("v".into()));
	}
}
