//! Thread-safe in-memory [`SessionStore`] implementation.

// self
use crate::{
	_prelude::*,
	store::{SessionStore, StoreError},
};

type StoreMap = Arc<RwLock<HashMap<String, String>>>;

/// In-process storage backend; clones share the same map.
///
/// Cloned handles model several application instances that share one storage origin, which
/// is what the logout broadcast relies on.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns true if nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Snapshot of the stored keys, sorted.
	pub fn keys(&self) -> Vec<String> {
		let mut keys = self.0.read().keys().cloned().collect::<Vec<_>>();

		keys.sort();

		keys
	}
}
impl SessionStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), value.to_owned());

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.0.write().remove(key);

		Ok(())
	}

	fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.write().remove(key))
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// self
	use super::*;

	#[test]
	fn clones_share_contents() {
		let store = MemoryStore::default();
		let other = store.clone();

		store.set("id_token", "a.b.c").expect("Write should succeed.");

		assert_eq!(other.get("id_token").expect("Read should succeed."), Some("a.b.c".into()));

		other.remove("id_token").expect("Remove should succeed.");
		other.remove("id_token").expect("Removing twice should succeed.");

		assert!(store.is_empty());
	}

	#[test]
	fn take_hands_a_value_to_exactly_one_caller() {
		let store = MemoryStore::default();

		store.set("login_nonce", "n").expect("Write should succeed.");

		let taken = thread::scope(|scope| {
			let handles = (0..8)
				.map(|_| {
					let store = store.clone();

					scope.spawn(move || store.take("login_nonce").expect("Take should succeed."))
				})
				.collect::<Vec<_>>();

			handles
				.into_iter()
				.filter_map(|handle| handle.join().expect("Taking thread should not panic."))
				.collect::<Vec<_>>()
		});

		assert_eq!(taken, vec!["n".to_string()]);
		assert!(store.is_empty());
	}

	#[test]
	fn set_overwrites_and_keys_sort() {
		let store = MemoryStore::default();

		store.set("user", "1").expect("Write should succeed.");
		store.set("login_nonce", "n").expect("Write should succeed.");
		store.set("user", "2").expect("Overwrite should succeed.");

		assert_eq!(store.get("user").expect("Read should succeed."), Some("2".into()));
		assert_eq!(store.keys(), vec!["login_nonce".to_string(), "user".to_string()]);
	}
}
