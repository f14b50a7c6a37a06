//! Thread-safe in-memory [`TokenCache`] for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	store::{CacheEntry, CacheFuture, TokenCache},
};

type CacheMap = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Process-local cache that honors TTLs lazily on read.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	/// Reads `key` as seen at `instant`, evicting the entry if it has expired.
	pub fn get_at(&self, key: &str, instant: OffsetDateTime) -> Option<String> {
		Self::get_now(&self.0, key, instant)
	}

	/// Stores `value` under `key` as if written at `instant`.
	pub fn set_at(&self, key: &str, value: &str, ttl: Option<Duration>, instant: OffsetDateTime) {
		Self::set_now(&self.0, key, value, ttl, instant);
	}

	/// Returns the raw entry, expired or not, for inspection.
	pub fn entry(&self, key: &str) -> Option<CacheEntry> {
		self.0.read().get(key).cloned()
	}

	fn get_now(map: &CacheMap, key: &str, instant: OffsetDateTime) -> Option<String> {
		{
			let guard = map.read();

			match guard.get(key) {
				Some(entry) if entry.is_live_at(instant) => return Some(entry.value.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		let mut guard = map.write();

		if guard.get(key).is_some_and(|entry| !entry.is_live_at(instant)) {
			guard.remove(key);
		}

		None
	}

	fn set_now(
		map: &CacheMap,
		key: &str,
		value: &str,
		ttl: Option<Duration>,
		instant: OffsetDateTime,
	) {
		map.write().insert(key.to_owned(), CacheEntry::new(value, ttl, instant));
	}
}
impl TokenCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(&map, key, OffsetDateTime::now_utc())) })
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Option<Duration>,
	) -> CacheFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::set_now(&map, key, value, ttl, OffsetDateTime::now_utc());

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expired_entries_are_evicted_on_read() {
		let cache = MemoryCache::default();
		let written = macros::datetime!(2025-11-10 12:00 UTC);

		cache.set_at("zoho_access_token", "access-1", Some(Duration::hours(1)), written);

		assert_eq!(
			cache.get_at("zoho_access_token", written + Duration::minutes(59)).as_deref(),
			Some("access-1")
		);
		assert_eq!(cache.get_at("zoho_access_token", written + Duration::hours(2)), None);
		assert!(cache.entry("zoho_access_token").is_none());
	}

	#[tokio::test]
	async fn entries_without_ttl_survive() {
		let cache = MemoryCache::default();

		cache
			.set("zoho_refresh_token", "refresh-1", None)
			.await
			.expect("Memory cache writes should succeed.");

		let value = cache
			.get("zoho_refresh_token")
			.await
			.expect("Memory cache reads should succeed.");

		assert_eq!(value.as_deref(), Some("refresh-1"));
		assert_eq!(cache.entry("zoho_refresh_token").and_then(|entry| entry.expires_at), None);
	}
}
