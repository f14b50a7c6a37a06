//! Token cache contract and built-in cache backends.
//!
//! The relay keeps two entries: the current access token under [`ACCESS_TOKEN_KEY`] (short TTL)
//! and the long-lived refresh token under [`REFRESH_TOKEN_KEY`] (no TTL, provisioned
//! out-of-band). Backends report failures as [`CacheError`]; the token provider decides whether
//! a failure is fatal, so implementations never swallow errors themselves.

pub mod file;
pub mod memory;
pub mod noop;
pub mod rest;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use noop::NoopCache;
pub use rest::RestCache;

// self
use crate::_prelude::*;

/// Cache key holding the current access token.
pub const ACCESS_TOKEN_KEY: &str = "zoho_access_token";
/// Cache key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "zoho_refresh_token";

/// Boxed future returned by [`TokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Key/value capability backing the token provider.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Fetches the live value stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>>;

	/// Stores `value` under `key`, expiring after `ttl` when provided.
	fn set<'a>(&'a self, key: &'a str, value: &'a str, ttl: Option<Duration>)
	-> CacheFuture<'a, ()>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure (unreachable, misconfigured, rejected command).
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Stored value plus its optional absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
	/// Cached value.
	pub value: String,
	/// Instant after which the entry is ignored; `None` never expires.
	#[serde(with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}
impl CacheEntry {
	/// Builds an entry that expires `ttl` after `now`.
	pub fn new(value: impl Into<String>, ttl: Option<Duration>, now: OffsetDateTime) -> Self {
		Self { value: value.into(), expires_at: ttl.map(|ttl| now + ttl) }
	}

	/// Returns `true` if the entry is still readable at `instant`.
	pub fn is_live_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|expires_at| instant < expires_at)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn entry_without_ttl_never_expires() {
		let now = macros::datetime!(2025-11-10 12:00 UTC);
		let entry = CacheEntry::new("refresh", None, now);

		assert!(entry.is_live_at(now + Duration::days(3650)));
	}

	#[test]
	fn entry_expires_at_ttl_boundary() {
		let now = macros::datetime!(2025-11-10 12:00 UTC);
		let entry = CacheEntry::new("access", Some(Duration::seconds(3600)), now);

		assert!(entry.is_live_at(now + Duration::seconds(3599)));
		assert!(!entry.is_live_at(now + Duration::seconds(3600)));
	}

	#[test]
	fn entry_serializes_expiry_as_rfc3339() {
		let now = macros::datetime!(2025-11-10 12:00 UTC);
		let entry = CacheEntry::new("access", Some(Duration::hours(1)), now);
		let payload = serde_json::to_string(&entry).expect("Cache entry should serialize to JSON.");

		assert!(payload.contains("2025-11-10T13:00:00Z"));
	}
}
