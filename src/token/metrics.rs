// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token acquisition.
#[derive(Debug, Default)]
pub struct TokenMetrics {
	cache_hits: AtomicU64,
	exchanges: AtomicU64,
	exchange_failures: AtomicU64,
	cache_errors: AtomicU64,
}
impl TokenMetrics {
	/// Returns how many requests were served from a cached access token.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns how many refresh-token exchanges were attempted.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns how many refresh-token exchanges failed.
	pub fn exchange_failures(&self) -> u64 {
		self.exchange_failures.load(Ordering::Relaxed)
	}

	/// Returns how many cache reads or writes failed and were bypassed.
	pub fn cache_errors(&self) -> u64 {
		self.cache_errors.load(Ordering::Relaxed)
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange_failure(&self) {
		self.exchange_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_error(&self) {
		self.cache_errors.fetch_add(1, Ordering::Relaxed);
	}
}
