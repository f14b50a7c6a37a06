//! [`TokenCache`] that stores nothing, used when every request mints a fresh token.

// self
use crate::store::{CacheFuture, TokenCache};

/// Cache that always misses and silently accepts writes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCache;
impl TokenCache for NoopCache {
	fn get<'a>(&'a self, _key: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async { Ok(None) })
	}

	fn set<'a>(
		&'a self,
		_key: &'a str,
		_value: &'a str,
		_ttl: Option<time::Duration>,
	) -> CacheFuture<'a, ()> {
		Box::pin(async { Ok(()) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn writes_are_never_readable() {
		let cache = NoopCache;

		cache.set("zoho_access_token", "access", None).await.expect("No-op writes succeed.");

		assert_eq!(cache.get("zoho_access_token").await.expect("No-op reads succeed."), None);
	}
}
