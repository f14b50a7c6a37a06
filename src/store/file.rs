//! Simple file-backed [`TokenCache`] for single-host deployments that restart often.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{CacheEntry, CacheError, CacheFuture, TokenCache},
};

/// Persists cache entries to a JSON file after each write.
///
/// Disk writes run on the blocking thread pool and are serialized, so the snapshot on disk
/// always reflects the latest completed `set`.
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
	io: Arc<Mutex<()>>,
}
impl FileCache {
	/// Opens (or creates) a cache at the provided path, eagerly loading live entries.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let now = OffsetDateTime::now_utc();
		let mut snapshot = Self::load_snapshot(&path)?;

		snapshot.retain(|_, entry| entry.is_live_at(now));

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)), io: Default::default() })
	}

	/// Location of the backing JSON file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, CacheEntry>, CacheError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let metadata = path.metadata().map_err(|e| CacheError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| CacheError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), CacheError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| CacheError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist(path: &Path, contents: &HashMap<String, CacheEntry>) -> Result<(), CacheError> {
		Self::ensure_parent_exists(path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| CacheError::Serialization {
				message: format!("Failed to serialize cache snapshot: {e}"),
			})?;
		let mut tmp_path = path.to_path_buf();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", path.display()),
		})
	}
}
impl TokenCache for FileCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();

			Ok(self
				.inner
				.read()
				.get(key)
				.filter(|entry| entry.is_live_at(now))
				.map(|entry| entry.value.clone()))
		})
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Option<Duration>,
	) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();

			{
				let mut guard = self.inner.write();

				guard.retain(|_, entry| entry.is_live_at(now));
				guard.insert(key.to_owned(), CacheEntry::new(value, ttl, now));
			}

			let path = self.path.clone();
			let inner = Arc::clone(&self.inner);
			let io = Arc::clone(&self.io);

			tokio::task::spawn_blocking(move || {
				let _io = io.lock();
				let snapshot = inner.read().clone();

				Self::persist(&path, &snapshot)
			})
			.await
			.map_err(|e| CacheError::Backend { message: format!("Cache write task failed: {e}") })?
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;
	use crate::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"lead_relay_file_cache_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[tokio::test]
	async fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let cache = FileCache::open(&path).expect("Failed to open file cache snapshot.");

		cache
			.set(REFRESH_TOKEN_KEY, "refresh-file", None)
			.await
			.expect("Failed to write refresh token to file cache.");
		drop(cache);

		let reopened = FileCache::open(&path).expect("Failed to reopen file cache snapshot.");
		let fetched = reopened
			.get(REFRESH_TOKEN_KEY)
			.await
			.expect("Failed to read refresh token from file cache.");

		assert_eq!(fetched.as_deref(), Some("refresh-file"));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file cache snapshot {}: {e}", path.display())
		});
	}

	#[tokio::test]
	async fn expired_entries_are_dropped_on_open() {
		let path = temp_path("expired");
		let cache = FileCache::open(&path).expect("Failed to open file cache snapshot.");

		cache
			.set(ACCESS_TOKEN_KEY, "access-stale", Some(Duration::seconds(-1)))
			.await
			.expect("Failed to write access token to file cache.");

		assert_eq!(
			cache.get(ACCESS_TOKEN_KEY).await.expect("File cache reads should succeed."),
			None
		);

		drop(cache);

		let reopened = FileCache::open(&path).expect("Failed to reopen file cache snapshot.");

		assert!(reopened.inner.read().is_empty());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file cache snapshot {}: {e}", path.display())
		});
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn concurrent_writes_all_reach_disk() {
		let path = temp_path("concurrent");
		let cache = FileCache::open(&path).expect("Failed to open file cache snapshot.");
		let writes = (0..8).map(|i| {
			let cache = cache.clone();

			tokio::spawn(async move {
				let key = format!("key-{i}");
				let value = format!("value-{i}");

				cache.set(&key, &value, None).await
			})
		});

		for write in writes.collect::<Vec<_>>() {
			write
				.await
				.expect("Write task should not panic.")
				.expect("Concurrent file cache writes should succeed.");
		}

		let reopened = FileCache::open(&path).expect("Failed to reopen file cache snapshot.");

		for i in 0..8 {
			let fetched = reopened
				.get(&format!("key-{i}"))
				.await
				.expect("File cache reads should succeed.");

			assert_eq!(fetched, Some(format!("value-{i}")));
		}

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file cache snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_a_serialization_error() {
		let path = temp_path("corrupt");

		fs::write(&path, b"not json").expect("Failed to write corrupt snapshot fixture.");

		let err = FileCache::open(&path).expect_err("Corrupt snapshots should fail to open.");

		assert!(matches!(err, CacheError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file cache snapshot {}: {e}", path.display())
		});
	}
}
