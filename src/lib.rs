//! Relay website booking submissions into Zoho CRM leads, with cached OAuth 2.0 refresh and a
//! single retry on rejected tokens.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lead;
pub mod oauth;
pub mod obs;
pub mod relay;
pub mod retry;
pub mod server;
pub mod store;
pub mod submit;
pub mod token;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{CacheMode, RelayConfig},
		error::ConfigError,
		relay::LeadRelay,
		store::{MemoryCache, TokenCache},
	};

	/// Client identifier used across integration tests.
	pub const TEST_CLIENT_ID: &str = "client-relay";
	/// Client secret used across integration tests.
	pub const TEST_CLIENT_SECRET: &str = "secret-relay";

	/// Builds a relay configuration whose OAuth and CRM endpoints point at `base`.
	pub fn test_config(base: &str, mode: CacheMode) -> Result<RelayConfig> {
		let base = base.trim_end_matches('/');
		let token_url =
			Url::parse(&format!("{base}/oauth/v2/token")).map_err(ConfigError::from)?;
		let leads_url = Url::parse(&format!("{base}/crm/v3/Leads")).map_err(ConfigError::from)?;
		let mut config = RelayConfig::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET)?
			.with_token_url(token_url)
			.with_leads_url(leads_url);

		config.cache_mode = mode;

		Ok(config)
	}

	/// Constructs a [`LeadRelay`] backed by an in-memory cache, returning the cache so tests can
	/// seed and inspect token entries.
	pub fn build_test_relay(config: RelayConfig) -> Result<(LeadRelay, Arc<MemoryCache>)> {
		let backend = Arc::new(MemoryCache::default());
		let cache: Arc<dyn TokenCache> = backend.clone();
		let relay = LeadRelay::with_cache(config, cache)?;

		Ok((relay, backend))
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Binary-only dependency.
use color_eyre as _;
#[cfg(test)] use {axum_test as _, httpmock as _};
