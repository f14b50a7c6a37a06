//! Access token acquisition with cache reuse, refresh-token exchange, and write-back.
//!
//! [`TokenProvider::access_token`] first consults the cache under
//! [`ACCESS_TOKEN_KEY`](crate::store::ACCESS_TOKEN_KEY). On a miss it locates a refresh token
//! (cache first, then static configuration), exchanges it at the OAuth endpoint, and writes the
//! minted token back with a fixed TTL. [`TokenProvider::force_refresh`] skips the cache read and is
//! used after the CRM rejects a token.
//!
//! Cache failures never fail a request: reads degrade to misses and writes are dropped, both with
//! a warning. Concurrent requests that miss together each mint a token; the last write wins.

mod metrics;

pub use metrics::TokenMetrics;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken},
	config::RelayConfig,
	error::{AuthError, ConfigError},
	http::ReqwestHttpClient,
	oauth::RefreshExchange,
	obs::{self, Stage, StageOutcome, StageSpan},
	store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenCache},
};

/// Obtains access tokens for CRM calls.
#[derive(Clone)]
pub struct TokenProvider {
	cache: Arc<dyn TokenCache>,
	exchange: RefreshExchange,
	static_refresh: Option<RefreshToken>,
	caches_tokens: bool,
	access_token_ttl: Duration,
	metrics: Arc<TokenMetrics>,
}
impl TokenProvider {
	/// Creates a caching provider.
	pub fn new(
		cache: Arc<dyn TokenCache>,
		exchange: RefreshExchange,
		static_refresh: Option<RefreshToken>,
		access_token_ttl: Duration,
	) -> Self {
		Self {
			cache,
			exchange,
			static_refresh,
			caches_tokens: true,
			access_token_ttl,
			metrics: Default::default(),
		}
	}

	/// Builds a provider from process configuration.
	pub fn from_config(
		config: &RelayConfig,
		cache: Arc<dyn TokenCache>,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let exchange = RefreshExchange::new(
			&config.token_url,
			&config.client_id,
			&config.client_secret,
			http_client,
		)?;

		Ok(Self::new(cache, exchange, config.static_refresh_token(), config.access_token_ttl())
			.with_caching(config.caches_tokens()))
	}

	/// Enables or disables all cache traffic. Without caching every call mints a token from the
	/// static refresh token.
	pub fn with_caching(mut self, enabled: bool) -> Self {
		self.caches_tokens = enabled;

		self
	}

	/// Counters describing cache reuse and exchanges.
	pub fn metrics(&self) -> &TokenMetrics {
		&self.metrics
	}

	/// Returns a usable access token, preferring the cached one.
	pub async fn access_token(&self) -> Result<AccessToken, AuthError> {
		self.obtain(false, "access_token").await
	}

	/// Mints a new access token without consulting the cached one.
	pub async fn force_refresh(&self) -> Result<AccessToken, AuthError> {
		self.obtain(true, "force_refresh").await
	}

	async fn obtain(&self, force: bool, site: &'static str) -> Result<AccessToken, AuthError> {
		const STAGE: Stage = Stage::Token;

		let span = StageSpan::new(STAGE, site);

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let cached = if force { None } else { self.cached_access_token().await };

				if let Some(token) = cached {
					self.metrics.record_cache_hit();
					tracing::debug!("Using cached access token.");

					return Ok(token);
				}

				let refresh = self.refresh_token().await.ok_or_else(|| {
					tracing::error!("No refresh token is available in cache or configuration.");

					AuthError::MissingRefreshToken
				})?;
				let token = self.mint(&refresh).await?;

				self.store_access_token(&token).await;

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(STAGE, StageOutcome::Failure),
		}

		result
	}

	async fn mint(&self, refresh: &RefreshToken) -> Result<AccessToken, AuthError> {
		const STAGE: Stage = Stage::Exchange;

		let span = StageSpan::new(STAGE, "mint");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);
		self.metrics.record_exchange();

		let result = span.instrument(self.exchange.exchange(refresh)).await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => {
				self.metrics.record_exchange_failure();
				obs::record_stage_outcome(STAGE, StageOutcome::Failure);
			},
		}

		result
	}

	async fn cached_access_token(&self) -> Option<AccessToken> {
		if !self.caches_tokens {
			return None;
		}

		match self.cache.get(ACCESS_TOKEN_KEY).await {
			Ok(Some(value)) if !value.trim().is_empty() => Some(AccessToken::new(value)),
			Ok(_) => None,
			Err(err) => {
				self.metrics.record_cache_error();
				tracing::warn!(error = %err, "Access token cache read failed; treating as a miss.");

				None
			},
		}
	}

	async fn refresh_token(&self) -> Option<RefreshToken> {
		if self.caches_tokens {
			match self.cache.get(REFRESH_TOKEN_KEY).await {
				Ok(Some(value)) =>
					if let Some(token) = RefreshToken::new(value) {
						return Some(token);
					},
				Ok(None) => {},
				Err(err) => {
					self.metrics.record_cache_error();
					tracing::warn!(error = %err, "Refresh token cache read failed.");
				},
			}
		}

		self.static_refresh.clone()
	}

	async fn store_access_token(&self, token: &AccessToken) {
		if !self.caches_tokens {
			return;
		}
		if let Err(err) =
			self.cache.set(ACCESS_TOKEN_KEY, token.expose(), Some(self.access_token_ttl)).await
		{
			self.metrics.record_cache_error();
			tracing::warn!(error = %err, "Failed to cache access token; continuing with it.");
		}
	}
}
impl Debug for TokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("exchange", &self.exchange)
			.field("static_refresh_set", &self.static_refresh.is_some())
			.field("caches_tokens", &self.caches_tokens)
			.field("access_token_ttl", &self.access_token_ttl)
			.finish()
	}
}
