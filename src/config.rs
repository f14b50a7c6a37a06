//! Process configuration resolved from command-line flags and environment variables.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::RefreshToken,
	error::ConfigError,
	obs::LogFormat,
	store::{FileCache, MemoryCache, NoopCache, RestCache, TokenCache},
};

/// Default Zoho accounts token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.zoho.com/oauth/v2/token";
/// Default Zoho CRM Leads resource.
pub const DEFAULT_LEADS_URL: &str = "https://www.zohoapis.com/crm/v3/Leads";

/// Where minted access tokens (and the refresh token) are cached between requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CacheMode {
	/// No cache: every request mints a token from the configured refresh token.
	None,
	/// Process-local memory.
	#[default]
	Memory,
	/// JSON file on local disk.
	File,
	/// Remote Redis-over-HTTP key-value store.
	Rest,
}

/// Configuration for the lead relay.
#[derive(Clone, clap::Parser)]
#[command(name = "lead-relay", version, about)]
pub struct RelayConfig {
	/// Host to bind on.
	#[arg(long, default_value = "127.0.0.1", env = "LEAD_RELAY_HOST")]
	pub host: String,

	/// Port to listen on.
	#[arg(long, default_value_t = 3000, env = "LEAD_RELAY_PORT")]
	pub port: u16,

	/// OAuth client identifier issued by the Zoho API console.
	#[arg(long, env = "ZOHO_CLIENT_ID")]
	pub client_id: String,

	/// OAuth client secret issued by the Zoho API console.
	#[arg(long, env = "ZOHO_CLIENT_SECRET", hide_env_values = true)]
	pub client_secret: String,

	/// Static refresh token, used when the cache does not hold one.
	#[arg(long, env = "ZOHO_REFRESH_TOKEN", hide_env_values = true)]
	pub refresh_token: Option<String>,

	/// OAuth token endpoint.
	#[arg(long, default_value = DEFAULT_TOKEN_URL, env = "ZOHO_TOKEN_URL")]
	pub token_url: Url,

	/// CRM Leads resource.
	#[arg(long, default_value = DEFAULT_LEADS_URL, env = "ZOHO_LEADS_URL")]
	pub leads_url: Url,

	/// Token cache backend.
	#[arg(long, value_enum, default_value_t = CacheMode::Memory, env = "LEAD_RELAY_CACHE")]
	pub cache_mode: CacheMode,

	/// Snapshot path for the `file` cache backend.
	#[arg(long, env = "LEAD_RELAY_CACHE_FILE")]
	pub cache_file: Option<PathBuf>,

	/// Endpoint for the `rest` cache backend.
	#[arg(long, env = "KV_REST_API_URL")]
	pub kv_url: Option<Url>,

	/// Bearer token for the `rest` cache backend.
	#[arg(long, env = "KV_REST_API_TOKEN", hide_env_values = true)]
	pub kv_token: Option<String>,

	/// Lifetime assumed for cached access tokens, in seconds.
	#[arg(long, default_value_t = 3600, env = "LEAD_RELAY_ACCESS_TOKEN_TTL")]
	pub access_token_ttl_secs: u32,

	/// Upper bound for each outbound HTTP call, in milliseconds.
	#[arg(long, default_value_t = 10_000, env = "LEAD_RELAY_TIMEOUT_MS")]
	pub timeout_ms: u64,

	/// Log output format.
	#[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LEAD_RELAY_LOG_FORMAT")]
	pub log_format: LogFormat,
}
impl RelayConfig {
	/// Builds a configuration with default endpoints, an in-memory cache, and no static refresh
	/// token.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			host: "127.0.0.1".into(),
			port: 3000,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			refresh_token: None,
			token_url: Url::parse(DEFAULT_TOKEN_URL)?,
			leads_url: Url::parse(DEFAULT_LEADS_URL)?,
			cache_mode: CacheMode::Memory,
			cache_file: None,
			kv_url: None,
			kv_token: None,
			access_token_ttl_secs: 3600,
			timeout_ms: 10_000,
			log_format: LogFormat::Text,
		})
	}

	/// Overrides the OAuth token endpoint.
	pub fn with_token_url(mut self, url: Url) -> Self {
		self.token_url = url;

		self
	}

	/// Overrides the CRM Leads resource.
	pub fn with_leads_url(mut self, url: Url) -> Self {
		self.leads_url = url;

		self
	}

	/// Sets the static refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Overrides the outbound timeout.
	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;

		self
	}

	/// Socket address string the server binds to.
	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}

	/// TTL applied when caching a freshly minted access token.
	pub fn access_token_ttl(&self) -> Duration {
		Duration::seconds(i64::from(self.access_token_ttl_secs))
	}

	/// Upper bound for each outbound HTTP call.
	pub fn timeout(&self) -> std::time::Duration {
		std::time::Duration::from_millis(self.timeout_ms)
	}

	/// Returns the configured static refresh token, ignoring blank values.
	pub fn static_refresh_token(&self) -> Option<RefreshToken> {
		self.refresh_token.as_deref().and_then(RefreshToken::new)
	}

	/// Whether minted tokens are kept between requests.
	pub fn caches_tokens(&self) -> bool {
		!matches!(self.cache_mode, CacheMode::None)
	}

	/// Error message returned to callers when no access token can be obtained.
	pub fn auth_failure_message(&self) -> &'static str {
		if self.caches_tokens() {
			"Failed to obtain access token"
		} else {
			"Failed to get access token"
		}
	}

	/// Builds the shared outbound HTTP client.
	///
	/// Redirects are disabled: both the token endpoint and the CRM answer directly.
	pub fn build_http_client(&self) -> Result<ReqwestClient, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(self.timeout())
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(client)
	}

	/// Opens the configured cache backend.
	pub fn build_cache(&self, client: &ReqwestClient) -> Result<Arc<dyn TokenCache>, ConfigError> {
		let cache: Arc<dyn TokenCache> = match self.cache_mode {
			CacheMode::None => Arc::new(NoopCache),
			CacheMode::Memory => Arc::new(MemoryCache::default()),
			CacheMode::File => {
				let path = self
					.cache_file
					.clone()
					.ok_or(ConfigError::MissingSetting { name: "cache-file" })?;

				Arc::new(
					FileCache::open(path).map_err(|source| ConfigError::CacheOpen { source })?,
				)
			},
			CacheMode::Rest => {
				let url =
					self.kv_url.clone().ok_or(ConfigError::MissingSetting { name: "kv-url" })?;
				let token =
					self.kv_token.clone().ok_or(ConfigError::MissingSetting { name: "kv-token" })?;

				Arc::new(RestCache::new(client.clone(), url, token))
			},
		};

		Ok(cache)
	}
}
impl Debug for RelayConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RelayConfig")
			.field("bind", &self.bind_addr())
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("token_url", &self.token_url.as_str())
			.field("leads_url", &self.leads_url.as_str())
			.field("cache_mode", &self.cache_mode)
			.field("access_token_ttl_secs", &self.access_token_ttl_secs)
			.field("timeout_ms", &self.timeout_ms)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use clap::Parser;
	// self
	use super::*;

	fn parse(args: &[&str]) -> RelayConfig {
		let mut argv = vec!["lead-relay", "--client-id", "cid", "--client-secret", "csecret"];

		argv.extend_from_slice(args);

		RelayConfig::try_parse_from(argv).expect("Relay config fixture should parse.")
	}

	#[test]
	fn failure_message_depends_on_cache_mode() {
		let cached = parse(&["--cache-mode", "memory"]);
		let uncached = parse(&["--cache-mode", "none"]);

		assert_eq!(cached.auth_failure_message(), "Failed to obtain access token");
		assert_eq!(uncached.auth_failure_message(), "Failed to get access token");
	}

	#[test]
	fn blank_static_refresh_token_is_ignored() {
		let config = RelayConfig::new("cid", "csecret")
			.expect("Default config should build.")
			.with_refresh_token("   ");

		assert!(config.static_refresh_token().is_none());
	}

	#[test]
	fn debug_output_hides_secrets() {
		let config = RelayConfig::new("cid", "csecret-value")
			.expect("Default config should build.")
			.with_refresh_token("1000.refresh-value");
		let rendered = format!("{config:?}");

		assert!(!rendered.contains("csecret-value"));
		assert!(!rendered.contains("refresh-value"));
		assert!(rendered.contains("client_secret_set: true"));
	}

	#[test]
	fn file_mode_requires_a_path() {
		let config = parse(&["--cache-mode", "file"]);
		let client = config.build_http_client().expect("HTTP client should build.");
		let err = config.build_cache(&client).err().expect("File cache without a path should fail.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "cache-file" }));
	}
}
