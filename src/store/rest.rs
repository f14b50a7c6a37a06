//! Remote [`TokenCache`] speaking the Redis-over-HTTP command protocol used by hosted key-value
//! stores (Upstash, Vercel KV).
//!
//! Each operation POSTs a JSON command array such as `["SET","key","value","EX","3600"]` to the
//! configured endpoint with a bearer token and reads `{"result": ...}` or `{"error": ...}` back.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CacheError, CacheFuture, TokenCache},
};

#[derive(Debug, Deserialize)]
struct CommandReply {
	#[serde(default)]
	result: serde_json::Value,
	#[serde(default)]
	error: Option<String>,
}

/// Cache backed by a remote Redis-compatible REST endpoint.
#[derive(Clone, Debug)]
pub struct RestCache {
	client: ReqwestClient,
	endpoint: Url,
	token: TokenSecret,
}
impl RestCache {
	/// Creates a cache that sends commands to `endpoint` authenticated by `token`.
	pub fn new(client: ReqwestClient, endpoint: Url, token: impl Into<String>) -> Self {
		Self { client, endpoint, token: TokenSecret::new(token) }
	}

	async fn command(&self, args: &[&str]) -> Result<serde_json::Value, CacheError> {
		let response = self
			.client
			.post(self.endpoint.clone())
			.bearer_auth(self.token.expose())
			.json(args)
			.send()
			.await
			.map_err(|e| CacheError::Backend {
				message: format!("Failed to reach cache endpoint {}: {e}", self.endpoint),
			})?;
		let status = response.status();
		let body = response.text().await.map_err(|e| CacheError::Backend {
			message: format!("Failed to read cache reply: {e}"),
		})?;

		if !status.is_success() {
			return Err(CacheError::Backend {
				message: format!("Cache endpoint answered {status}: {body}"),
			});
		}

		let reply: CommandReply =
			serde_json::from_str(&body).map_err(|e| CacheError::Serialization {
				message: format!("Failed to parse cache reply: {e}"),
			})?;

		match reply.error {
			Some(error) => Err(CacheError::Backend { message: error }),
			None => Ok(reply.result),
		}
	}
}
impl TokenCache for RestCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async move {
			match self.command(&["GET", key]).await? {
				serde_json::Value::Null => Ok(None),
				serde_json::Value::String(value) => Ok(Some(value)),
				other => Err(CacheError::Serialization {
					message: format!("Expected a string for `{key}`, got {other}"),
				}),
			}
		})
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a str,
		ttl: Option<Duration>,
	) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			match ttl {
				Some(ttl) => {
					let seconds = ttl.whole_seconds().max(1).to_string();

					self.command(&["SET", key, value, "EX", &seconds]).await?;
				},
				None => {
					self.command(&["SET", key, value]).await?;
				},
			}

			Ok(())
		})
	}
}
