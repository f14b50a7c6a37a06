//! Per-request orchestration: parse the booking, obtain a token, submit the lead, and shape the
//! HTTP reply.
//!
//! ```text
//! parse body ──fail──▶ 400
//!     │
//! access token ──fail──▶ 500
//!     │
//! submit ──401──▶ force refresh ──▶ submit once more
//!     │                                  │
//!     ├──other failure──▶ upstream status◀┘
//!     └──success──▶ 200
//! ```

// self
use crate::{
	_prelude::*,
	config::RelayConfig,
	error::ConfigError,
	http::ReqwestHttpClient,
	lead::{BookingSubmission, LeadPayload},
	obs::{self, Stage, StageOutcome, StageSpan},
	retry::RetryPolicy,
	store::TokenCache,
	submit::{LeadSubmitter, SubmitError},
	token::TokenProvider,
};

/// Status and JSON body returned to the website.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// JSON response body.
	pub body: serde_json::Value,
}
impl RelayResponse {
	/// `200 {"success":true,"data":...}`.
	pub fn success(data: serde_json::Value) -> Self {
		Self { status: StatusCode::OK, body: serde_json::json!({ "success": true, "data": data }) }
	}

	/// `{"success":false,"zohoError":"<raw upstream text>"}` with the upstream status.
	pub fn rejected(status: StatusCode, raw: String) -> Self {
		Self { status, body: serde_json::json!({ "success": false, "zohoError": raw }) }
	}

	/// `{"error":"<message>"}` with the given status.
	pub fn error(status: StatusCode, message: &str) -> Self {
		Self { status, body: serde_json::json!({ "error": message }) }
	}
}

/// Relays booking submissions into CRM leads.
#[derive(Clone, Debug)]
pub struct LeadRelay {
	tokens: TokenProvider,
	submitter: LeadSubmitter,
	policy: RetryPolicy<SubmitError>,
	auth_failure_message: &'static str,
}
impl LeadRelay {
	/// Message returned for malformed request bodies.
	pub const INVALID_BODY: &'static str = "Invalid JSON body";
	/// Message returned when an outbound call exceeds its timeout.
	pub const UPSTREAM_TIMEOUT: &'static str = "Upstream request timed out";
	/// Message returned when the CRM cannot be reached.
	pub const UPSTREAM_FAILURE: &'static str = "Upstream request failed";
	/// Message returned when the CRM reports success with a non-JSON body.
	pub const INVALID_UPSTREAM_BODY: &'static str = "Invalid CRM response";

	/// Assembles a relay from its parts.
	pub fn new(
		tokens: TokenProvider,
		submitter: LeadSubmitter,
		auth_failure_message: &'static str,
	) -> Self {
		Self { tokens, submitter, policy: RetryPolicy::on_unauthorized(), auth_failure_message }
	}

	/// Builds a relay with the HTTP client and cache backend described by `config`.
	pub fn from_config(config: RelayConfig) -> Result<Self, ConfigError> {
		let client = config.build_http_client()?;
		let cache = config.build_cache(&client)?;

		Self::assemble(&config, client, cache)
	}

	/// Builds a relay from `config` but with a caller-provided cache backend.
	pub fn with_cache(config: RelayConfig, cache: Arc<dyn TokenCache>) -> Result<Self, ConfigError> {
		let client = config.build_http_client()?;

		Self::assemble(&config, client, cache)
	}

	/// Replaces the retry policy applied to create-lead attempts.
	pub fn with_retry_policy(mut self, policy: RetryPolicy<SubmitError>) -> Self {
		self.policy = policy;

		self
	}

	/// Token provider used by this relay.
	pub fn tokens(&self) -> &TokenProvider {
		&self.tokens
	}

	/// Handles one raw request body and always produces a response.
	pub async fn handle(&self, body: &[u8]) -> RelayResponse {
		const STAGE: Stage = Stage::Relay;

		let span = StageSpan::new(STAGE, "handle");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		match span.instrument(self.forward(body)).await {
			Ok(data) => {
				obs::record_stage_outcome(STAGE, StageOutcome::Success);

				RelayResponse::success(data)
			},
			Err(err) => {
				obs::record_stage_outcome(STAGE, StageOutcome::Failure);

				self.error_response(err)
			},
		}
	}

	/// Parses `body`, submits the lead, and returns the CRM's parsed response.
	pub async fn forward(&self, body: &[u8]) -> Result<serde_json::Value> {
		let booking = BookingSubmission::from_slice(body)?;
		let payload = LeadPayload::from(&booking);
		let mut token = self.tokens.access_token().await?;
		let mut attempt = 1;

		loop {
			match self.submitter.submit(&payload, &token).await {
				Ok(data) => return Ok(data),
				Err(err) if self.policy.should_retry(attempt, &err) => {
					tracing::warn!(attempt, error = %err, "Retrying with a freshly minted token.");

					token = self.tokens.force_refresh().await?;
					attempt += 1;
				},
				Err(err) => return Err(err.into()),
			}
		}
	}

	fn error_response(&self, err: Error) -> RelayResponse {
		match err {
			Error::Input(err) => {
				tracing::warn!(error = %err, "Rejected malformed booking body.");

				RelayResponse::error(StatusCode::BAD_REQUEST, Self::INVALID_BODY)
			},
			Error::Auth(err) if err.is_timeout() =>
				RelayResponse::error(StatusCode::GATEWAY_TIMEOUT, Self::UPSTREAM_TIMEOUT),
			Error::Auth(_) =>
				RelayResponse::error(StatusCode::INTERNAL_SERVER_ERROR, self.auth_failure_message),
			Error::Submit(SubmitError::Rejected { status, body }) =>
				RelayResponse::rejected(status, body),
			Error::Submit(SubmitError::Timeout) =>
				RelayResponse::error(StatusCode::GATEWAY_TIMEOUT, Self::UPSTREAM_TIMEOUT),
			Error::Submit(err @ SubmitError::Transport { .. }) => {
				tracing::error!(error = %err, "CRM call failed.");

				RelayResponse::error(StatusCode::BAD_GATEWAY, Self::UPSTREAM_FAILURE)
			},
			Error::Submit(SubmitError::Decode { status, body, .. }) => {
				tracing::error!(status = status.as_u16(), body = %body, "CRM body is not JSON.");

				RelayResponse::error(StatusCode::BAD_GATEWAY, Self::INVALID_UPSTREAM_BODY)
			},
			Error::Config(err) => {
				tracing::error!(error = %err, "Relay failed unexpectedly.");

				RelayResponse::error(StatusCode::INTERNAL_SERVER_ERROR, self.auth_failure_message)
			},
		}
	}

	fn assemble(
		config: &RelayConfig,
		client: ReqwestClient,
		cache: Arc<dyn TokenCache>,
	) -> Result<Self, ConfigError> {
		let tokens =
			TokenProvider::from_config(config, cache, ReqwestHttpClient::with_client(client.clone()))?;
		let submitter = LeadSubmitter::new(client, config.leads_url.clone());

		Ok(Self::new(tokens, submitter, config.auth_failure_message()))
	}
}
