//! Create-lead calls against the CRM Leads resource.

// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	lead::LeadPayload,
	obs::{self, Stage, StageOutcome, StageSpan},
};

/// Failures of a single create-lead attempt.
#[derive(Debug, ThisError)]
pub enum SubmitError {
	/// CRM answered with a non-2xx status; the body is kept verbatim.
	#[error("CRM rejected the lead with status {status}.")]
	Rejected {
		/// Upstream HTTP status.
		status: StatusCode,
		/// Raw upstream response body.
		body: String,
	},
	/// CRM reported success but the body is not JSON.
	#[error("CRM returned a success status with a body that is not JSON.")]
	Decode {
		/// Upstream HTTP status.
		status: StatusCode,
		/// Raw upstream response body.
		body: String,
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// CRM did not answer within the configured timeout.
	#[error("Request timed out while calling the CRM.")]
	Timeout,
	/// Network failure while calling the CRM.
	#[error("Network error occurred while calling the CRM.")]
	Transport {
		/// Transport failure.
		#[source]
		source: ReqwestError,
	},
}
impl SubmitError {
	/// Returns `true` when the CRM refused the access token.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED)
	}
}
impl From<ReqwestError> for SubmitError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::Transport { source: e } }
	}
}

/// Sends lead payloads to the CRM.
#[derive(Clone, Debug)]
pub struct LeadSubmitter {
	client: ReqwestClient,
	leads_url: Url,
}
impl LeadSubmitter {
	/// Creates a submitter posting to `leads_url`.
	pub fn new(client: ReqwestClient, leads_url: Url) -> Self {
		Self { client, leads_url }
	}

	/// Creates one lead record, returning the CRM's parsed response on success.
	pub async fn submit(
		&self,
		payload: &LeadPayload,
		token: &AccessToken,
	) -> Result<serde_json::Value, SubmitError> {
		const STAGE: Stage = Stage::Submit;

		let span = StageSpan::new(STAGE, "submit");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span.instrument(self.send(payload, token)).await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(STAGE, StageOutcome::Failure),
		}

		result
	}

	async fn send(
		&self,
		payload: &LeadPayload,
		token: &AccessToken,
	) -> Result<serde_json::Value, SubmitError> {
		let response = self
			.client
			.post(self.leads_url.clone())
			.header(AUTHORIZATION, token.authorization_header())
			.json(&payload.envelope())
			.send()
			.await?;
		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			tracing::error!(status = status.as_u16(), body = %body, "CRM rejected the lead.");

			return Err(SubmitError::Rejected { status, body });
		}

		tracing::info!(status = status.as_u16(), "CRM accepted the lead.");

		serde_json::from_str(&body).map_err(|source| SubmitError::Decode { status, body, source })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_401_counts_as_unauthorized() {
		let unauthorized =
			SubmitError::Rejected { status: StatusCode::UNAUTHORIZED, body: String::new() };
		let forbidden = SubmitError::Rejected { status: StatusCode::FORBIDDEN, body: String::new() };

		assert!(unauthorized.is_unauthorized());
		assert!(!forbidden.is_unauthorized());
		assert!(!SubmitError::Timeout.is_unauthorized());
	}
}
