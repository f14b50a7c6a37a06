//! Refresh-token exchange against the CRM's OAuth 2.0 token endpoint.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken},
	error::{AuthError, ConfigError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Error payload some providers (Zoho among them) return with a `200 OK` status.
#[derive(Debug, Deserialize)]
struct InlineErrorBody {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

/// Minimal success payload: some endpoints omit `token_type`, which `oauth2` requires.
#[derive(Debug, Deserialize)]
struct BareTokenBody {
	access_token: String,
}

/// Performs `grant_type=refresh_token` exchanges with client credentials sent in the form body.
#[derive(Clone)]
pub struct RefreshExchange {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	token_url: Url,
}
impl RefreshExchange {
	/// Creates an exchange bound to `token_url` and the confidential client credentials.
	pub fn new(
		token_url: &Url,
		client_id: &str,
		client_secret: &str,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_token_uri(TokenUrl::new(token_url.to_string())?)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client, token_url: token_url.clone() })
	}

	/// Token endpoint this exchange talks to.
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}

	/// Mints a new access token from `refresh_token`.
	///
	/// Every failure is logged with the full provider response before being returned.
	pub async fn exchange(&self, refresh_token: &RefreshToken) -> Result<AccessToken, AuthError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.instrumented(meta.clone());
		let secret = oauth2::RefreshToken::new(refresh_token.expose().to_owned());

		match self.oauth_client.exchange_refresh_token(&secret).request_async(&handle).await {
			Ok(response) => Ok(AccessToken::new(response.access_token().secret().to_owned())),
			Err(err) => map_request_error(meta.take(), err).inspect_err(log_exchange_failure),
		}
	}
}
impl Debug for RefreshExchange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshExchange").field("token_url", &self.token_url.as_str()).finish()
	}
}

fn log_exchange_failure(err: &AuthError) {
	match err {
		AuthError::Rejected { error, description, status } => tracing::error!(
			error = %error,
			description = description.as_deref().unwrap_or_default(),
			status = status.unwrap_or_default(),
			"Token endpoint rejected the refresh token."
		),
		AuthError::UnexpectedResponse { status, body } => tracing::error!(
			status = status.unwrap_or_default(),
			body = %body,
			"Token endpoint returned an unexpected response."
		),
		other => tracing::error!(error = %other, "Token refresh failed."),
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Result<AccessToken, AuthError> {
	let status = meta.and_then(|value| value.status);

	Err(match err {
		RequestTokenError::ServerResponse(response) => map_server_response(response, status),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(_, body) => return map_unparsed_body(&body, status),
		RequestTokenError::Other(message) =>
			AuthError::UnexpectedResponse { status, body: message },
	})
}

fn map_server_response(response: BasicErrorResponse, status: Option<u16>) -> AuthError {
	AuthError::Rejected {
		error: response.error().as_ref().to_string(),
		description: response.error_description().cloned(),
		status,
	}
}

// A body `oauth2` could not parse is either an inline error or a token without `token_type`.
fn map_unparsed_body(body: &[u8], status: Option<u16>) -> Result<AccessToken, AuthError> {
	if let Ok(inline) = serde_json::from_slice::<InlineErrorBody>(body) {
		return Err(AuthError::Rejected {
			error: inline.error,
			description: inline.error_description,
			status,
		});
	}

	match serde_json::from_slice::<BareTokenBody>(body) {
		Ok(bare) if !bare.access_token.trim().is_empty() => {
			tracing::debug!("Token endpoint omitted `token_type`; using the bare access token.");

			Ok(AccessToken::new(bare.access_token))
		},
		_ => Err(AuthError::UnexpectedResponse {
			status,
			body: String::from_utf8_lossy(body).into_owned(),
		}),
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> AuthError {
	match err {
		HttpClientError::Reqwest(inner) if inner.is_timeout() => AuthError::Timeout,
		HttpClientError::Reqwest(inner) => AuthError::transport(*inner),
		HttpClientError::Http(inner) => AuthError::transport(inner),
		HttpClientError::Io(inner) => AuthError::transport(inner),
		HttpClientError::Other(message) => AuthError::transport(std::io::Error::other(message)),
		_ => AuthError::transport(std::io::Error::other("unknown HTTP client failure")),
	}
}
