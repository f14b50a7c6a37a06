//! Relay-level error types shared across the token provider, submitter, and handler.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Inbound request body could not be understood.
	#[error(transparent)]
	Input(#[from] InputError),
	/// No usable access token could be obtained.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// The CRM create-lead call failed.
	#[error(transparent)]
	Submit(#[from] crate::submit::SubmitError),
}

/// Configuration and startup failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured endpoint is not a valid URL.
	#[error("Configured URL is invalid.")]
	InvalidUrl(#[from] url::ParseError),
	/// A required setting was not supplied.
	#[error("Required setting `{name}` is missing.")]
	MissingSetting {
		/// Setting name as it appears on the command line.
		name: &'static str,
	},
	/// The configured cache backend could not be opened.
	#[error("Token cache backend could not be opened.")]
	CacheOpen {
		/// Underlying cache failure.
		#[source]
		source: crate::store::CacheError,
	},
	/// The listener could not be bound or served.
	#[error("Server I/O failure.")]
	Io(#[from] std::io::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Inbound body failures.
#[derive(Debug, ThisError)]
pub enum InputError {
	/// The body is not a JSON object matching the booking shape.
	#[error("Request body is not valid booking JSON at `{path}`.")]
	InvalidJson {
		/// Path to the offending value, `.` for the document root.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for InputError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::InvalidJson { path, source: e.into_inner() }
	}
}

/// Failures while obtaining an access token.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Neither the cache nor configuration holds a refresh token.
	#[error("No refresh token is available.")]
	MissingRefreshToken,
	/// Token endpoint answered with an OAuth `error` field.
	#[error("Token endpoint rejected the refresh token: {error}.")]
	Rejected {
		/// OAuth error code (for example `invalid_code`).
		error: String,
		/// Optional `error_description` supplied by the provider.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with a body that is not a token response.
	#[error("Token endpoint returned an unexpected response.")]
	UnexpectedResponse {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Raw response body for diagnostics.
		body: String,
	},
	/// Token endpoint did not answer within the configured timeout.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout,
	/// Network failure while calling the token endpoint.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}
impl AuthError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Returns `true` when the failure was an outbound timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn input_error_records_json_path() {
		let mut de = serde_json::Deserializer::from_str("{\"name\": [42]}");
		let err = serde_path_to_error::deserialize::<_, crate::lead::BookingSubmission>(&mut de)
			.expect_err("Array-valued name should fail to deserialize.");
		let input = InputError::from(err);

		assert!(input.to_string().contains("name"));
	}
}
