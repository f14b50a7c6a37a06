//! Access tokens presented to the CRM.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Short-lived CRM bearer credential.
///
/// The relay only borrows access tokens: the cache owns the current one and the provider mints
/// replacements on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken(TokenSecret);
impl AccessToken {
	/// Wraps a raw access token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(TokenSecret::new(value))
	}

	/// Returns the raw token value.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}

	/// Formats the `Authorization` header value expected by Zoho APIs.
	pub fn authorization_header(&self) -> String {
		format!("Zoho-oauthtoken {}", self.expose())
	}
}
impl From<TokenSecret> for AccessToken {
	fn from(secret: TokenSecret) -> Self {
		Self(secret)
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authorization_header_uses_zoho_scheme() {
		let token = AccessToken::new("1000.abc");

		assert_eq!(token.authorization_header(), "Zoho-oauthtoken 1000.abc");
		assert_eq!(token.to_string(), "<redacted>");
	}
}
