//! Refresh tokens used to mint access tokens.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Long-lived credential used only to mint new access tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshToken(TokenSecret);
impl RefreshToken {
	/// Wraps a raw refresh token, rejecting blank values.
	pub fn new(value: impl Into<String>) -> Option<Self> {
		let secret = TokenSecret::new(value);

		if secret.is_blank() { None } else { Some(Self(secret)) }
	}

	/// Returns the raw token value.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}
}
impl Display for RefreshToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
