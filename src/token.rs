//! Issued-token carriers returned by the authorization-code exchange.

// crates.io
use oauth2::{TokenResponse, basic::BasicTokenResponse};
// self
use crate::_prelude::*;

/// Opaque wrapper keeping token material out of logs.
///
/// `Debug` and `Display` render `<redacted>`; use [`expose`](Self::expose) when the raw
/// value is genuinely needed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw secret. Callers must not log the returned value.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Tokens issued by a successful authorization-code exchange.
///
/// The strategy enforces no expiry policy and never refreshes; `issued_at` and
/// `expires_in` are passed through so the application can schedule its own re-login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
	/// Access token issued by the token endpoint.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Relative lifetime reported by the token endpoint, if any.
	pub expires_in: Option<Duration>,
}
impl TokenSet {
	pub(crate) fn from_token_response(response: &BasicTokenResponse) -> Self {
		let expires_in = response
			.expires_in()
			.and_then(|value| i64::try_from(value.as_secs()).ok())
			.map(Duration::seconds);

		Self {
			access_token: TokenSecret::new(response.access_token().secret().to_owned()),
			refresh_token: response
				.refresh_token()
				.map(|token| TokenSecret::new(token.secret().to_owned())),
			issued_at: OffsetDateTime::now_utc(),
			expires_in,
		}
	}

	/// Absolute expiry instant, when the provider reported a lifetime.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.map(|delta| self.issued_at + delta)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn token_set(expires_in: Option<Duration>) -> TokenSet {
		TokenSet {
			access_token: TokenSecret::new("access"),
			refresh_token: None,
			issued_at: datetime!(2025-06-01 12:00 UTC),
			expires_in,
		}
	}

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "super-secret");
	}

	#[test]
	fn expires_at_offsets_from_the_issue_instant() {
		let token_set = token_set(Some(Duration::hours(1)));

		assert_eq!(token_set.expires_at(), Some(datetime!(2025-06-01 13:00 UTC)));
	}

	#[test]
	fn expires_at_is_absent_without_a_reported_lifetime() {
		assert_eq!(token_set(None).expires_at(), None);
	}
}
