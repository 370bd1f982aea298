//! Strategy-level error types shared across the exchange, profile, and verify stages.

// self
use crate::_prelude::*;

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint rejected the authorization-code exchange.
	///
	/// The underlying OAuth2 client failure passes through unmodified so callers can
	/// distinguish protocol rejections from transport problems.
	#[error("{source}")]
	Exchange {
		/// Underlying OAuth2 client failure.
		#[source]
		source: BoxError,
	},
	/// Profile endpoint answered 2xx with a body that is not valid JSON.
	#[error("Failed to parse user profile")]
	ProfileParse {
		/// Underlying JSON parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Meveto API rejected an authorized request.
	#[error(transparent)]
	Api(#[from] ApiError),
}
impl Error {
	/// Wraps a token-exchange failure without altering it.
	pub fn exchange(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Exchange { source: Box::new(src) }
	}
}

/// Error raised when the Meveto API answers an authorized request with a non-2xx status.
#[derive(Debug, ThisError)]
#[error("Meveto API error ({status}): {message}.")]
pub struct ApiError {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Message extracted from the response payload, or a preview of the raw body.
	pub message: String,
}

/// Configuration and validation failures raised while assembling the OAuth2 client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Strategy options contain an endpoint the OAuth2 client cannot consume.
	#[error("Options contain an invalid endpoint URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the user profile endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the user profile endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn profile_parse_display_matches_the_provider_contract() {
		let source = serde_json::from_str::<Value>("<html>not json</html>")
			.expect_err("Fixture body must not parse as JSON.");
		let error = Error::ProfileParse { source };

		assert_eq!(error.to_string(), "Failed to parse user profile");
	}

	#[test]
	fn api_error_display_carries_status_and_message() {
		let error = Error::from(ApiError { status: 503, message: "service unavailable".into() });

		assert_eq!(error.to_string(), "Meveto API error (503): service unavailable.");
	}

	#[test]
	fn exchange_display_surfaces_the_source_unchanged() {
		let error = Error::exchange(std::io::Error::other("connection reset by provider"));

		assert_eq!(error.to_string(), "connection reset by provider");
	}
}
