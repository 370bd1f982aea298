//! Validated strategy configuration and its builder.

// crates.io
use oauth2::http::{HeaderMap, HeaderName, HeaderValue};
// self
use crate::_prelude::*;

/// Default authorization endpoint users are redirected to.
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://dashboard.meveto.com/oauth-client";
/// Default token endpoint used for the authorization-code exchange.
pub const DEFAULT_TOKEN_URL: &str = "https://prod.meveto.com/oauth/token";
/// Default user-profile endpoint base; the strategy appends `client_id` at construction.
pub const DEFAULT_USER_PROFILE_URL: &str = "https://prod.meveto.com/api/client/user";
/// Default separator joining multiple scope values.
pub const DEFAULT_SCOPE_SEPARATOR: &str = ",";

/// Validation failures raised while building [`StrategyOptions`].
#[derive(Debug, ThisError)]
pub enum StrategyOptionsError {
	/// Client identifier is required and must be non-empty.
	#[error("Missing client ID.")]
	MissingClientId,
	/// Client secret is required and must be non-empty.
	#[error("Missing client secret.")]
	MissingClientSecret,
	/// Custom header name or value failed validation.
	#[error("Custom header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as supplied by the caller.
		name: String,
		/// Underlying header validation failure.
		#[source]
		source: oauth2::http::Error,
	},
}

/// Immutable, validated configuration consumed by the strategy constructors.
#[derive(Clone)]
pub struct StrategyOptions {
	/// OAuth 2.0 client identifier issued by Meveto.
	pub client_id: String,
	/// OAuth 2.0 client secret issued by Meveto.
	pub client_secret: String,
	/// Redirect URI registered with Meveto; omitted from requests when absent.
	pub callback_url: Option<Url>,
	/// Authorization endpoint users are redirected to.
	pub authorization_url: Url,
	/// Token endpoint used for the authorization-code exchange.
	pub token_url: Url,
	/// User-profile endpoint base, before the `client_id` query parameter is applied.
	pub user_profile_url: Url,
	/// Scope values requested during authorization.
	pub scope: Vec<String>,
	/// Separator joining multiple scope values.
	pub scope_separator: String,
	/// Validated headers merged into token exchanges and authorized resource fetches.
	pub custom_headers: HeaderMap,
}
impl StrategyOptions {
	/// Returns a builder seeded with the required credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> StrategyOptionsBuilder {
		StrategyOptionsBuilder::new(client_id, client_secret)
	}

	/// Scope values joined with the configured separator; `None` when no scope is set.
	pub fn joined_scope(&self) -> Option<String> {
		if self.scope.is_empty() {
			None
		} else {
			Some(self.scope.join(&self.scope_separator))
		}
	}

	/// Profile endpoint with the `client_id` query parameter applied.
	pub fn resolved_user_profile_url(&self) -> Url {
		let mut url = self.user_profile_url.clone();

		url.query_pairs_mut().append_pair("client_id", &self.client_id);

		url
	}
}
impl Debug for StrategyOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyOptions")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("callback_url", &self.callback_url)
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("user_profile_url", &self.user_profile_url)
			.field("scope", &self.scope)
			.field("scope_separator", &self.scope_separator)
			.field("custom_headers", &self.custom_headers)
			.finish()
	}
}

/// Builder producing [`StrategyOptions`] with Meveto's documented defaults.
#[derive(Clone, Debug)]
pub struct StrategyOptionsBuilder {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Optional redirect URI registered with Meveto.
	pub callback_url: Option<Url>,
	/// Optional override for the authorization endpoint.
	pub authorization_url: Option<Url>,
	/// Optional override for the token endpoint.
	pub token_url: Option<Url>,
	/// Optional override for the user-profile endpoint base.
	pub user_profile_url: Option<Url>,
	/// Scope values requested during authorization.
	pub scope: Vec<String>,
	/// Optional override for the scope separator.
	pub scope_separator: Option<String>,
	/// Raw custom header pairs, validated during [`build`](Self::build).
	pub custom_headers: Vec<(String, String)>,
}
impl StrategyOptionsBuilder {
	fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			callback_url: None,
			authorization_url: None,
			token_url: None,
			user_profile_url: None,
			scope: Vec::new(),
			scope_separator: None,
			custom_headers: Vec::new(),
		}
	}

	/// Sets the redirect URI registered with Meveto.
	pub fn callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_url(mut self, url: Url) -> Self {
		self.authorization_url = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Overrides the user-profile endpoint base.
	pub fn user_profile_url(mut self, url: Url) -> Self {
		self.user_profile_url = Some(url);

		self
	}

	/// Replaces the requested scope values.
	pub fn scope<I>(mut self, scope: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the separator joining multiple scope values.
	pub fn scope_separator(mut self, separator: impl Into<String>) -> Self {
		self.scope_separator = Some(separator.into());

		self
	}

	/// Adds a header merged into token exchanges and authorized resource fetches.
	pub fn custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.custom_headers.push((name.into(), value.into()));

		self
	}

	/// Consumes the builder, applies defaults, and validates the resulting options.
	pub fn build(self) -> Result<StrategyOptions, StrategyOptionsError> {
		if self.client_id.is_empty() {
			return Err(StrategyOptionsError::MissingClientId);
		}
		if self.client_secret.is_empty() {
			return Err(StrategyOptionsError::MissingClientSecret);
		}

		let mut custom_headers = HeaderMap::new();

		for (name, value) in &self.custom_headers {
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
				StrategyOptionsError::InvalidHeader { name: name.clone(), source: source.into() }
			})?;
			let header_value = HeaderValue::from_str(value).map_err(|source| {
				StrategyOptionsError::InvalidHeader { name: name.clone(), source: source.into() }
			})?;

			custom_headers.insert(header_name, header_value);
		}

		Ok(StrategyOptions {
			client_id: self.client_id,
			client_secret: self.client_secret,
			callback_url: self.callback_url,
			authorization_url: self
				.authorization_url
				.unwrap_or_else(|| default_endpoint(DEFAULT_AUTHORIZATION_URL)),
			token_url: self.token_url.unwrap_or_else(|| default_endpoint(DEFAULT_TOKEN_URL)),
			user_profile_url: self
				.user_profile_url
				.unwrap_or_else(|| default_endpoint(DEFAULT_USER_PROFILE_URL)),
			scope: self.scope,
			scope_separator: self
				.scope_separator
				.unwrap_or_else(|| DEFAULT_SCOPE_SEPARATOR.to_owned()),
			custom_headers,
		})
	}
}

fn default_endpoint(raw: &'static str) -> Url {
	Url::parse(raw).expect("Default endpoint constants must parse as URLs.")
}
