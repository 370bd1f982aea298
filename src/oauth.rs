//! Internal OAuth client facade abstractions.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	RedirectUrl, TokenUrl,
	basic::BasicClient,
	http::HeaderMap,
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::AuthorizedHttpClient,
	strategy::StrategyOptions,
	token::TokenSet,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Thin facade over the `oauth2` crate that redeems authorization codes.
///
/// The strategy builds one facade per exchange from its validated options. The facade
/// owns the configured client plus the custom header set its transport handle merges
/// into every token request; exchange failures pass through unmodified.
pub(crate) struct CodeExchanger<C>
where
	C: ?Sized + AuthorizedHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	custom_headers: HeaderMap,
}
impl<C> CodeExchanger<C>
where
	C: ?Sized + AuthorizedHttpClient,
{
	/// Assembles the OAuth2 client from strategy options.
	///
	/// Client credentials always travel in the POST body, matching how the Meveto token
	/// endpoint authenticates clients. The redirect URI is attached only when the
	/// options carry one.
	pub(crate) fn from_options(
		options: &StrategyOptions,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(options.authorization_url.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(options.token_url.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(options.client_id.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_client_secret(ClientSecret::new(options.client_secret.clone()))
			.set_auth_type(AuthType::RequestBody);

		if let Some(callback) = options.callback_url.as_ref() {
			let redirect_url = RedirectUrl::new(callback.to_string())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;

			oauth_client = oauth_client.set_redirect_uri(redirect_url);
		}

		Ok(Self {
			oauth_client,
			http_client: http_client.into(),
			custom_headers: options.custom_headers.clone(),
		})
	}

	pub(crate) async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
		let handle = self.http_client.exchange_handle(&self.custom_headers);
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&handle)
			.await
			.map_err(Error::exchange)?;

		Ok(TokenSet::from_token_response(&response))
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::http::ReqwestAuthorizedClient;

	fn options(callback: Option<&str>) -> StrategyOptions {
		let mut builder = StrategyOptions::builder("client-id", "client-secret");

		if let Some(callback) = callback {
			builder = builder.callback_url(
				Url::parse(callback).expect("Callback URL fixture should parse successfully."),
			);
		}

		builder.build().expect("Strategy options should build successfully.")
	}

	#[test]
	fn builds_exchanger_with_redirect() {
		let options = options(Some("https://app.example.com/auth/meveto/callback"));
		let result = <CodeExchanger<ReqwestAuthorizedClient>>::from_options(
			&options,
			Arc::new(ReqwestAuthorizedClient::default()),
		);

		assert!(result.is_ok());
	}

	#[test]
	fn builds_exchanger_without_redirect() {
		let options = options(None);
		let result = <CodeExchanger<ReqwestAuthorizedClient>>::from_options(
			&options,
			Arc::new(ReqwestAuthorizedClient::default()),
		);

		assert!(result.is_ok());
	}
}
