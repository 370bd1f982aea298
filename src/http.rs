//! Transport primitives for authorized provider calls.
//!
//! The module exposes [`AuthorizedHttpClient`] so downstream crates can integrate custom
//! HTTP clients: one trait covers both the authenticated profile fetch and the
//! [`AsyncHttpClient`] handle the token exchange runs through. Handles merge the
//! strategy's custom headers into every outbound token request before dispatching, and
//! profile fetches surface the raw status and body through [`AuthorizedResponse`] so the
//! strategy can classify failures itself.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, http::HeaderMap};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::TransportError};

/// Future returned by [`AuthorizedHttpClient::get_authorized_resource`].
pub type ResourceFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AuthorizedResponse, TransportError>> + 'a + Send>>;

/// How the access token travels on authorized resource requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenTransmission {
	/// Append the token as an `access_token` query parameter.
	#[default]
	QueryParameter,
	/// Send the token as an `Authorization: Bearer` header.
	AuthorizationHeader,
}

/// Raw response surfaced by authorized resource fetches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizedResponse {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Raw response body.
	pub body: String,
}
impl AuthorizedResponse {
	/// Returns `true` when the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP transports capable of fetching authorized resources and executing
/// OAuth token exchanges.
///
/// The trait acts as the strategy's only dependency on an HTTP stack. Callers provide an
/// implementation (typically behind `Arc<T>` where `T: AuthorizedHttpClient`) and the
/// strategy requests a short-lived [`AsyncHttpClient`] handle for each code exchange.
/// Implementations must be `Send + Sync + 'static` so they can be shared across strategy
/// instances, and both the handles and the resource futures must stay `Send` for the
/// lifetime of the in-flight operation.
pub trait AuthorizedHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle the token exchange runs through.
	///
	/// Handles own whatever state they need (client clone plus header set) so their
	/// request futures remain `Send` without borrowing the transport.
	type ExchangeHandle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that merges `headers` into each token request.
	///
	/// Configured headers take precedence over same-named headers the OAuth2 client sets
	/// on its own requests.
	fn exchange_handle(&self, headers: &HeaderMap) -> Self::ExchangeHandle;

	/// Performs one authenticated GET against `url`.
	///
	/// `transmission` controls whether the access token travels as a bearer header or an
	/// `access_token` query parameter; `headers` are merged into the request.
	/// Implementations surface transport failures unchanged inside [`TransportError`]
	/// and never retry.
	fn get_authorized_resource<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
		transmission: TokenTransmission,
		headers: &'a HeaderMap,
	) -> ResourceFuture<'a>;
}

/// Appends the access token to `url` as the `access_token` query parameter.
///
/// Useful for [`AuthorizedHttpClient`] implementations handling
/// [`TokenTransmission::QueryParameter`].
pub fn with_query_token(url: &Url, access_token: &str) -> Url {
	let mut url = url.clone();

	url.query_pairs_mut().append_pair("access_token", access_token);

	url
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// The same client instance backs profile fetches and token exchanges. Configure any
/// custom [`ReqwestClient`] to disable redirect following, because the strategy passes
/// this client into the `oauth2` crate for the code exchange.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestAuthorizedClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestAuthorizedClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestAuthorizedClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestAuthorizedClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
/// Adapter state shared by [`HeaderedExchangeHandle`] clones.
struct HeaderedHttpClient {
	client: ReqwestClient,
	headers: HeaderMap,
}

#[cfg(feature = "reqwest")]
/// Public handle returned by [`ReqwestAuthorizedClient`] that satisfies
/// [`AuthorizedHttpClient`].
#[derive(Clone)]
pub struct HeaderedExchangeHandle(Arc<HeaderedHttpClient>);
#[cfg(feature = "reqwest")]
impl HeaderedExchangeHandle {
	fn new(client: ReqwestClient, headers: HeaderMap) -> Self {
		Self(Arc::new(HeaderedHttpClient { client, headers }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for HeaderedExchangeHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let shared = Arc::clone(&self.0);

		Box::pin(async move {
			let mut request = reqwest::Request::try_from(request).map_err(Box::new)?;

			for (name, value) in &shared.headers {
				request.headers_mut().insert(name.clone(), value.clone());
			}

			let response = shared.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl AuthorizedHttpClient for ReqwestAuthorizedClient {
	type ExchangeHandle = HeaderedExchangeHandle;
	type TransportError = ReqwestError;

	fn exchange_handle(&self, headers: &HeaderMap) -> Self::ExchangeHandle {
		HeaderedExchangeHandle::new(self.0.clone(), headers.clone())
	}

	fn get_authorized_resource<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
		transmission: TokenTransmission,
		headers: &'a HeaderMap,
	) -> ResourceFuture<'a> {
		let client = self.0.clone();

		Box::pin(async move {
			let url = match transmission {
				TokenTransmission::QueryParameter => with_query_token(url, access_token),
				TokenTransmission::AuthorizationHeader => url.clone(),
			};
			let mut request = client.get(url).headers(headers.clone());

			if transmission == TokenTransmission::AuthorizationHeader {
				request = request.bearer_auth(access_token);
			}

			let response = request.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(TransportError::from)?;

			Ok(AuthorizedResponse { status, body })
		})
	}
}
