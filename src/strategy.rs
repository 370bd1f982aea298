//! The Meveto authentication strategy.
//!
//! [`MevetoStrategy`] ties the pieces together: it builds authorization redirects, redeems
//! authorization codes through the OAuth2 facade, fetches and normalizes the user
//! profile, and finally hands the result to the application's [`Verify`] hook.

pub mod options;
pub use options::*;

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	error::ApiError,
	http::{AuthorizedHttpClient, AuthorizedResponse, TokenTransmission},
	oauth::CodeExchanger,
	obs::{self, AuthStage, StageOutcome, StageSpan},
	profile::{PROVIDER, Profile, ProviderIdentity},
	token::TokenSet,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestAuthorizedClient;

const STATE_LEN: usize = 32;
const BODY_PREVIEW_LIMIT: usize = 256;

/// Strategy specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestMevetoStrategy<V> = MevetoStrategy<V, ReqwestAuthorizedClient>;

/// Future returned by [`Verify`] implementations.
pub type VerifyFuture<'a, U> = Pin<Box<dyn Future<Output = Result<Option<U>>> + 'a + Send>>;

/// Application hook that decides whether verified Meveto credentials map to a user.
///
/// The hook receives the issued tokens and the normalized profile once the code exchange
/// and the profile fetch both succeed. `Ok(Some(user))` completes the login, `Ok(None)`
/// means the credentials were valid but no account matched, and an error aborts the
/// attempt.
pub trait Verify
where
	Self: 'static + Send + Sync,
{
	/// User value produced by a completed login.
	type User: 'static + Send;

	/// Resolves the authenticated identity to an application user.
	fn verify<'a>(
		&'a self,
		access_token: &'a str,
		refresh_token: Option<&'a str>,
		profile: Profile,
	) -> VerifyFuture<'a, Self::User>;
}

/// Authentication strategy delegating login to Meveto's OAuth 2.0 authorization-code
/// flow.
///
/// The strategy owns shared references to the HTTP transport and the verify hook so the
/// individual stages can stay focused on their own logic. A single `state` value is
/// generated at construction and reused for every authorization URL this instance
/// builds; per-request CSRF state belongs to the surrounding flow and travels through
/// [`authorization_params`](Self::authorization_params) instead.
#[derive(Clone)]
pub struct MevetoStrategy<V, C>
where
	V: ?Sized + Verify,
	C: ?Sized + AuthorizedHttpClient,
{
	/// Validated configuration applied to every stage this strategy runs.
	pub options: StrategyOptions,
	/// HTTP transport used for profile fetches and token exchanges.
	pub http_client: Arc<C>,
	/// Application hook that turns verified credentials into a user.
	pub verify: Arc<V>,
	state: String,
	profile_url: Url,
	token_transmission: TokenTransmission,
}
impl<V, C> MevetoStrategy<V, C>
where
	V: ?Sized + Verify,
	C: ?Sized + AuthorizedHttpClient,
{
	/// Fixed strategy name Meveto logins register under.
	pub const NAME: &'static str = PROVIDER;

	/// Creates a strategy that reuses the caller-provided transport.
	///
	/// `options` are already validated by [`StrategyOptionsBuilder::build`]; construction
	/// itself cannot fail. The profile endpoint is resolved here by templating the
	/// configured client identifier into its query string.
	pub fn with_http_client(
		options: StrategyOptions,
		verify: impl Into<Arc<V>>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let state = random_string(STATE_LEN);
		let profile_url = options.resolved_user_profile_url();

		Self {
			options,
			http_client: http_client.into(),
			verify: verify.into(),
			state,
			profile_url,
			token_transmission: TokenTransmission::AuthorizationHeader,
		}
	}

	/// Strategy name, `"meveto"`.
	pub fn name(&self) -> &'static str {
		Self::NAME
	}

	/// Alphanumeric state value generated once at construction.
	///
	/// One value for the instance lifetime means this field cannot serve as per-request
	/// CSRF protection; supply per-request state through the surrounding flow and let
	/// [`authorization_params`](Self::authorization_params) forward it.
	pub fn state(&self) -> &str {
		&self.state
	}

	/// Resolved profile endpoint, templated with the configured client identifier.
	pub fn profile_url(&self) -> &Url {
		&self.profile_url
	}

	/// How access tokens travel on profile fetches; always the bearer header for Meveto.
	pub fn token_transmission(&self) -> TokenTransmission {
		self.token_transmission
	}

	/// Extra query parameters Meveto expects on every authorization redirect.
	///
	/// Pure mapping over the per-request options: `client_token` passes through and the
	/// per-request `state` is renamed to `sharing_token`. Missing inputs become empty
	/// values, unrelated keys are ignored, and nothing is validated. The `state` read
	/// here is the one the surrounding flow assigned to the request, not
	/// [`state`](Self::state).
	pub fn authorization_params(
		&self,
		request: &BTreeMap<String, String>,
	) -> BTreeMap<String, String> {
		let mut params = BTreeMap::new();

		params.insert(
			"client_token".into(),
			request.get("client_token").cloned().unwrap_or_default(),
		);
		params.insert("sharing_token".into(), request.get("state").cloned().unwrap_or_default());

		params
	}

	/// Builds the full authorization redirect URL.
	///
	/// Standard OAuth query parameters come first (`response_type=code`, `client_id`,
	/// `redirect_uri` and `scope` when configured, the instance `state`), followed by
	/// the Meveto-specific parameters from
	/// [`authorization_params`](Self::authorization_params).
	pub fn authorization_url(&self, request: &BTreeMap<String, String>) -> Url {
		const STAGE: AuthStage = AuthStage::Authorize;

		let _span = StageSpan::new(STAGE, "authorization_url").entered();

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let mut url = self.options.authorization_url.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.options.client_id);

		if let Some(callback) = self.options.callback_url.as_ref() {
			pairs.append_pair("redirect_uri", callback.as_str());
		}
		if let Some(scope) = self.options.joined_scope() {
			pairs.append_pair("scope", &scope);
		}

		pairs.append_pair("state", &self.state);

		for (key, value) in self.authorization_params(request) {
			pairs.append_pair(&key, &value);
		}

		drop(pairs);
		obs::record_stage_outcome(STAGE, StageOutcome::Success);

		url
	}

	/// Redeems an authorization code for tokens.
	///
	/// Failures from the underlying OAuth2 client pass through unmodified inside
	/// [`Error::Exchange`](crate::error::Error::Exchange).
	pub async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
		const STAGE: AuthStage = AuthStage::Exchange;

		let span = StageSpan::new(STAGE, "exchange_code");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let exchanger: CodeExchanger<C> =
					CodeExchanger::from_options(&self.options, self.http_client.clone())?;

				exchanger.exchange_code(code).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(STAGE, StageOutcome::Failure),
		}

		result
	}

	/// Fetches and normalizes the authenticated user's Meveto profile.
	///
	/// Sends one bearer-authorized GET to [`profile_url`](Self::profile_url), then maps
	/// the body through [`Profile::parse`]. Non-2xx responses surface as
	/// [`ApiError`](crate::error::ApiError) before any parsing happens; 2xx bodies that
	/// are not JSON fail with the documented parse message. On success the provider
	/// marker is overwritten with the Meveto identity, and the raw body plus the parsed
	/// payload are attached to the profile.
	pub async fn user_profile(&self, access_token: &str) -> Result<Profile> {
		const STAGE: AuthStage = AuthStage::UserProfile;

		let span = StageSpan::new(STAGE, "user_profile");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self
					.http_client
					.get_authorized_resource(
						&self.profile_url,
						access_token,
						self.token_transmission,
						&self.options.custom_headers,
					)
					.await?;

				if !response.is_success() {
					return Err(profile_api_error(&response).into());
				}

				let json = serde_json::from_str::<Value>(&response.body)
					.map_err(|source| Error::ProfileParse { source })?;
				let mut profile = Profile::parse(&json);

				profile.provider = ProviderIdentity::meveto();
				profile.raw = response.body;
				profile.json = json;

				Ok(profile)
			})
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(STAGE, StageOutcome::Failure),
		}

		result
	}

	/// Runs the full login: code exchange, profile fetch, then the verify hook.
	///
	/// `Ok(None)` means the credentials were valid but the hook matched no user; any
	/// stage failure aborts the attempt with that stage's error.
	pub async fn authenticate(&self, code: &str) -> Result<Option<V::User>> {
		const STAGE: AuthStage = AuthStage::Verify;

		let token_set = self.exchange_code(code).await?;
		let profile = self.user_profile(token_set.access_token.expose()).await?;
		let span = StageSpan::new(STAGE, "authenticate");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(self.verify.verify(
				token_set.access_token.expose(),
				token_set.refresh_token.as_ref().map(|secret| secret.expose()),
				profile,
			))
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(STAGE, StageOutcome::Failure),
		}

		result
	}
}
impl<V, C> Debug for MevetoStrategy<V, C>
where
	V: ?Sized + Verify,
	C: ?Sized + AuthorizedHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MevetoStrategy")
			.field("options", &self.options)
			.field("state", &self.state)
			.field("token_transmission", &self.token_transmission)
			.finish()
	}
}
#[cfg(feature = "reqwest")]
impl<V> MevetoStrategy<V, ReqwestAuthorizedClient>
where
	V: ?Sized + Verify,
{
	/// Creates a strategy backed by the crate's default reqwest transport.
	///
	/// Use [`with_http_client`](Self::with_http_client) to supply a custom transport.
	pub fn new(options: StrategyOptions, verify: impl Into<Arc<V>>) -> Self {
		Self::with_http_client(options, verify, ReqwestAuthorizedClient::default())
	}
}

fn profile_api_error(response: &AuthorizedResponse) -> ApiError {
	let message = serde_json::from_str::<Value>(&response.body)
		.ok()
		.and_then(|payload| {
			["message", "error"]
				.into_iter()
				.find_map(|key| payload.get(key).and_then(Value::as_str).map(str::to_owned))
		})
		.unwrap_or_else(|| truncate_preview(&response.body));

	ApiError { status: response.status, message }
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut preview = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			preview.push('…');

			break;
		}

		preview.push(ch);
	}

	preview
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	struct AcceptAll;
	impl Verify for AcceptAll {
		type User = String;

		fn verify<'a>(
			&'a self,
			_access_token: &'a str,
			_refresh_token: Option<&'a str>,
			profile: Profile,
		) -> VerifyFuture<'a, Self::User> {
			Box::pin(async move { Ok(Some(profile.id.unwrap_or_default())) })
		}
	}

	fn build_strategy() -> MevetoStrategy<AcceptAll, ReqwestAuthorizedClient> {
		let options = StrategyOptions::builder("client-abc", "secret-xyz")
			.callback_url(
				Url::parse("https://app.example.com/auth/meveto/callback")
					.expect("Callback URL fixture should parse successfully."),
			)
			.scope(["openid", "profile"])
			.build()
			.expect("Strategy options should build successfully.");

		MevetoStrategy::new(options, AcceptAll)
	}

	#[test]
	fn strategy_name_is_fixed() {
		let strategy = build_strategy();

		assert_eq!(strategy.name(), "meveto");
		assert_eq!(MevetoStrategy::<AcceptAll, ReqwestAuthorizedClient>::NAME, "meveto");
	}

	#[test]
	fn construction_forces_header_transmission_and_resolves_the_profile_url() {
		let strategy = build_strategy();

		assert_eq!(strategy.token_transmission(), TokenTransmission::AuthorizationHeader);
		assert_eq!(
			strategy.profile_url().as_str(),
			"https://prod.meveto.com/api/client/user?client_id=client-abc"
		);
	}

	#[test]
	fn state_is_generated_once_per_instance() {
		let strategy = build_strategy();
		let first = strategy.state().to_owned();
		let _ = strategy.authorization_url(&BTreeMap::new());

		assert_eq!(strategy.state(), first);
		assert_eq!(strategy.state().len(), STATE_LEN);
		assert!(strategy.state().chars().all(|ch| ch.is_ascii_alphanumeric()));
	}

	#[test]
	fn distinct_instances_generate_distinct_state() {
		let first = build_strategy();
		let second = build_strategy();

		assert_ne!(first.state(), second.state());
	}

	#[test]
	fn authorization_params_maps_exactly_two_parameters() {
		let strategy = build_strategy();
		let request = BTreeMap::from([
			("client_token".to_owned(), "A".to_owned()),
			("state".to_owned(), "B".to_owned()),
			("unrelated".to_owned(), "ignored".to_owned()),
		]);
		let params = strategy.authorization_params(&request);

		assert_eq!(params.len(), 2);
		assert_eq!(params.get("client_token").map(String::as_str), Some("A"));
		assert_eq!(params.get("sharing_token").map(String::as_str), Some("B"));
	}

	#[test]
	fn authorization_params_defaults_missing_inputs_to_empty() {
		let strategy = build_strategy();
		let params = strategy.authorization_params(&BTreeMap::new());

		assert_eq!(params.get("client_token").map(String::as_str), Some(""));
		assert_eq!(params.get("sharing_token").map(String::as_str), Some(""));
	}

	#[test]
	fn authorization_url_carries_flow_and_extra_parameters() {
		let strategy = build_strategy();
		let request = BTreeMap::from([
			("client_token".to_owned(), "ct-1".to_owned()),
			("state".to_owned(), "flow-state".to_owned()),
		]);
		let url = strategy.authorization_url(&request);

		assert!(url.as_str().starts_with("https://dashboard.meveto.com/oauth-client?"));

		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"client-abc".into()));
		assert_eq!(
			pairs.get("redirect_uri"),
			Some(&"https://app.example.com/auth/meveto/callback".into())
		);
		assert_eq!(pairs.get("scope"), Some(&"openid,profile".into()));
		assert_eq!(pairs.get("state"), Some(&strategy.state().to_owned()));
		assert_eq!(pairs.get("client_token"), Some(&"ct-1".into()));
		assert_eq!(pairs.get("sharing_token"), Some(&"flow-state".into()));
	}

	#[test]
	fn authorization_url_omits_unconfigured_parameters() {
		let options = StrategyOptions::builder("client-min", "secret-min")
			.build()
			.expect("Strategy options should build successfully.");
		let strategy = MevetoStrategy::new(options, AcceptAll);
		let pairs: HashMap<_, _> =
			strategy.authorization_url(&BTreeMap::new()).query_pairs().into_owned().collect();

		assert!(!pairs.contains_key("redirect_uri"));
		assert!(!pairs.contains_key("scope"));
		assert_eq!(pairs.get("client_token").map(String::as_str), Some(""));
		assert_eq!(pairs.get("sharing_token").map(String::as_str), Some(""));
	}

	#[test]
	fn api_errors_prefer_payload_messages() {
		let response = AuthorizedResponse {
			status: 503,
			body: "{\"message\":\"upstream unavailable\"}".into(),
		};
		let error = profile_api_error(&response);

		assert_eq!(error.status, 503);
		assert_eq!(error.message, "upstream unavailable");
	}

	#[test]
	fn api_errors_fall_back_to_a_body_preview() {
		let short = AuthorizedResponse { status: 500, body: "<html>boom</html>".into() };
		let long = AuthorizedResponse { status: 500, body: "x".repeat(BODY_PREVIEW_LIMIT + 64) };

		assert_eq!(profile_api_error(&short).message, "<html>boom</html>");
		assert_eq!(profile_api_error(&long).message.chars().count(), BODY_PREVIEW_LIMIT + 1);
	}
}
