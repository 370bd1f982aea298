//! Meveto OAuth 2.0 authentication strategy - delegate user login to Meveto's
//! authorization-code flow and hand your application a normalized user profile.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod profile;
pub mod strategy;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestAuthorizedClient,
		profile::Profile,
		strategy::{MevetoStrategy, StrategyOptions, StrategyOptionsBuilder, Verify, VerifyFuture},
	};

	/// Strategy type alias used by reqwest-backed integration tests.
	pub type ReqwestTestStrategy = MevetoStrategy<RecordingVerify, ReqwestAuthorizedClient>;

	/// Arguments captured from a single verify-hook invocation.
	#[derive(Clone, Debug)]
	pub struct RecordedVerifyCall {
		/// Access token handed to the hook.
		pub access_token: String,
		/// Refresh token handed to the hook, if the provider issued one.
		pub refresh_token: Option<String>,
		/// Normalized profile handed to the hook.
		pub profile: Profile,
	}

	/// Verify hook that records every invocation and resolves to the profile's user id.
	#[derive(Debug, Default)]
	pub struct RecordingVerify {
		calls: Mutex<Vec<RecordedVerifyCall>>,
		deny: bool,
	}
	impl RecordingVerify {
		/// Builds a hook that refuses every login with `Ok(None)`.
		pub fn denying() -> Self {
			Self { calls: Mutex::default(), deny: true }
		}

		/// Returns the invocations observed so far.
		pub fn calls(&self) -> Vec<RecordedVerifyCall> {
			self.calls.lock().expect("Verify call recorder should not be poisoned.").clone()
		}
	}
	impl Verify for RecordingVerify {
		type User = String;

		fn verify<'a>(
			&'a self,
			access_token: &'a str,
			refresh_token: Option<&'a str>,
			profile: Profile,
		) -> VerifyFuture<'a, Self::User> {
			let user = (!self.deny).then(|| profile.id.clone().unwrap_or_default());

			self.calls.lock().expect("Verify call recorder should not be poisoned.").push(
				RecordedVerifyCall {
					access_token: access_token.to_owned(),
					refresh_token: refresh_token.map(str::to_owned),
					profile,
				},
			);

			Box::pin(async move { Ok(user) })
		}
	}

	/// Strategy options builder with every endpoint pointed at an httpmock server.
	pub fn test_options(
		server_base: &str,
		client_id: &str,
		client_secret: &str,
	) -> StrategyOptionsBuilder {
		StrategyOptions::builder(client_id, client_secret)
			.callback_url(test_url(server_base, "/callback"))
			.authorization_url(test_url(server_base, "/oauth-client"))
			.token_url(test_url(server_base, "/oauth/token"))
			.user_profile_url(test_url(server_base, "/api/client/user"))
	}

	/// Parses a URL rooted at an httpmock server base.
	pub fn test_url(server_base: &str, path: &str) -> Url {
		Url::parse(&format!("{server_base}{path}"))
			.expect("Test endpoint URLs should parse successfully.")
	}

	/// Constructs a [`MevetoStrategy`] wired to a recording verify hook and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_strategy(
		options: StrategyOptions,
	) -> (ReqwestTestStrategy, Arc<RecordingVerify>) {
		let verify = Arc::new(RecordingVerify::default());
		let strategy = MevetoStrategy::with_http_client(
			options,
			verify.clone(),
			ReqwestAuthorizedClient::default(),
		);

		(strategy, verify)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::{Arc, Mutex},
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
