//! Walks through building a Meveto strategy and printing the authorization redirect a web
//! application would send its user to.

// std
use std::collections::BTreeMap;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use meveto_strategy::{
	profile::Profile,
	strategy::{MevetoStrategy, StrategyOptions, Verify, VerifyFuture},
};

struct LookupUser;
impl Verify for LookupUser {
	type User = String;

	fn verify<'a>(
		&'a self,
		_access_token: &'a str,
		_refresh_token: Option<&'a str>,
		profile: Profile,
	) -> VerifyFuture<'a, Self::User> {
		Box::pin(async move { Ok(profile.username.or(profile.id)) })
	}
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let options = StrategyOptions::builder("demo-client", "demo-secret")
		.callback_url(Url::parse("https://app.example.com/auth/meveto/callback")?)
		.scope(["openid", "profile"])
		.build()?;
	let strategy = MevetoStrategy::new(options, LookupUser);
	let request = BTreeMap::from([
		("client_token".to_owned(), "partner-token".to_owned()),
		("state".to_owned(), "per-request-state".to_owned()),
	]);

	println!("Send your user to {}.", strategy.authorization_url(&request));
	println!(
		"Strategy `{}` reuses instance state `{}` on every redirect it builds.",
		strategy.name(),
		strategy.state()
	);
	println!("Tokens will be redeemed at {}.", &strategy.options.token_url);
	println!("Profiles will be fetched from {}.", strategy.profile_url());

	for (key, value) in strategy.authorization_params(&request) {
		println!("Meveto-specific parameter: {key}={value}.");
	}

	Ok(())
}
