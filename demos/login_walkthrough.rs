//! Interactive walkthrough of a full Meveto login.
//!
//! Prints the authorization URL, waits for the pasted authorization code, exchanges it,
//! fetches the user profile, and runs a verify hook so every stage is exercised end to
//! end against the real provider.

// std
use std::{
	collections::BTreeMap,
	io::{Write, stdin, stdout},
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use meveto_strategy::{
	profile::Profile,
	strategy::{MevetoStrategy, StrategyOptions, Verify, VerifyFuture},
};

struct AcceptAnyUser;
impl Verify for AcceptAnyUser {
	type User = String;

	fn verify<'a>(
		&'a self,
		_access_token: &'a str,
		refresh_token: Option<&'a str>,
		profile: Profile,
	) -> VerifyFuture<'a, Self::User> {
		let refresh_issued = refresh_token.is_some();

		Box::pin(async move {
			println!("Verify hook received profile: {profile:?}.");

			if refresh_issued {
				println!("Provider issued a refresh token alongside the access token.");
			}

			Ok(profile.username.or(profile.id))
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = prompt("Meveto client ID", "demo-client")?;
	let client_secret = prompt("Meveto client secret", "demo-secret")?;
	let redirect = prompt(
		"Redirect URI registered with Meveto",
		"https://app.example.com/auth/meveto/callback",
	)?;
	let options = StrategyOptions::builder(client_id, client_secret)
		.callback_url(Url::parse(&redirect)?)
		.build()?;
	let strategy = MevetoStrategy::new(options, AcceptAnyUser);
	let mut request = BTreeMap::new();

	if let Some(client_token) = prompt_optional("Client token (optional)")? {
		request.insert("client_token".to_owned(), client_token);
	}

	println!("Open this URL in a browser to authorize: {}.", strategy.authorization_url(&request));
	println!("After Meveto redirects back, copy the `code` query parameter and paste it below.");

	let Some(code) = prompt_optional("Authorization code (leave blank to stop here)")? else {
		println!("No authorization code provided; skipping the live exchange.");

		return Ok(());
	};

	match strategy.authenticate(&code).await? {
		Some(user) => println!("Login completed for user `{user}`."),
		None => println!("Credentials were valid but no application user matched."),
	}

	Ok(())
}

fn prompt(message: &str, default: &str) -> Result<String> {
	Ok(prompt_optional(&format!("{message} [{default}]"))?.unwrap_or_else(|| default.to_owned()))
}

fn prompt_optional(message: &str) -> Result<Option<String>> {
	print!("{message}: ");

	stdout().flush()?;

	let mut input = String::new();

	stdin().read_line(&mut input)?;

	let trimmed = input.trim();

	if trimmed.is_empty() {
		Ok(None)
	} else {
		Ok(Some(trimmed.to_owned()))
	}
}
