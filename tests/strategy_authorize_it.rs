#![cfg(all(feature = "reqwest", feature = "test"))]

// self
use meveto_strategy::{_preludet::*, strategy::StrategyOptions};

#[test]
fn authorization_url_defaults_to_the_meveto_dashboard() {
	let options = StrategyOptions::builder("client-az", "secret-az")
		.scope(["openid", "profile"])
		.build()
		.expect("Strategy options should build successfully.");
	let (strategy, _verify) = build_reqwest_test_strategy(options);
	let url = strategy.authorization_url(&BTreeMap::new());

	assert!(url.as_str().starts_with("https://dashboard.meveto.com/oauth-client?"));

	let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&"client-az".into()));
	assert_eq!(pairs.get("scope"), Some(&"openid,profile".into()));
}

#[test]
fn authorization_url_reuses_the_instance_state_across_calls() {
	let options = StrategyOptions::builder("client-state", "secret-state")
		.build()
		.expect("Strategy options should build successfully.");
	let (strategy, _verify) = build_reqwest_test_strategy(options);
	let request = BTreeMap::from([
		("client_token".to_owned(), "ct".to_owned()),
		("state".to_owned(), "per-request".to_owned()),
	]);
	let first: HashMap<_, _> =
		strategy.authorization_url(&request).query_pairs().into_owned().collect();
	let second: HashMap<_, _> =
		strategy.authorization_url(&request).query_pairs().into_owned().collect();

	assert_eq!(first.get("state"), Some(&strategy.state().to_owned()));
	assert_eq!(first.get("state"), second.get("state"));
	assert_eq!(first.get("client_token"), Some(&"ct".into()));
	assert_eq!(first.get("sharing_token"), Some(&"per-request".into()));
}

#[test]
fn debug_output_redacts_the_client_secret() {
	let options = StrategyOptions::builder("client-dbg", "secret-dbg")
		.build()
		.expect("Strategy options should build successfully.");
	let (strategy, _verify) = build_reqwest_test_strategy(options);
	let rendered = format!("{strategy:?}");

	assert!(rendered.contains("client-dbg"));
	assert!(!rendered.contains("secret-dbg"));
}
