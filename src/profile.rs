//! Profile normalization for Meveto user-info payloads.

// self
use crate::_prelude::*;

/// Identifier Meveto profiles are stamped with; doubles as the strategy name.
pub const PROVIDER: &str = "meveto";

/// Provider identity marker attached to every normalized profile.
///
/// Serializes as `{"id":"meveto"}`. The strategy overwrites whatever identity the raw
/// payload claimed once the profile fetch completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
	/// Provider identifier string.
	pub id: String,
}
impl ProviderIdentity {
	/// Marker identifying the Meveto provider.
	pub fn meveto() -> Self {
		Self { id: PROVIDER.into() }
	}
}
impl Default for ProviderIdentity {
	fn default() -> Self {
		Self::meveto()
	}
}

/// Canonical user profile normalized from a Meveto user-info payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	/// Provider marker; always the Meveto identity once the strategy returns a profile.
	pub provider: ProviderIdentity,
	/// Stable Meveto user identifier, when the payload carried one.
	pub id: Option<String>,
	/// Display username, when the payload carried one.
	pub username: Option<String>,
	/// Raw response body the profile was normalized from.
	#[serde(rename = "_raw")]
	pub raw: String,
	/// Parsed payload the profile was normalized from.
	#[serde(rename = "_json")]
	pub json: Value,
}
impl Profile {
	/// Maps a raw user-info payload onto the normalized shape.
	///
	/// The mapping is pure and never fails: absent or non-scalar fields become `None`,
	/// numeric identifiers are stringified, and a string `provider` key is honored until
	/// the strategy overwrites it. `raw` and `json` start empty; the strategy attaches
	/// both after the fetch.
	pub fn parse(json: &Value) -> Self {
		let provider = json
			.get("provider")
			.and_then(Value::as_str)
			.map(|id| ProviderIdentity { id: id.to_owned() })
			.unwrap_or_default();

		Self {
			provider,
			id: scalar_field(json, "id"),
			username: scalar_field(json, "username"),
			raw: String::new(),
			json: Value::Null,
		}
	}
}

fn scalar_field(json: &Value, key: &str) -> Option<String> {
	match json.get(key)? {
		Value::String(value) => Some(value.clone()),
		Value::Number(value) => Some(value.to_string()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn parse_extracts_the_documented_fields() {
		let payload = json!({"id": "42", "username": "alice"});
		let profile = Profile::parse(&payload);

		assert_eq!(profile.id.as_deref(), Some("42"));
		assert_eq!(profile.username.as_deref(), Some("alice"));
		assert_eq!(profile.provider, ProviderIdentity::meveto());
	}

	#[test]
	fn parse_tolerates_missing_and_non_scalar_fields() {
		let payload = json!({"id": {"nested": true}, "unrelated": [1, 2, 3]});
		let profile = Profile::parse(&payload);

		assert_eq!(profile.id, None);
		assert_eq!(profile.username, None);
	}

	#[test]
	fn parse_stringifies_numeric_identifiers() {
		let payload = json!({"id": 42});
		let profile = Profile::parse(&payload);

		assert_eq!(profile.id.as_deref(), Some("42"));
	}

	#[test]
	fn parse_honors_a_payload_provider_until_overwritten() {
		let payload = json!({"provider": "upstream"});
		let profile = Profile::parse(&payload);

		assert_eq!(profile.provider.id, "upstream");
	}

	#[test]
	fn serialization_uses_the_passthrough_key_names() {
		let profile = Profile {
			provider: ProviderIdentity::meveto(),
			id: Some("42".into()),
			username: None,
			raw: "{}".into(),
			json: json!({}),
		};
		let serialized =
			serde_json::to_value(&profile).expect("Profile serialization should succeed.");

		assert_eq!(serialized.get("_raw"), Some(&json!("{}")));
		assert_eq!(serialized.get("_json"), Some(&json!({})));
		assert_eq!(serialized.get("provider"), Some(&json!({"id": "meveto"})));
	}
}
