// crates.io
use ::http::StatusCode;
// self
use crate::{_prelude::*, http::HttpResponse};

/// Body of an access-token API response.
///
/// Every field is optional on the wire: a successful lookup carries `uuid` and `scopes`, while
/// a rejected token only carries `message`. Empty fields are omitted when serializing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Identifier of the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uuid: Option<String>,
	/// Scopes granted to the token, in the order the API lists them.
	///
	/// A `null` list decodes as empty.
	#[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
	pub scopes: Vec<String>,
	/// Human-readable message, such as an authentication failure or a revocation status line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}
impl TokenResponse {
	/// Builds the response reported for a revocation: the status line becomes the message.
	pub fn from_status(status: StatusCode) -> Self {
		Self { message: Some(status.to_string()), ..Default::default() }
	}

	/// Returns true if the token was granted `scope`.
	pub fn has_scope(&self, scope: &str) -> bool {
		self.scopes.iter().any(|granted| granted == scope)
	}

	/// Returns true when the API identified the token.
	pub fn is_authenticated(&self) -> bool {
		self.uuid.is_some()
	}

	pub(crate) fn decode(response: &HttpResponse) -> Result<Self> {
		let status = response.status().as_u16();
		let mut de = serde_json::Deserializer::from_slice(response.body());

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::ResponseParse { source, status })
	}
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		::http::Response::builder()
			.status(status)
			.body(body.as_bytes().to_vec())
			.expect("Test response should build.")
	}

	#[test]
	fn decodes_scopes_in_api_order() {
		let decoded = TokenResponse::decode(&response(
			200,
			"{\"uuid\":\"12345678-1qas-1wer-2wed-12we34rt56y7\",\"scopes\":[\"write_builds\",\"read_agents\",\"graphql\"]}\n",
		))
		.expect("Valid payload should decode.");

		assert!(decoded.is_authenticated());
		assert_eq!(decoded.scopes, ["write_builds", "read_agents", "graphql"]);
		assert!(decoded.has_scope("graphql"));
		assert!(!decoded.has_scope("read_user"));
		assert_eq!(decoded.message, None);
	}

	#[test]
	fn decodes_rejection_message_regardless_of_status() {
		let decoded = TokenResponse::decode(&response(
			401,
			"{\"message\":\"Authentication required. Please supply a valid API Access Token\"}",
		))
		.expect("Rejection payload should decode.");

		assert_eq!(
			decoded,
			TokenResponse {
				message: Some(
					"Authentication required. Please supply a valid API Access Token".into()
				),
				..Default::default()
			}
		);
		assert!(!decoded.is_authenticated());
	}

	#[test]
	fn malformed_bodies_report_path_and_status() {
		let err = TokenResponse::decode(&response(200, "{\"scopes\":[\"read_builds\",7]}"))
			.expect_err("Numeric scopes must be rejected.");

		match err {
			Error::ResponseParse { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "scopes[1]");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn null_scopes_decode_as_empty() {
		let decoded = TokenResponse::decode(&response(200, "{\"uuid\":\"u\",\"scopes\":null}"))
			.expect("Null scopes should decode.");

		assert_eq!(decoded.uuid.as_deref(), Some("u"));
		assert!(decoded.scopes.is_empty());
	}

	#[test]
	fn status_line_becomes_message_and_empty_fields_are_omitted() {
		let revoked = TokenResponse::from_status(StatusCode::NO_CONTENT);

		assert_eq!(revoked.message.as_deref(), Some("204 No Content"));
		assert_eq!(
			serde_json::to_string(&revoked).expect("Response should serialize."),
			"{\"message\":\"204 No Content\"}"
		);
	}
}
