//! Demonstrates inspecting and revoking a token with request logging enabled.
//!
//! The demo talks to the real API when `BUILDKITE_API_TOKEN` is set (and `BUILDKITE_API_HOST`,
//! `BUILDKITE_DEBUG`, `BUILDKITE_TIMEOUT_SECS` are honored); otherwise it stands up a local mock
//! so it can run offline. Revocation only runs against the mock.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use buildkite_token::{
	client::Client,
	config::{ClientConfig, ENV_API_TOKEN},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

	if std::env::var_os(ENV_API_TOKEN).is_some() {
		let client = Client::from_env()?;
		let response = client.token_scopes().await?;

		println!("Token {:?} grants: {}.", response.uuid, response.scopes.join(", "));

		return Ok(());
	}

	let server = MockServer::start_async().await;
	let scopes_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/access-token")
				.header("authorization", "Bearer demo-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"uuid\":\"demo-uuid\",\"scopes\":[\"read_builds\",\"read_user\"]}");
		})
		.await;
	let revoke_mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/v2/access-token");
			then.status(204);
		})
		.await;
	let config =
		ClientConfig::builder("demo-token").host_str(server.url("/v2")).debug(true).build()?;
	let client = Client::from_config(config)?;
	let response = client.token_scopes().await?;

	println!("Mock token grants: {}.", response.scopes.join(", "));

	let revoked = client.revoke_token().await?;

	println!("Revocation answered: {}.", revoked.message.unwrap_or_default());

	scopes_mock.assert_async().await;
	revoke_mock.assert_async().await;

	Ok(())
}
