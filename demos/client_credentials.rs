//! Demonstrates a token manager backed by the default reqwest transport: one exchange serves
//! concurrent callers, later calls reuse the cached token, and an [`AuthConfig`] signs API
//! requests.
//!
//! [`AuthConfig`]: datto_rmm_auth::ext::AuthConfig

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use datto_rmm_auth::{
	auth::ClientCredentials, http::ReqwestHttpClient, manager::ReqwestTokenManager,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/account").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("{\"name\":\"demo\"}");
		})
		.await;
	// The mock server uses a self-signed certificate; never do this against a real platform.
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let manager = ReqwestTokenManager::with_http_client(
		ClientCredentials::new("demo-api-key", "demo-api-secret"),
		server.url("/token"),
		ReqwestHttpClient::with_client(client.clone()),
	)?;
	let (first, second) = tokio::join!(manager.get_token(), manager.get_token());

	println!("Concurrent callers received: {} and {}.", first?.expose(), second?.expose());

	let auth = manager.to_auth_config().with_on_auth_error(|failure| {
		eprintln!("API rejected the bearer token: {failure}");
	});
	let response = auth.sign(client.get(server.url("/api/v2/account"))).await?.send().await?;

	if let Some(failure) = auth.inspect_response(&response) {
		eprintln!("Clearing the cached token after {failure}");

		manager.clear_token();
	} else {
		println!("Account lookup returned HTTP {}.", response.status());
	}

	println!(
		"Exchanges: {}, cache hits: {}, joins: {}.",
		manager.metrics().exchanges(),
		manager.metrics().cache_hits(),
		manager.metrics().joins()
	);

	token_mock.assert_async().await;
	api_mock.assert_async().await;

	Ok(())
}
