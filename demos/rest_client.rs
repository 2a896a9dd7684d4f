//! Demonstrates a reqwest-backed client whose authed calls wait for a token delivered later,
//! with bearer and language headers injected by interceptors.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
// self
use apiclient::{
	auth::{AuthGate, AuthState, AuthType},
	client::{ClientOptions, ReqwestRestClient, default_configure},
	interceptor::{HeadersInterceptor, LanguageInterceptor},
	request::Headers,
	resolve::{self, TrustedHosts},
	timing::StepTimer,
};

#[derive(Debug, Deserialize)]
struct Profile {
	name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let mut timer = StepTimer::new(Some("demo"));
	let server = MockServer::start_async().await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/me")
				.header("authorization", "Bearer demo-token")
				.header("accept-language", "en-ZA, en;q=0.67, *;q=0.33");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"name\":\"Demo User\"}");
		})
		.await;
	let gate = Arc::new(AuthGate::new());
	let header_gate = Arc::clone(&gate);
	let options = ClientOptions::builder(server.base_url())
		.gate(Arc::clone(&gate))
		.timeout(Duration::from_secs(5))
		.configure(move |pipeline| {
			default_configure(pipeline);
			pipeline
				.use_request(HeadersInterceptor::new(
					move || match header_gate.state(AuthType::User) {
						AuthState::Armed(Some(token)) => Headers::from([(
							"Authorization".to_owned(),
							format!("Bearer {}", token.expose()),
						)]),
						_ => Headers::new(),
					},
					TrustedHosts::new(["127.0.0.1", "localhost"]).into_predicate(),
				))
				.use_request(LanguageInterceptor::new(
					|| vec!["en-ZA".into(), "en".into()],
					resolve::always(),
				));
		})
		.build()?;
	let client = ReqwestRestClient::new(options)?;
	let pending = tokio::spawn({
		let client = client.clone();

		async move { client.authed(AuthType::User).get::<Profile>("me", None).await }
	});

	println!("{}", timer.step(Some("client ready")));

	client.deliver_token(AuthType::User, Some("demo-token".into()));

	let profile = pending.await??;

	println!("{}", timer.step(Some("profile fetched")));
	println!("Signed in as {} (request {:?}).", profile.data.name, profile.request_id);

	profile_mock.assert_async().await;

	Ok(())
}
