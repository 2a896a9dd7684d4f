// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
// self
use apiclient::{
	auth::{AuthType, auth_fn},
	client::{ClientOptions, ClientOptionsBuilder, RestClient, default_configure},
	error::{Error, TransportError},
	http::{HttpTransport, TransportFuture, TransportResponse},
	interceptor::HeadersInterceptor,
	request::{Headers, Method, RequestConfig, RequestContext},
	resolve::{self, UrlTarget},
	url::Url,
};

#[derive(Default)]
struct RecordingTransport {
	sent: Mutex<Vec<(RequestContext, Url)>>,
}
impl RecordingTransport {
	fn sent(&self) -> Vec<(RequestContext, Url)> {
		self.sent.lock().clone()
	}
}
impl HttpTransport for RecordingTransport {
	fn send<'a>(&'a self, request: &'a RequestContext, url: &'a Url) -> TransportFuture<'a> {
		if request.header("x-fail").is_some() {
			let err = TransportError::network(url, std::io::Error::other("connection reset"));

			return Box::pin(async move { Err(err.into()) });
		}

		self.sent.lock().push((request.clone(), url.clone()));

		let echo = json!({ "path": url.path(), "body": request.body });

		Box::pin(async move { TransportResponse::json(&echo) })
	}
}

#[derive(Debug, Deserialize, PartialEq)]
struct Echo {
	path: String,
	body: Option<Value>,
}

fn app_headers() -> Headers {
	Headers::from([("X-App".to_owned(), "demo".to_owned())])
}

fn client(options: ClientOptionsBuilder) -> (RestClient<RecordingTransport>, Arc<RecordingTransport>) {
	let transport = Arc::new(RecordingTransport::default());
	let options = options.build().expect("Options should build.");

	(RestClient::with_transport(options, Arc::clone(&transport)), transport)
}

#[tokio::test]
async fn authed_post_carries_global_headers_and_first_correlation_id() {
	let (client, transport) = client(
		ClientOptions::builder("https://api.example.com")
			.auth(auth_fn(|_| async { Ok::<_, Error>(()) }))
			.configure(|pipeline| {
				default_configure(pipeline);
				pipeline.use_request(HeadersInterceptor::new(app_headers, resolve::always()));
			}),
	);
	let response = client
		.authed(AuthType::User)
		.post::<Echo, _>("/items", &json!({ "x": 1 }), None)
		.await
		.expect("Authed post should succeed.");
	let sent = transport.sent();
	let (context, url) = &sent[0];

	assert_eq!(sent.len(), 1);
	assert_eq!(url.as_str(), "https://api.example.com/items");
	assert_eq!(context.method, Method::Post);
	assert_eq!(context.header("x-app"), Some("demo"));
	assert_eq!(context.body, Some(json!({ "x": 1 })));
	assert_eq!(context.id, Some(0));
	assert_eq!(response.request_id, Some(0));
	assert_eq!(response.data, Echo { path: "/items".into(), body: Some(json!({ "x": 1 })) });
}

#[tokio::test]
async fn authed_calls_wait_for_the_gate() {
	let (client, transport) = client(ClientOptions::builder("https://api.example.com/v1"));
	let call = tokio::spawn({
		let client = client.clone();

		async move { client.authed(AuthType::Owner).get::<Echo>("me", None).await }
	});

	tokio::task::yield_now().await;

	assert!(transport.sent().is_empty());

	client.deliver_token(AuthType::Owner, Some("owner-token".into()));

	let response = call.await.expect("Task should join.").expect("Gated get should succeed.");

	assert_eq!(response.data.path, "/v1/me");
	assert_eq!(transport.sent().len(), 1);

	// `none` calls never wait.
	client
		.authed(AuthType::None)
		.delete::<Echo>(UrlTarget::segments(["items", "a/b"]), None)
		.await
		.expect("Ungated delete should succeed.");

	assert_eq!(transport.sent()[1].1.path(), "/v1/items/a%2Fb");
}

#[tokio::test]
async fn failed_auth_never_reaches_the_transport() {
	let (client, transport) = client(ClientOptions::builder("https://api.example.com").auth(
		auth_fn(|auth_type| async move { Err::<(), _>(Error::AuthTokenUnavailable { auth_type }) }),
	));
	let err = client
		.authed(AuthType::User)
		.put::<Echo, _>("items/1", &json!({}), None)
		.await
		.expect_err("Failed auth should abort the call.");

	assert!(matches!(err, Error::AuthTokenUnavailable { auth_type: AuthType::User }));
	assert!(transport.sent().is_empty());

	client.get::<Echo>("items/1", None).await.expect("Plain verbs do not consult auth.");
}

#[tokio::test]
async fn per_call_config_overrides_defaults() {
	let (client, transport) = client(
		ClientOptions::builder("https://api.example.com")
			.header("X-Client", "default")
			.header("Accept", "application/json"),
	);
	let config = RequestConfig::new()
		.header("x-client", "override")
		.query("page", "2")
		.base_url(Url::parse("https://other.example.com/v2/").expect("Override should parse."));

	client.post::<Echo, _>("items", &(), Some(config)).await.expect("Post should succeed.");

	let (context, url) = &transport.sent()[0];

	assert_eq!(url.as_str(), "https://other.example.com/v2/items?page=2");
	assert_eq!(context.header("X-Client"), Some("override"));
	assert_eq!(context.header("accept"), Some("application/json"));
	assert_eq!(context.body, None);
}

#[tokio::test]
async fn all_and_all_settled_keep_input_order() {
	let (client, _) = client(ClientOptions::builder("https://api.example.com"));
	let paths = client
		.all(["a", "b", "c"].map(|path| client.get::<Echo>(path, None)))
		.await
		.expect("Every call should succeed.")
		.into_iter()
		.map(|response| response.data.path)
		.collect::<Vec<_>>();

	assert_eq!(paths, ["/a", "/b", "/c"]);

	let settled = client
		.all_settled(vec![
			client.get::<Echo>("ok", None),
			client.get::<Echo>("boom", Some(RequestConfig::new().header("x-fail", "1"))),
			client.get::<Echo>("still-ok", None),
		])
		.await;

	assert_eq!(settled.len(), 3);
	assert!(settled[0].is_ok());
	assert!(matches!(settled[1], Err(Error::Transport(TransportError::Network { .. }))));
	assert_eq!(settled[2].as_ref().map(|response| response.data.path.as_str()).ok(), Some("/still-ok"));

	let failing = RequestConfig::new().header("x-fail", "1");
	let err = client
		.all([client.get::<Echo>("ok", None), client.get::<Echo>("boom", Some(failing))])
		.await
		.expect_err("One failure should fail the batch.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}

#[cfg(feature = "reqwest")]
mod reqwest_transport {
	// crates.io
	use httpmock::prelude::*;
	// self
	use super::*;
	use apiclient::{client::JsonProfile, error::DecodeError};

	#[derive(Debug, Deserialize, PartialEq)]
	struct Item {
		id: u32,
		name: String,
	}

	fn options(server: &MockServer) -> ClientOptionsBuilder {
		ClientOptions::builder(server.base_url())
	}

	#[tokio::test]
	async fn get_decodes_typed_payloads() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path("/items/7").query_param("expand", "true");
				then.status(200)
					.header("content-type", "application/json")
					.json_body(json!({ "id": 7, "name": "seven" }));
			})
			.await;
		let client = RestClient::new(options(&server).build().expect("Options should build."))
			.expect("Client should build.");
		let response = client
			.get::<Item>("items/7", Some(RequestConfig::new().query("expand", "true")))
			.await
			.expect("Get should succeed.");

		mock.assert_async().await;

		assert_eq!(response.status, 200);
		assert_eq!(response.data, Item { id: 7, name: "seven".into() });
		assert_eq!(response.headers.get("content-type").map(String::as_str), Some("application/json"));
	}

	#[tokio::test]
	async fn post_sends_json_through_the_profile() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(POST)
					.path("/items")
					.header("content-type", "application/json")
					.header("accept", "application/json")
					.json_body(json!({ "name": "new" }));
				then.status(201).json_body(json!({ "id": 1, "name": "new" }));
			})
			.await;
		let client = RestClient::new(
			options(&server).profile(JsonProfile).build().expect("Options should build."),
		)
		.expect("Client should build.");
		let response = client
			.post::<Item, _>("/items", &json!({ "name": "new" }), None)
			.await
			.expect("Post should succeed.");

		mock.assert_async().await;

		assert_eq!(response.status, 201);
		assert_eq!(response.data.id, 1);
	}

	#[tokio::test]
	async fn error_statuses_surface_body_and_retry_hint() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(DELETE).path("/items/9");
				then.status(429).header("retry-after", "30").body("slow down");
			})
			.await;
		let client = RestClient::new(options(&server).build().expect("Options should build."))
			.expect("Client should build.");
		let err = client
			.delete::<Value>("items/9", None)
			.await
			.expect_err("429 should be reported as an error.");

		mock.assert_async().await;

		match err {
			Error::Transport(TransportError::Status { status, body, retry_after, .. }) => {
				assert_eq!(status, 429);
				assert_eq!(body, "slow down");
				assert_eq!(retry_after, Some(time::Duration::seconds(30)));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[tokio::test]
	async fn mismatched_payloads_name_the_json_path() {
		let server = MockServer::start_async().await;

		server
			.mock_async(|when, then| {
				when.method(GET).path("/items/1");
				then.status(200).json_body(json!({ "id": "one", "name": "x" }));
			})
			.await;

		let client = RestClient::new(options(&server).build().expect("Options should build."))
			.expect("Client should build.");
		let err = client.get::<Item>("items/1", None).await.expect_err("Decoding should fail.");

		match err {
			Error::Decode(DecodeError { status, source }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "id");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
