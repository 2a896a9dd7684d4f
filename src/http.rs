//! Transport seam between the interceptor pipeline and an HTTP stack.
//!
//! [`HttpTransport`] is the client's only dependency on a concrete HTTP library. It receives the
//! final [`RequestContext`] (after every request interceptor ran) plus the resolved URL and
//! returns the raw [`TransportResponse`]. Status classification, decoding, and the response and
//! error stages stay in the pipeline, so custom transports (test recorders, other HTTP clients)
//! only move bytes.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{CONTENT_TYPE, HeaderMap};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError, TransportError},
	request::{self, Headers, RequestContext},
};
#[cfg(feature = "reqwest")] use crate::request::Method;

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<TransportResponse>> + 'a + Send>>;

/// Executes one resolved call.
///
/// Implementations must be `Send + Sync + 'static` so a client can share them behind `Arc`
/// across tasks. They should return `Ok` for every HTTP response, whatever its status, and
/// reserve `Err` for calls that produced no response at all.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` to `url`.
	fn send<'a>(&'a self, request: &'a RequestContext, url: &'a Url) -> TransportFuture<'a>;
}

/// Raw response handed back by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: Headers,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Creates a response with no headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: Headers::new(), body: body.into() }
	}

	/// Creates a `200` response carrying `value` as JSON.
	pub fn json<T>(value: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(value).map_err(ConfigError::BodySerialize)?;

		Ok(Self::new(200, body).with_header("content-type", "application/json"))
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		request::insert_header(&mut self.headers, name, value);

		self
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		request::find_header(&self.headers, name)
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Fails with [`TransportError::Status`] for non-2xx statuses, keeping a body preview and the
	/// `Retry-After` hint.
	pub fn ensure_success(&self, url: &Url) -> Result<()> {
		if self.is_success() {
			return Ok(());
		}

		let retry_after = self.header("retry-after").and_then(parse_retry_after);

		Err(TransportError::status(url, self.status, &self.body, retry_after).into())
	}

	/// Decodes the JSON body into `T`; an empty body decodes as `null`.
	pub fn decode<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let bytes: &[u8] = if self.body.is_empty() { b"null" } else { &self.body };
		let mut deserializer = serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError { status: self.status, source }.into())
	}
}

/// Parses a `Retry-After` value given either as delta-seconds or as an HTTP date.
///
/// Dates in the past yield `None`.
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

/// [`HttpTransport`] backed by a shared [`ReqwestClient`].
///
/// JSON bodies are serialized here and sent with `content-type: application/json` unless a
/// request interceptor already set a content type. The per-call timeout from the merged config
/// is applied to the request.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a transport from a fresh client, surfacing TLS backend failures.
	pub fn try_new() -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a RequestContext, url: &'a Url) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut builder = self.0.request(reqwest_method(request.method), url.clone());

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = &request.body {
				let bytes = serde_json::to_vec(body).map_err(ConfigError::BodySerialize)?;

				if request.header(CONTENT_TYPE.as_str()).is_none() {
					builder = builder.header(CONTENT_TYPE, "application/json");
				}

				builder = builder.body(bytes);
			}
			if let Some(timeout) = request.config.timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await.map_err(|e| TransportError::network(url, e))?;
			let status = response.status().as_u16();
			let headers = collect_headers(response.headers());
			let body = response
				.bytes()
				.await
				.map_err(|e| TransportError::network(url, e))?
				.to_vec();

			Ok(TransportResponse { status, headers, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
		Method::Options => reqwest::Method::OPTIONS,
	}
}

#[cfg(feature = "reqwest")]
fn collect_headers(map: &HeaderMap) -> Headers {
	let mut headers = Headers::new();

	for (name, value) in map {
		let Ok(value) = value.to_str() else {
			continue;
		};

		headers
			.entry(name.as_str().to_owned())
			.and_modify(|existing| {
				existing.push_str(", ");
				existing.push_str(value);
			})
			.or_insert_with(|| value.to_owned());
	}

	headers
}
