//! Per-call request model: verbs, per-call configuration, the mutable context that flows through
//! the interceptor pipeline, and the typed response handed back to callers.

// self
use crate::{
	_prelude::*,
	resolve::{self, UrlTarget},
};

/// Header mapping carried by contexts and responses.
pub type Headers = BTreeMap<String, String>;

/// Inserts `name: value`, replacing any existing header whose name matches case-insensitively.
pub fn insert_header(headers: &mut Headers, name: impl Into<String>, value: impl Into<String>) {
	let name = name.into();

	headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
	headers.insert(name, value.into());
}

/// Looks up a header case-insensitively.
pub fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
	headers
		.iter()
		.find(|(existing, _)| existing.eq_ignore_ascii_case(name))
		.map(|(_, value)| value.as_str())
}

/// HTTP verbs exposed by the facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
	/// `OPTIONS`
	Options,
}
impl Method {
	/// Upper-case wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
			Method::Options => "OPTIONS",
		}
	}

	/// Whether the facade verb accepts a body.
	pub const fn has_body(self) -> bool {
		matches!(self, Method::Post | Method::Put | Method::Patch)
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Per-call configuration merged over the client and profile defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConfig {
	/// Extra headers for the call.
	pub headers: Headers,
	/// Query parameters appended to the resolved URL.
	pub query: BTreeMap<String, String>,
	/// Transport timeout for the call.
	pub timeout: Option<StdDuration>,
	/// Base URL override for the call.
	pub base_url: Option<Url>,
}
impl RequestConfig {
	/// Creates an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		insert_header(&mut self.headers, name, value);

		self
	}

	/// Adds or replaces a query parameter.
	pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(name.into(), value.into());

		self
	}

	/// Sets the transport timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the base URL for this call.
	pub fn base_url(mut self, base_url: Url) -> Self {
		self.base_url = Some(base_url);

		self
	}

	/// Layers `overrides` on top of `self`; values present in `overrides` win.
	pub fn merged(mut self, overrides: RequestConfig) -> Self {
		for (name, value) in overrides.headers {
			insert_header(&mut self.headers, name, value);
		}

		self.query.extend(overrides.query);

		if overrides.timeout.is_some() {
			self.timeout = overrides.timeout;
		}
		if overrides.base_url.is_some() {
			self.base_url = overrides.base_url;
		}

		self
	}
}

/// Mutable per-call state handed to every interceptor.
///
/// Created by the facade for one call, threaded through the request stage, read by the
/// transport and the response/error stages, and dropped when the call completes.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestContext {
	/// Correlation id, assigned by the logging interceptor.
	pub id: Option<u64>,
	/// Verb of the call.
	pub method: Method,
	/// Base URL in effect for the call.
	pub base_url: Url,
	/// Target relative to the base URL.
	pub target: UrlTarget,
	/// Outbound headers; interceptors may mutate them.
	pub headers: Headers,
	/// JSON body, if any.
	pub body: Option<serde_json::Value>,
	/// Merged configuration for the call.
	pub config: RequestConfig,
}
impl RequestContext {
	/// Builds a context; the config's base URL override and headers take effect here.
	pub fn new(
		method: Method,
		base_url: Url,
		target: UrlTarget,
		body: Option<serde_json::Value>,
		config: RequestConfig,
	) -> Self {
		let base_url = config.base_url.clone().unwrap_or(base_url);
		let headers = config.headers.clone();

		Self { id: None, method, base_url, target, headers, body, config }
	}

	/// Fully resolved target URL including configured query parameters.
	pub fn full_url(&self) -> Result<Url> {
		resolve::full_url(&self.base_url, &self.target, &self.config.query)
	}

	/// Looks up an outbound header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		find_header(&self.headers, name)
	}

	/// Sets an outbound header, replacing any case-insensitive match.
	pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
		insert_header(&mut self.headers, name, value);
	}

	/// Merges `headers` into the outbound headers; incoming values win.
	pub fn merge_headers(&mut self, headers: Headers) {
		for (name, value) in headers {
			insert_header(&mut self.headers, name, value);
		}
	}
}

/// Typed response returned by facade verbs.
#[derive(Clone, Debug, PartialEq)]
pub struct Response<T> {
	/// HTTP status code.
	pub status: u16,
	/// Response headers (lower-case names when produced by the reqwest transport).
	pub headers: Headers,
	/// Decoded payload.
	pub data: T,
	/// Correlation id assigned to the call, if the logging interceptor is installed.
	pub request_id: Option<u64>,
}
impl<T> Response<T> {
	/// Maps the payload, keeping status and headers.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
		Response {
			status: self.status,
			headers: self.headers,
			data: f(self.data),
			request_id: self.request_id,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.example.com").expect("Fixture base URL should parse.")
	}

	#[test]
	fn header_helpers_are_case_insensitive() {
		let mut headers = Headers::new();

		insert_header(&mut headers, "Content-Type", "text/plain");
		insert_header(&mut headers, "content-type", "application/json");

		assert_eq!(headers.len(), 1);
		assert_eq!(find_header(&headers, "CONTENT-TYPE"), Some("application/json"));
	}

	#[test]
	fn merged_config_prefers_overrides() {
		let defaults = RequestConfig::new()
			.header("Accept", "application/json")
			.header("X-Client", "base")
			.query("page", "1")
			.timeout(StdDuration::from_secs(30));
		let call = RequestConfig::new().header("x-client", "call").query("page", "2");
		let merged = defaults.merged(call);

		assert_eq!(find_header(&merged.headers, "Accept"), Some("application/json"));
		assert_eq!(find_header(&merged.headers, "X-Client"), Some("call"));
		assert_eq!(merged.query.get("page").map(String::as_str), Some("2"));
		assert_eq!(merged.timeout, Some(StdDuration::from_secs(30)));
	}

	#[test]
	fn context_applies_config_base_url_and_headers() {
		let other = Url::parse("https://other.example.com/v2/").expect("Override should parse.");
		let config = RequestConfig::new().header("X-Trace", "1").base_url(other);
		let context =
			RequestContext::new(Method::Get, base(), UrlTarget::from("items"), None, config);

		assert_eq!(context.header("x-trace"), Some("1"));
		assert_eq!(
			context.full_url().expect("Context URL should resolve.").as_str(),
			"https://other.example.com/v2/items"
		);
	}

	#[test]
	fn method_labels_and_body_support() {
		assert_eq!(Method::Patch.to_string(), "PATCH");
		assert!(Method::Put.has_body());
		assert!(!Method::Options.has_body());
	}
}
