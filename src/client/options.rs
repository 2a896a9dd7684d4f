//! Client construction options, validated before a client exists.

// self
use crate::{
	_prelude::*,
	auth::{AuthFunction, AuthGate},
	client::{ConfigProfile, DefaultProfile},
	error::ConfigError,
	interceptor::{LoggingInterceptor, Pipeline},
	request::{self, Headers, RequestConfig},
};

/// Hook that registers interceptors on a new client's pipeline.
pub type Configure = Box<dyn FnOnce(&mut Pipeline) + Send>;

/// Pipeline setup used when no [`Configure`] hook is given: installs a [`LoggingInterceptor`]
/// on all three stages.
///
/// Custom hooks may call this first to keep request logging.
pub fn default_configure(pipeline: &mut Pipeline) {
	LoggingInterceptor::new().install(pipeline);
}

/// Validated options consumed by [`RestClient`](crate::client::RestClient).
pub struct ClientOptions {
	/// Base URL every relative target is joined onto.
	pub base_url: Url,
	/// Pipeline hook; [`default_configure`] when absent.
	pub configure: Option<Configure>,
	/// Auth function awaited by guarded calls; the gate itself when absent.
	pub auth: Option<Arc<dyn AuthFunction>>,
	/// Token gate owned by the client.
	pub gate: Arc<AuthGate>,
	/// Default-configuration profile.
	pub profile: Arc<dyn ConfigProfile>,
	/// Client-wide defaults (headers, timeout) layered under the profile and call config.
	pub defaults: RequestConfig,
}
impl ClientOptions {
	/// Starts a builder for `base_url`.
	pub fn builder(base_url: impl Into<String>) -> ClientOptionsBuilder {
		ClientOptionsBuilder::new(base_url)
	}
}
impl Debug for ClientOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientOptions")
			.field("base_url", &self.base_url.as_str())
			.field("configure", &self.configure.is_some())
			.field("auth", &self.auth.is_some())
			.field("gate", &self.gate)
			.field("defaults", &self.defaults)
			.finish_non_exhaustive()
	}
}

/// Builder for [`ClientOptions`].
pub struct ClientOptionsBuilder {
	/// Unvalidated base URL.
	pub base_url: String,
	/// Optional pipeline hook.
	pub configure: Option<Configure>,
	/// Optional auth function.
	pub auth: Option<Arc<dyn AuthFunction>>,
	/// Optional shared gate; a fresh one is created otherwise.
	pub gate: Option<Arc<AuthGate>>,
	/// Optional profile; [`DefaultProfile`] otherwise.
	pub profile: Option<Arc<dyn ConfigProfile>>,
	/// Default headers sent with every call.
	pub headers: Headers,
	/// Default transport timeout.
	pub timeout: Option<StdDuration>,
}
impl ClientOptionsBuilder {
	/// Creates a builder seeded with `base_url`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			configure: None,
			auth: None,
			gate: None,
			profile: None,
			headers: Headers::new(),
			timeout: None,
		}
	}

	/// Sets the pipeline hook.
	pub fn configure<F>(mut self, configure: F) -> Self
	where
		F: 'static + Send + FnOnce(&mut Pipeline),
	{
		self.configure = Some(Box::new(configure));

		self
	}

	/// Sets the auth function awaited before guarded calls.
	pub fn auth<A>(mut self, auth: A) -> Self
	where
		A: 'static + AuthFunction,
	{
		self.auth = Some(Arc::new(auth));

		self
	}

	/// Shares an existing gate, e.g. across clients of one application.
	pub fn gate(mut self, gate: Arc<AuthGate>) -> Self {
		self.gate = Some(gate);

		self
	}

	/// Sets the default-configuration profile.
	pub fn profile<P>(mut self, profile: P) -> Self
	where
		P: 'static + ConfigProfile,
	{
		self.profile = Some(Arc::new(profile));

		self
	}

	/// Adds a default header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		request::insert_header(&mut self.headers, name, value);

		self
	}

	/// Sets the default transport timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the base URL and default headers.
	pub fn build(self) -> Result<ClientOptions, ConfigError> {
		let base_url = validate_base_url(&self.base_url)?;

		for (name, value) in &self.headers {
			validate_header(name, value)?;
		}

		let defaults =
			RequestConfig { headers: self.headers, timeout: self.timeout, ..Default::default() };

		Ok(ClientOptions {
			base_url,
			configure: self.configure,
			auth: self.auth,
			gate: self.gate.unwrap_or_default(),
			profile: self.profile.unwrap_or_else(|| Arc::new(DefaultProfile)),
			defaults,
		})
	}
}
impl Debug for ClientOptionsBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientOptionsBuilder")
			.field("base_url", &self.base_url)
			.field("configure", &self.configure.is_some())
			.field("auth", &self.auth.is_some())
			.field("headers", &self.headers)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

/// Serializable client settings, e.g. loaded from a config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
	/// Base URL of the API.
	pub base_url: String,
	/// Default timeout in milliseconds.
	#[serde(default)]
	pub timeout_ms: Option<u64>,
	/// Default headers.
	#[serde(default)]
	pub headers: Headers,
}
impl ClientSettings {
	/// Parses settings from JSON, naming the offending field on failure.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::InvalidSettings { source })
	}

	/// Converts the settings into a builder so hooks and auth can still be attached.
	pub fn into_builder(self) -> ClientOptionsBuilder {
		let mut builder = ClientOptionsBuilder::new(self.base_url);

		builder.headers = self.headers;
		builder.timeout = self.timeout_ms.map(StdDuration::from_millis);

		builder
	}
}

fn validate_base_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw)
		.map_err(|source| ConfigError::InvalidBaseUrl { url: raw.to_owned(), source })?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme { url: raw.to_owned() });
	}
	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { url: raw.to_owned() });
	}

	Ok(url)
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
	let name_ok = !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b':');
	let value_ok = value.bytes().all(|b| b == b'\t' || !b.is_ascii_control());

	if name_ok && value_ok {
		Ok(())
	} else {
		Err(ConfigError::InvalidHeader { name: name.to_owned() })
	}
}
