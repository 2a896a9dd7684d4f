//! Typed verb facade over the pipeline and a transport.

// crates.io
use futures::future;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use crate::{
	_prelude::*,
	auth::{self, AuthFunction, AuthGate, AuthToken, AuthType},
	client::{ClientOptions, ConfigProfile, default_configure},
	error::ConfigError,
	http::HttpTransport,
	interceptor::Pipeline,
	obs::{self, RequestOutcome, RequestSpan},
	request::{Method, RequestConfig, RequestContext, Response},
	resolve::UrlTarget,
};

/// [`RestClient`] specialized for the reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestRestClient = RestClient<ReqwestTransport>;

/// Facade exposing typed verb methods.
///
/// Each client owns its [`Pipeline`] (built once from the configure hook), its [`AuthGate`],
/// and its transport. Clones share all three, including the logging interceptor's correlation
/// counter.
pub struct RestClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	pipeline: Arc<Pipeline>,
	auth: Arc<dyn AuthFunction>,
	gate: Arc<AuthGate>,
	profile: Arc<dyn ConfigProfile>,
	defaults: RequestConfig,
	base_url: Url,
}
#[cfg(feature = "reqwest")]
impl RestClient<ReqwestTransport> {
	/// Builds a client on a fresh reqwest transport.
	pub fn new(options: ClientOptions) -> Result<Self> {
		Ok(Self::with_transport(options, ReqwestTransport::try_new()?))
	}
}
impl<T> RestClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Builds a client on `transport`, running the configure hook once.
	pub fn with_transport(options: ClientOptions, transport: impl Into<Arc<T>>) -> Self {
		let ClientOptions { base_url, configure, auth, gate, profile, defaults } = options;
		let mut pipeline = Pipeline::new();

		match configure {
			Some(configure) => configure(&mut pipeline),
			None => default_configure(&mut pipeline),
		}

		let auth = auth.unwrap_or_else(|| Arc::clone(&gate) as Arc<dyn AuthFunction>);

		Self {
			transport: transport.into(),
			pipeline: Arc::new(pipeline),
			auth,
			gate,
			profile,
			defaults,
			base_url,
		}
	}

	/// Base URL relative targets are joined onto.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Token gate owned by this client.
	pub fn gate(&self) -> &Arc<AuthGate> {
		&self.gate
	}

	/// Pipeline built at construction.
	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	/// Underlying transport.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Delivers a token to this client's gate.
	pub fn deliver_token(&self, auth_type: AuthType, token: Option<AuthToken>) {
		self.gate.deliver_token(auth_type, token);
	}

	/// Awaits the client's auth function for `auth_type`.
	pub async fn authorize(&self, auth_type: AuthType) -> Result<()> {
		self.auth.authorize(auth_type).await
	}

	/// View whose verbs first await the auth function for `auth_type`.
	pub fn authed(&self, auth_type: AuthType) -> Authed<'_, T> {
		Authed { client: self, auth_type }
	}

	/// Sends a `GET`.
	pub async fn get<R>(
		&self,
		target: impl Into<UrlTarget>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Get, target, None, config).await
	}

	/// Sends a `DELETE`.
	pub async fn delete<R>(
		&self,
		target: impl Into<UrlTarget>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Delete, target, None, config).await
	}

	/// Sends an `OPTIONS`.
	pub async fn options<R>(
		&self,
		target: impl Into<UrlTarget>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Options, target, None, config).await
	}

	/// Sends a `POST`. A body serializing to `null` (e.g. `&()`) sends no body.
	pub async fn post<R, B>(
		&self,
		target: impl Into<UrlTarget>,
		body: &B,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Post, target, encode_body(body)?, config).await
	}

	/// Sends a `PUT`. A body serializing to `null` sends no body.
	pub async fn put<R, B>(
		&self,
		target: impl Into<UrlTarget>,
		body: &B,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Put, target, encode_body(body)?, config).await
	}

	/// Sends a `PATCH`. A body serializing to `null` sends no body.
	pub async fn patch<R, B>(
		&self,
		target: impl Into<UrlTarget>,
		body: &B,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Patch, target, encode_body(body)?, config).await
	}

	/// Runs one call through the pipeline and decodes the body into `R`.
	pub async fn request<R>(
		&self,
		method: Method,
		target: impl Into<UrlTarget>,
		body: Option<serde_json::Value>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		let target = target.into();
		let span = RequestSpan::new(method, "request");

		obs::record_request_outcome(method, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.profile.merge_config(self.defaults.clone(), config);
				let context =
					RequestContext::new(method, self.base_url.clone(), target, body, config);
				let (context, raw) = self.pipeline.execute(&*self.transport, context).await?;
				let data = raw.decode::<R>()?;

				Ok::<_, Error>(Response {
					status: raw.status,
					headers: raw.headers,
					data,
					request_id: context.id,
				})
			})
			.await;
		let outcome = if result.is_ok() { RequestOutcome::Success } else { RequestOutcome::Failure };

		obs::record_request_outcome(method, outcome);

		result
	}

	/// Awaits every call, failing fast with the first error.
	pub async fn all<I, F, R>(&self, calls: I) -> Result<Vec<R>>
	where
		I: IntoIterator<Item = F>,
		F: Future<Output = Result<R>>,
	{
		future::try_join_all(calls).await
	}

	/// Awaits every call and returns each outcome in input order.
	pub async fn all_settled<I, F, R>(&self, calls: I) -> Vec<Result<R>>
	where
		I: IntoIterator<Item = F>,
		F: Future<Output = Result<R>>,
	{
		future::join_all(calls).await
	}
}
impl<T> Clone for RestClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			pipeline: Arc::clone(&self.pipeline),
			auth: Arc::clone(&self.auth),
			gate: Arc::clone(&self.gate),
			profile: Arc::clone(&self.profile),
			defaults: self.defaults.clone(),
			base_url: self.base_url.clone(),
		}
	}
}
impl<T> Debug for RestClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RestClient")
			.field("base_url", &self.base_url.as_str())
			.field("pipeline", &self.pipeline)
			.field("gate", &self.gate)
			.field("defaults", &self.defaults)
			.finish_non_exhaustive()
	}
}

/// Verb view of a [`RestClient`] gated on one [`AuthType`].
///
/// Every verb awaits the client's auth function before the pipeline runs; the call is never
/// issued when authorization fails.
pub struct Authed<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a RestClient<T>,
	auth_type: AuthType,
}
impl<T> Authed<'_, T>
where
	T: ?Sized + HttpTransport,
{
	/// Auth type this view waits for.
	pub fn auth_type(&self) -> AuthType {
		self.auth_type
	}

	/// Gated [`RestClient::get`].
	pub async fn get<R>(
		&self,
		target: impl Into<UrlTarget>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Get, target, None, config).await
	}

	/// Gated [`RestClient::delete`].
	pub async fn delete<R>(
		&self,
		target: impl Into<UrlTarget>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Delete, target, None, config).await
	}

	/// Gated [`RestClient::options`].
	pub async fn options<R>(
		&self,
		target: impl Into<UrlTarget>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Options, target, None, config).await
	}

	/// Gated [`RestClient::post`].
	pub async fn post<R, B>(
		&self,
		target: impl Into<UrlTarget>,
		body: &B,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Post, target, encode_body(body)?, config).await
	}

	/// Gated [`RestClient::put`].
	pub async fn put<R, B>(
		&self,
		target: impl Into<UrlTarget>,
		body: &B,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Put, target, encode_body(body)?, config).await
	}

	/// Gated [`RestClient::patch`].
	pub async fn patch<R, B>(
		&self,
		target: impl Into<UrlTarget>,
		body: &B,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Patch, target, encode_body(body)?, config).await
	}

	/// Gated [`RestClient::request`].
	pub async fn request<R>(
		&self,
		method: Method,
		target: impl Into<UrlTarget>,
		body: Option<serde_json::Value>,
		config: Option<RequestConfig>,
	) -> Result<Response<R>>
	where
		R: DeserializeOwned,
	{
		let target = target.into();

		auth::guard(&*self.client.auth, self.auth_type, || {
			self.client.request(method, target, body, config)
		})
		.await
	}
}
impl<T> Debug for Authed<'_, T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authed").field("auth_type", &self.auth_type).finish_non_exhaustive()
	}
}

fn encode_body<B>(body: &B) -> Result<Option<serde_json::Value>>
where
	B: ?Sized + Serialize,
{
	let value = serde_json::to_value(body).map_err(ConfigError::BodySerialize)?;

	Ok((!value.is_null()).then_some(value))
}
