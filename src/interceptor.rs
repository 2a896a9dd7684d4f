//! Ordered interceptor pipeline.
//!
//! A [`Pipeline`] keeps three independent stages. Request interceptors run in registration order
//! and may mutate the [`RequestContext`] before the transport sees it. Response interceptors run
//! in registration order on successful (2xx) responses. Error interceptors observe any failure
//! raised by the other stages, the transport, or a non-2xx status; they cannot recover it, and
//! the original error is re-raised to the caller once they ran.

pub mod headers;
pub mod language;
pub mod logging;

pub use headers::*;
pub use language::*;
pub use logging::*;

// self
use crate::{
	_prelude::*,
	error::PipelineError,
	http::{HttpTransport, TransportResponse},
	request::RequestContext,
};

/// Boxed future returned by request and response interceptors.
pub type InterceptFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Stage an interceptor is registered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Before the transport call.
	Request,
	/// After a successful response.
	Response,
	/// After any failure.
	Error,
}
impl Stage {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Request => "request",
			Stage::Response => "response",
			Stage::Error => "error",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Transforms a call before it is sent.
pub trait RequestInterceptor
where
	Self: Send + Sync,
{
	/// Name reported in [`PipelineError`]s.
	fn name(&self) -> &str;

	/// Mutates `context`; an error aborts the call before the transport runs.
	fn on_request<'a>(&'a self, context: &'a mut RequestContext) -> InterceptFuture<'a>;
}

/// Observes or rewrites successful responses.
pub trait ResponseInterceptor
where
	Self: Send + Sync,
{
	/// Name reported in [`PipelineError`]s.
	fn name(&self) -> &str;

	/// Inspects `response`; an error turns the call into a failure.
	fn on_response<'a>(
		&'a self,
		context: &'a RequestContext,
		response: &'a mut TransportResponse,
	) -> InterceptFuture<'a>;
}

/// Observes failures. Cannot replace or swallow the error.
pub trait ErrorInterceptor
where
	Self: Send + Sync,
{
	/// Name used in diagnostics.
	fn name(&self) -> &str;

	/// Called once per failed call with the error about to be re-raised.
	fn on_error(&self, context: &RequestContext, error: &Error);
}

/// Adapter turning a synchronous closure into a [`RequestInterceptor`].
pub struct FnRequestInterceptor<F> {
	name: String,
	f: F,
}
impl<F> RequestInterceptor for FnRequestInterceptor<F>
where
	F: Send + Sync + Fn(&mut RequestContext) -> Result<()>,
{
	fn name(&self) -> &str {
		&self.name
	}

	fn on_request<'a>(&'a self, context: &'a mut RequestContext) -> InterceptFuture<'a> {
		Box::pin(std::future::ready((self.f)(context)))
	}
}

/// Adapter turning a closure into an [`ErrorInterceptor`].
pub struct FnErrorInterceptor<F> {
	name: String,
	f: F,
}
impl<F> ErrorInterceptor for FnErrorInterceptor<F>
where
	F: Send + Sync + Fn(&RequestContext, &Error),
{
	fn name(&self) -> &str {
		&self.name
	}

	fn on_error(&self, context: &RequestContext, error: &Error) {
		(self.f)(context, error)
	}
}

/// Three ordered interceptor stages bound to one client.
#[derive(Clone, Default)]
pub struct Pipeline {
	request: Vec<Arc<dyn RequestInterceptor>>,
	response: Vec<Arc<dyn ResponseInterceptor>>,
	error: Vec<Arc<dyn ErrorInterceptor>>,
}
impl Pipeline {
	/// Creates an empty pipeline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a request interceptor.
	pub fn use_request<I>(&mut self, interceptor: I) -> &mut Self
	where
		I: 'static + RequestInterceptor,
	{
		self.request.push(Arc::new(interceptor));

		self
	}

	/// Appends a response interceptor.
	pub fn use_response<I>(&mut self, interceptor: I) -> &mut Self
	where
		I: 'static + ResponseInterceptor,
	{
		self.response.push(Arc::new(interceptor));

		self
	}

	/// Appends an error interceptor.
	pub fn use_error<I>(&mut self, interceptor: I) -> &mut Self
	where
		I: 'static + ErrorInterceptor,
	{
		self.error.push(Arc::new(interceptor));

		self
	}

	/// Appends a synchronous closure to the request stage.
	pub fn on_request_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(&mut RequestContext) -> Result<()>,
	{
		self.use_request(FnRequestInterceptor { name: name.into(), f })
	}

	/// Appends a closure to the error stage.
	pub fn on_error_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn(&RequestContext, &Error),
	{
		self.use_error(FnErrorInterceptor { name: name.into(), f })
	}

	/// Names registered on `stage`, in execution order.
	pub fn names(&self, stage: Stage) -> Vec<&str> {
		match stage {
			Stage::Request => self.request.iter().map(|i| i.name()).collect(),
			Stage::Response => self.response.iter().map(|i| i.name()).collect(),
			Stage::Error => self.error.iter().map(|i| i.name()).collect(),
		}
	}

	/// Runs the request stage in registration order, stopping at the first failure.
	pub async fn run_request(&self, context: &mut RequestContext) -> Result<()> {
		for interceptor in &self.request {
			interceptor
				.on_request(context)
				.await
				.map_err(|e| wrap(Stage::Request, interceptor.name(), e))?;
		}

		Ok(())
	}

	/// Runs the response stage in registration order, stopping at the first failure.
	pub async fn run_response(
		&self,
		context: &RequestContext,
		response: &mut TransportResponse,
	) -> Result<()> {
		for interceptor in &self.response {
			interceptor
				.on_response(context, response)
				.await
				.map_err(|e| wrap(Stage::Response, interceptor.name(), e))?;
		}

		Ok(())
	}

	/// Notifies every error interceptor in registration order.
	pub fn run_error(&self, context: &RequestContext, error: &Error) {
		for interceptor in &self.error {
			interceptor.on_error(context, error);
		}
	}

	/// Drives one call through every stage and `transport`.
	///
	/// Returns the final context alongside the response so callers can read the correlation id.
	pub async fn execute<T>(
		&self,
		transport: &T,
		mut context: RequestContext,
	) -> Result<(RequestContext, TransportResponse)>
	where
		T: ?Sized + HttpTransport,
	{
		match self.drive(transport, &mut context).await {
			Ok(response) => Ok((context, response)),
			Err(e) => {
				self.run_error(&context, &e);

				Err(e)
			},
		}
	}

	async fn drive<T>(&self, transport: &T, context: &mut RequestContext) -> Result<TransportResponse>
	where
		T: ?Sized + HttpTransport,
	{
		self.run_request(context).await?;

		let url = context.full_url()?;
		let mut response = transport.send(context, &url).await?;

		response.ensure_success(&url)?;

		self.run_response(context, &mut response).await?;

		Ok(response)
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline")
			.field("request", &self.names(Stage::Request))
			.field("response", &self.names(Stage::Response))
			.field("error", &self.names(Stage::Error))
			.finish()
	}
}

fn wrap(stage: Stage, interceptor: &str, source: Error) -> Error {
	PipelineError { stage, interceptor: interceptor.to_owned(), source: Box::new(source) }.into()
}
