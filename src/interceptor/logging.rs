//! Request/response logging with per-client correlation ids.

// self
use crate::{
	_prelude::*,
	http::TransportResponse,
	interceptor::{
		ErrorInterceptor, InterceptFuture, Pipeline, RequestInterceptor, ResponseInterceptor,
	},
	obs::{self, LogDirection},
	request::RequestContext,
};

/// Assigns each call a correlation id and logs it on every stage.
///
/// Ids start at `0` and increase by one per call passing the request stage of this instance.
/// Clones share the counter, which is how [`install`](Self::install) registers one instance on
/// all three stages.
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor {
	issued: Arc<AtomicU64>,
}
impl LoggingInterceptor {
	/// Creates an interceptor whose next id is `0`.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of ids handed out so far.
	pub fn issued(&self) -> u64 {
		self.issued.load(Ordering::SeqCst)
	}

	/// Registers this interceptor on the request, response, and error stages.
	pub fn install(self, pipeline: &mut Pipeline) {
		pipeline.use_request(self.clone()).use_response(self.clone()).use_error(self);
	}
}
impl RequestInterceptor for LoggingInterceptor {
	fn name(&self) -> &str {
		"logging"
	}

	fn on_request<'a>(&'a self, context: &'a mut RequestContext) -> InterceptFuture<'a> {
		context.id = Some(self.issued.fetch_add(1, Ordering::SeqCst));

		obs::trace_request_line(
			LogDirection::Request,
			context.id,
			context.method,
			None,
			&display_request(context, None),
		);

		Box::pin(std::future::ready(Ok(())))
	}
}
impl ResponseInterceptor for LoggingInterceptor {
	fn name(&self) -> &str {
		"logging"
	}

	fn on_response<'a>(
		&'a self,
		context: &'a RequestContext,
		response: &'a mut TransportResponse,
	) -> InterceptFuture<'a> {
		let status = Some(response.status);

		obs::trace_request_line(
			LogDirection::Response,
			context.id,
			context.method,
			status,
			&display_request(context, status),
		);

		Box::pin(std::future::ready(Ok(())))
	}
}
impl ErrorInterceptor for LoggingInterceptor {
	fn name(&self) -> &str {
		"logging"
	}

	fn on_error(&self, context: &RequestContext, error: &Error) {
		let status = error.status();

		obs::trace_request_line(
			LogDirection::Error,
			context.id,
			context.method,
			status,
			&format!("{} {error}", display_request(context, status)),
		);
	}
}

/// Formats `(id) METHOD status url`, with `-` for a missing status and no id prefix when the
/// call has none.
pub fn display_request(context: &RequestContext, status: Option<u16>) -> String {
	let id = context.id.map(|id| format!("({id}) ")).unwrap_or_default();
	let status = status.map(|status| status.to_string()).unwrap_or_else(|| "-".into());
	let url = context
		.full_url()
		.map(String::from)
		.unwrap_or_else(|_| format!("{}{}", context.base_url, context.target));

	format!("{id}{} {status} {url}", context.method)
}
