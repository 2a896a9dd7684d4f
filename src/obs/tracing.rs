// self
use crate::{_prelude::*, auth::AuthType, request::Method};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder used by facade calls.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided method + stage.
	pub fn new(method: Method, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("apiclient.request", method = method.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Which side of a call a request log line describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogDirection {
	/// Outbound request.
	Request,
	/// Successful response.
	Response,
	/// Failed call.
	Error,
}
impl LogDirection {
	/// Human-readable marker used as the line prefix.
	pub const fn marker(self) -> &'static str {
		match self {
			LogDirection::Request => "[API request  →]",
			LogDirection::Response => "[API response ←]",
			LogDirection::Error => "[API error    ←]",
		}
	}
}

/// Emits one request log line with structured correlation fields.
pub fn trace_request_line(
	direction: LogDirection,
	request_id: Option<u64>,
	method: Method,
	status: Option<u16>,
	line: &str,
) {
	#[cfg(feature = "tracing")]
	{
		let marker = direction.marker();

		match direction {
			LogDirection::Error => tracing::warn!(
				request_id,
				method = method.as_str(),
				status,
				"{marker} {line}"
			),
			_ => tracing::debug!(request_id, method = method.as_str(), status, "{marker} {line}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (direction, request_id, method, status, line);
	}
}

/// Emits a debug event for an auth-gate delivery. The token itself is never logged.
pub fn trace_token_delivery(auth_type: AuthType, present: bool, deliveries: u64) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(auth_type = auth_type.as_str(), present, deliveries, "auth token delivered");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (auth_type, present, deliveries);
	}
}

/// Emits a debug event for a step-timer tick.
pub fn trace_step(scope: Option<&str>, step: u64, current_ms: u64, total_ms: u64, line: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(scope, step, current_ms, total_ms, "{line}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (scope, step, current_ms, total_ms, line);
	}
}
