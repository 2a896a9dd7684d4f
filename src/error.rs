//! Client-level error types shared across the facade, pipeline, transport, and auth gate.

// self
use crate::{_prelude::*, auth::AuthType, interceptor::Stage};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Underlying call failed or returned a non-2xx status.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// An interceptor rejected or failed while processing the call.
	#[error(transparent)]
	Pipeline(#[from] PipelineError),
	/// Response payload could not be decoded into the requested type.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// A raced operation did not finish before its deadline.
	#[error("Timed out after {after:?} waiting for a result.")]
	TimedOut {
		/// Deadline that elapsed.
		after: StdDuration,
	},
	/// The auth gate was armed without a token while a token was required.
	#[error("No token is available for the `{auth_type}` auth type.")]
	AuthTokenUnavailable {
		/// Auth type whose token was requested.
		auth_type: AuthType,
	},
	/// An interceptor refused to let the call proceed.
	#[error("Request was rejected: {reason}.")]
	Rejected {
		/// Interceptor-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Convenience constructor for interceptors that refuse a call.
	pub fn rejected(reason: impl Into<String>) -> Self {
		Self::Rejected { reason: reason.into() }
	}

	/// HTTP status attached to the fault, when the transport produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport(TransportError::Status { status, .. }) => Some(*status),
			Self::Decode(DecodeError { status, .. }) => Some(*status),
			Self::Pipeline(PipelineError { source, .. }) => source.status(),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending base URL.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL does not use HTTP or HTTPS.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending base URL.
		url: String,
	},
	/// Request target could not be resolved against the base URL.
	#[error("Request target `{target}` cannot be resolved.")]
	InvalidTarget {
		/// Offending target.
		target: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot carry path segments (e.g. `mailto:` or `data:` URLs).
	#[error("URL `{url}` cannot be a base for path segments.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[source] serde_json::Error),
	/// Client settings could not be parsed.
	#[error("Client settings are invalid.")]
	InvalidSettings {
		/// Structured parsing failure naming the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Header name or value is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, unsuccessful status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL of the failed call.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Upstream answered with a non-2xx status.
	#[error("Request to {url} failed with HTTP {status}.")]
	Status {
		/// Target URL of the failed call.
		url: String,
		/// HTTP status code.
		status: u16,
		/// Preview of the response body.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
}
impl TransportError {
	const BODY_PREVIEW_LIMIT: usize = 512;

	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}

	/// Builds a status fault, truncating the body preview on a char boundary.
	pub fn status(
		url: &Url,
		status: u16,
		body: &[u8],
		retry_after: Option<Duration>,
	) -> Self {
		let text = String::from_utf8_lossy(body);
		let body = match text.char_indices().nth(Self::BODY_PREVIEW_LIMIT) {
			Some((idx, _)) => text[..idx].to_owned(),
			None => text.into_owned(),
		};

		Self::Status { url: url.to_string(), status, body, retry_after }
	}
}

/// Failure raised by an interceptor, tagged with where it happened.
#[derive(Debug, ThisError)]
#[error("Interceptor `{interceptor}` failed during the {stage} stage.")]
pub struct PipelineError {
	/// Stage the interceptor was registered on.
	pub stage: Stage,
	/// Name of the failing interceptor.
	pub interceptor: String,
	/// Original failure.
	#[source]
	pub source: Box<Error>,
}

/// Response body did not match the requested shape.
#[derive(Debug, ThisError)]
#[error("Response from HTTP {status} could not be decoded.")]
pub struct DecodeError {
	/// HTTP status of the decoded response.
	pub status: u16,
	/// Structured parsing failure naming the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}
