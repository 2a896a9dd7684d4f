//! Conditional header injection.

// self
use crate::{
	_prelude::*,
	interceptor::{InterceptFuture, RequestInterceptor},
	request::{Headers, RequestContext},
	resolve::UrlPredicate,
};

/// Boxed future yielding headers to merge.
pub type HeadersFuture = Pin<Box<dyn Future<Output = Result<Headers>> + Send>>;

type HeadersSource = Arc<dyn Fn() -> HeadersFuture + Send + Sync>;

/// Merges headers from a sync or async source into calls whose full URL passes a predicate.
///
/// The source is invoked per call, so it can hand out the latest token or tenant id. URLs the
/// predicate rejects never trigger the source.
#[derive(Clone)]
pub struct HeadersInterceptor {
	name: String,
	headers: HeadersSource,
	url_predicate: UrlPredicate,
}
impl HeadersInterceptor {
	/// Builds the interceptor from a synchronous source.
	pub fn new<F>(headers: F, url_predicate: UrlPredicate) -> Self
	where
		F: 'static + Send + Sync + Fn() -> Headers,
	{
		Self::from_source(
			Arc::new(move || {
				Box::pin(std::future::ready(Ok::<_, Error>(headers()))) as HeadersFuture
			}),
			url_predicate,
		)
	}

	/// Builds the interceptor from an asynchronous source.
	pub fn from_async<F, Fut>(headers: F, url_predicate: UrlPredicate) -> Self
	where
		F: 'static + Send + Sync + Fn() -> Fut,
		Fut: 'static + Send + Future<Output = Headers>,
	{
		Self::try_from_async(
			move || {
				let pending = headers();

				async move { Ok::<_, Error>(pending.await) }
			},
			url_predicate,
		)
	}

	/// Builds the interceptor from a fallible asynchronous source; a failure aborts the call.
	pub fn try_from_async<F, Fut>(headers: F, url_predicate: UrlPredicate) -> Self
	where
		F: 'static + Send + Sync + Fn() -> Fut,
		Fut: 'static + Send + Future<Output = Result<Headers>>,
	{
		Self::from_source(Arc::new(move || Box::pin(headers()) as HeadersFuture), url_predicate)
	}

	/// Overrides the name reported in pipeline errors.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();

		self
	}

	fn from_source(headers: HeadersSource, url_predicate: UrlPredicate) -> Self {
		Self { name: "headers".into(), headers, url_predicate }
	}
}
impl RequestInterceptor for HeadersInterceptor {
	fn name(&self) -> &str {
		&self.name
	}

	fn on_request<'a>(&'a self, context: &'a mut RequestContext) -> InterceptFuture<'a> {
		Box::pin(async move {
			let url = context.full_url()?;

			if (self.url_predicate)(url.as_str()) {
				let headers = (self.headers)().await?;

				context.merge_headers(headers);
			}

			Ok(())
		})
	}
}
impl Debug for HeadersInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HeadersInterceptor").field("name", &self.name).finish_non_exhaustive()
	}
}
