//! `Accept-Language` negotiation.

// self
use crate::{
	_prelude::*,
	i18n,
	interceptor::{InterceptFuture, RequestInterceptor},
	request::RequestContext,
	resolve::UrlPredicate,
};

type LanguagesSource = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

/// Sets a weighted `Accept-Language` header on calls whose full URL passes a predicate.
///
/// The language list is read on every call. An empty list leaves the header untouched.
#[derive(Clone)]
pub struct LanguageInterceptor {
	current_languages: LanguagesSource,
	url_predicate: UrlPredicate,
}
impl LanguageInterceptor {
	/// Header written by this interceptor.
	pub const HEADER: &'static str = "Accept-Language";

	/// Builds the interceptor from a language source, most preferred first.
	pub fn new<F>(current_languages: F, url_predicate: UrlPredicate) -> Self
	where
		F: 'static + Send + Sync + Fn() -> Vec<String>,
	{
		Self { current_languages: Arc::new(current_languages), url_predicate }
	}
}
impl RequestInterceptor for LanguageInterceptor {
	fn name(&self) -> &str {
		"language"
	}

	fn on_request<'a>(&'a self, context: &'a mut RequestContext) -> InterceptFuture<'a> {
		Box::pin(async move {
			let url = context.full_url()?;

			if !(self.url_predicate)(url.as_str()) {
				return Ok(());
			}

			let values = i18n::accept_language_header_values(&(self.current_languages)());

			if !values.is_empty() {
				context.set_header(Self::HEADER, values.join(", "));
			}

			Ok(())
		})
	}
}
impl Debug for LanguageInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("LanguageInterceptor(..)")
	}
}
