//! Default-configuration profiles applied before each call's own config.

// self
use crate::{_prelude::*, request::RequestConfig};

/// Supplies defaults and decides how a call's config is layered on top of them.
pub trait ConfigProfile
where
	Self: Send + Sync,
{
	/// Profile-level defaults, layered over the client options.
	fn default_config(&self) -> RequestConfig {
		RequestConfig::default()
	}

	/// Produces the effective config for one call from the client's `base` defaults.
	fn merge_config(&self, base: RequestConfig, call: Option<RequestConfig>) -> RequestConfig {
		let merged = base.merged(self.default_config());

		match call {
			Some(call) => merged.merged(call),
			None => merged,
		}
	}
}

/// Profile without extra defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultProfile;
impl ConfigProfile for DefaultProfile {}

/// JSON API profile: pins `Content-Type` and `Accept` to `application/json`, even over
/// per-call headers.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonProfile;
impl JsonProfile {
	const MEDIA_TYPE: &'static str = "application/json";
}
impl ConfigProfile for JsonProfile {
	fn merge_config(&self, base: RequestConfig, call: Option<RequestConfig>) -> RequestConfig {
		let merged = match call {
			Some(call) => base.merged(call),
			None => base,
		};

		merged.header("Content-Type", Self::MEDIA_TYPE).header("Accept", Self::MEDIA_TYPE)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::request;

	struct Versioned;
	impl ConfigProfile for Versioned {
		fn default_config(&self) -> RequestConfig {
			RequestConfig::new().header("X-Api-Version", "2").timeout(StdDuration::from_secs(5))
		}
	}

	#[test]
	fn default_merge_layers_profile_then_call() {
		let base = RequestConfig::new().header("X-Api-Version", "1").header("X-Client", "app");
		let call = RequestConfig::new().timeout(StdDuration::from_secs(1));
		let merged = Versioned.merge_config(base, Some(call));

		assert_eq!(request::find_header(&merged.headers, "x-api-version"), Some("2"));
		assert_eq!(request::find_header(&merged.headers, "x-client"), Some("app"));
		assert_eq!(merged.timeout, Some(StdDuration::from_secs(1)));
		assert_eq!(DefaultProfile.merge_config(RequestConfig::new(), None), RequestConfig::new());
	}

	#[test]
	fn json_profile_pins_content_type() {
		let call = RequestConfig::new().header("content-type", "text/plain");
		let merged = JsonProfile.merge_config(RequestConfig::new(), Some(call));

		assert_eq!(request::find_header(&merged.headers, "Content-Type"), Some("application/json"));
		assert_eq!(request::find_header(&merged.headers, "Accept"), Some("application/json"));
		assert_eq!(merged.headers.len(), 2);
	}
}
