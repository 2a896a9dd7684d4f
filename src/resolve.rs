//! URL composition helpers: request targets, base-URL joining, trust predicates, and the small
//! query utilities used around the client.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, error::ConfigError};

const SCRATCH_BASE: &str = "http://localhost/";

/// Predicate deciding whether an interceptor applies to a fully resolved URL.
pub type UrlPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Predicate accepting every URL.
pub fn always() -> UrlPredicate {
	Arc::new(|_| true)
}

/// Predicate rejecting every URL.
pub fn never() -> UrlPredicate {
	Arc::new(|_| false)
}

/// Structured target whose path parts are percent-encoded one segment at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlParts {
	/// Path segments, encoded individually so `/` inside a segment stays data.
	pub segments: Vec<String>,
	/// Query parameters appended after the path.
	pub query: BTreeMap<String, String>,
}

/// Request target, relative to a base URL unless it is absolute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlTarget {
	/// Pre-formed path (optionally with query) or absolute URL, used as-is.
	Raw(String),
	/// Segment list plus query parameters.
	Parts(UrlParts),
}
impl UrlTarget {
	/// Builds a target from individual path segments.
	pub fn segments<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Parts(UrlParts {
			segments: segments.into_iter().map(Into::into).collect(),
			query: BTreeMap::new(),
		})
	}

	/// Builds a target from a `/`-separated pathname, encoding each part on its own.
	///
	/// A leading `/` is kept as an empty first segment, which makes the target host-relative
	/// under [`resolve_url`]. [`full_url`] ignores leading empty segments.
	pub fn pathname(pathname: &str) -> Self {
		Self::segments(pathname.split('/'))
	}

	/// Adds a query parameter.
	///
	/// Raw targets stay raw: the encoded pair is appended to their query string (before any
	/// fragment) and the path is left untouched.
	pub fn with_query(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let (name, value) = (name.into(), value.into());

		match self {
			Self::Parts(mut parts) => {
				parts.query.insert(name, value);

				Self::Parts(parts)
			},
			Self::Raw(mut raw) => {
				let fragment = raw.find('#').map(|at| raw.split_off(at));
				let pair = form_urlencoded::Serializer::new(String::new())
					.append_pair(&name, &value)
					.finish();

				if !raw.contains('?') {
					raw.push('?');
				} else if !raw.ends_with(['?', '&']) {
					raw.push('&');
				}

				raw.push_str(&pair);
				raw.extend(fragment);

				Self::Raw(raw)
			},
		}
	}

	/// Relative reference form: encoded path plus `?query`, without a leading `/` unless the
	/// first segment is empty.
	fn relative_reference(&self) -> Result<String> {
		let parts = match self {
			Self::Raw(raw) => return Ok(raw.clone()),
			Self::Parts(parts) => parts,
		};
		let mut scratch = Url::parse(SCRATCH_BASE).map_err(|source| ConfigError::InvalidTarget {
			target: self.to_string(),
			source,
		})?;

		scratch
			.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeABase { url: SCRATCH_BASE.into() })?
			.clear()
			.extend(parts.segments.iter().skip_while(|segment| segment.is_empty()));

		let host_relative = parts.segments.first().is_some_and(String::is_empty);
		let path = scratch.path();
		let mut reference =
			if host_relative { path.to_owned() } else { path.trim_start_matches('/').to_owned() };

		if !parts.query.is_empty() {
			reference.push('?');
			reference.push_str(&form_urlencoded::Serializer::new(String::new())
				.extend_pairs(&parts.query)
				.finish());
		}

		Ok(reference)
	}
}
impl Display for UrlTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Raw(raw) => f.write_str(raw),
			Self::Parts(parts) => {
				write!(f, "{}", parts.segments.join("/"))?;

				if !parts.query.is_empty() {
					let query = form_urlencoded::Serializer::new(String::new())
						.extend_pairs(&parts.query)
						.finish();

					write!(f, "?{query}")?;
				}

				Ok(())
			},
		}
	}
}
impl From<&str> for UrlTarget {
	fn from(raw: &str) -> Self {
		Self::Raw(raw.to_owned())
	}
}
impl From<String> for UrlTarget {
	fn from(raw: String) -> Self {
		Self::Raw(raw)
	}
}
impl From<&String> for UrlTarget {
	fn from(raw: &String) -> Self {
		Self::Raw(raw.clone())
	}
}
impl From<UrlParts> for UrlTarget {
	fn from(parts: UrlParts) -> Self {
		Self::Parts(parts)
	}
}

/// Resolves `target` against `root` using standard relative-reference rules.
///
/// Structured targets have every segment percent-encoded individually before resolution.
pub fn resolve_url(root: &Url, target: &UrlTarget) -> Result<Url> {
	let reference = target.relative_reference()?;

	root.join(&reference)
		.map_err(|source| ConfigError::InvalidTarget { target: target.to_string(), source }.into())
}

/// Joins `target` onto `base` the way request URLs are built.
///
/// Raw targets are appended after exactly one `/`, so `https://a.test/v1` plus `items` yields
/// `https://a.test/v1/items`. Absolute raw targets replace the base entirely. `query` is
/// appended last.
pub fn full_url(base: &Url, target: &UrlTarget, query: &BTreeMap<String, String>) -> Result<Url> {
	let mut url = match target {
		UrlTarget::Raw(raw) => match Url::parse(raw) {
			Ok(absolute) => absolute,
			Err(_) => {
				let base = base.as_str().trim_end_matches('/');
				let path = raw.trim_start_matches('/');
				let joined = if path.is_empty() { base.to_owned() } else { format!("{base}/{path}") };

				Url::parse(&joined).map_err(|source| ConfigError::InvalidTarget {
					target: raw.clone(),
					source,
				})?
			},
		},
		UrlTarget::Parts(parts) => {
			let mut url = base.clone();

			url.set_query(None);
			url.set_fragment(None);
			url.path_segments_mut()
				.map_err(|_| ConfigError::CannotBeABase { url: base.to_string() })?
				.pop_if_empty()
				.extend(parts.segments.iter().skip_while(|segment| segment.is_empty()));

			if !parts.query.is_empty() {
				url.query_pairs_mut().extend_pairs(&parts.query);
			}

			url
		},
	};

	if !query.is_empty() {
		url.query_pairs_mut().extend_pairs(query);
	}

	Ok(url)
}

/// Host allow-list used to decide which URLs may receive credentials.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedHosts {
	/// Trusted domain suffixes, e.g. `example.com` also trusts `api.example.com`.
	pub domains: Vec<String>,
	/// Trust every URL, for development builds.
	#[serde(default)]
	pub dev_mode: bool,
}
impl TrustedHosts {
	/// Creates an allow-list from domain suffixes.
	pub fn new<I, S>(domains: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { domains: domains.into_iter().map(Into::into).collect(), dev_mode: false }
	}

	/// Enables or disables the development bypass.
	pub fn dev_mode(mut self, dev_mode: bool) -> Self {
		self.dev_mode = dev_mode;

		self
	}

	/// Whether `url` targets a trusted host.
	///
	/// URLs without a host (relative paths, unparsable input) are trusted since they stay on the
	/// configured base.
	pub fn is_trusted(&self, url: &str) -> bool {
		if self.dev_mode {
			return true;
		}

		let host = match Url::parse(url) {
			Ok(parsed) => match parsed.host_str() {
				Some(host) => host.to_ascii_lowercase(),
				None => return true,
			},
			Err(_) => return true,
		};

		self.domains.iter().any(|domain| {
			let domain = domain.trim_start_matches('.').to_ascii_lowercase();

			host == domain || host.ends_with(&format!(".{domain}"))
		})
	}

	/// Converts the allow-list into a [`UrlPredicate`].
	pub fn into_predicate(self) -> UrlPredicate {
		Arc::new(move |url| self.is_trusted(url))
	}
}

/// Rewrites `url` so its query carries `in-app=true` followed by `params`.
///
/// Existing parameters keep their position; a parameter given again is overwritten in place.
/// The fragment is dropped.
pub fn with_query_params(url: &str, params: &BTreeMap<String, String>) -> Result<String> {
	let mut parsed = Url::parse(url).map_err(|source| ConfigError::InvalidTarget {
		target: url.to_owned(),
		source,
	})?;
	let mut pairs = parsed.query_pairs().into_owned().collect::<Vec<_>>();

	upsert(&mut pairs, "in-app", "true");

	for (name, value) in params {
		upsert(&mut pairs, name, value);
	}

	parsed.set_fragment(None);
	parsed.query_pairs_mut().clear().extend_pairs(&pairs);

	Ok(parsed.into())
}

fn upsert(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
	match pairs.iter_mut().find(|(existing, _)| existing == name) {
		Some((_, existing)) => *existing = value.to_owned(),
		None => pairs.push((name.to_owned(), value.to_owned())),
	}
}

/// Parses the query of `url` into a map; later duplicates win. Unparsable URLs yield an empty
/// map.
pub fn parse_query(url: &str) -> BTreeMap<String, String> {
	Url::parse(url).map(|parsed| parsed.query_pairs().into_owned().collect()).unwrap_or_default()
}

/// Host plus path of `url`, without scheme, port, or query.
pub fn human_readable_url(url: Option<&str>) -> Option<String> {
	let parsed = Url::parse(url?).ok()?;
	let host = parsed.host_str()?;

	Some(format!("{host}{}", parsed.path()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base(raw: &str) -> Url {
		Url::parse(raw).expect("Fixture base URL should parse.")
	}

	#[test]
	fn raw_targets_join_with_a_single_slash() {
		let none = BTreeMap::new();

		for (root, target) in [
			("https://api.example.com", "items"),
			("https://api.example.com/", "/items"),
			("https://api.example.com", "/items"),
		] {
			assert_eq!(
				full_url(&base(root), &target.into(), &none).expect("Target should join.").as_str(),
				"https://api.example.com/items"
			);
		}

		assert_eq!(
			full_url(&base("https://api.example.com/v1/"), &"users/7".into(), &none)
				.expect("Nested target should join.")
				.as_str(),
			"https://api.example.com/v1/users/7"
		);
	}

	#[test]
	fn absolute_targets_replace_the_base() {
		let url = full_url(
			&base("https://api.example.com"),
			&"https://cdn.example.net/a.json".into(),
			&BTreeMap::new(),
		)
		.expect("Absolute target should resolve.");

		assert_eq!(url.as_str(), "https://cdn.example.net/a.json");
	}

	#[test]
	fn raw_targets_keep_their_encoding_when_queried() {
		let none = BTreeMap::new();
		let root = base("https://api.example.com");
		let encoded = UrlTarget::from("users/a%20b").with_query("k", "v");

		assert_eq!(encoded, UrlTarget::Raw("users/a%20b?k=v".into()));
		assert_eq!(
			full_url(&root, &encoded, &none).expect("Encoded target should join.").as_str(),
			"https://api.example.com/users/a%20b?k=v"
		);

		let absolute = UrlTarget::from("https://cdn.example.net/a.json").with_query("k", "v");

		assert_eq!(
			full_url(&root, &absolute, &none).expect("Absolute target should resolve.").as_str(),
			"https://cdn.example.net/a.json?k=v"
		);
		assert_eq!(
			UrlTarget::from("feed?page=1#top").with_query("q", "a b"),
			UrlTarget::Raw("feed?page=1&q=a+b#top".into())
		);
		assert_eq!(UrlTarget::from("feed?").with_query("q", "1"), UrlTarget::Raw("feed?q=1".into()));
	}

	#[test]
	fn segments_are_encoded_individually() {
		let target = UrlTarget::segments(["users", "a/b c"]).with_query("q", "x y");
		let mut query = BTreeMap::new();

		query.insert("page".to_owned(), "2".to_owned());

		let url = full_url(&base("https://api.example.com/v1"), &target, &query)
			.expect("Segment target should resolve.");

		assert_eq!(url.as_str(), "https://api.example.com/v1/users/a%2Fb%20c?q=x+y&page=2");
	}

	#[test]
	fn resolve_url_follows_relative_reference_rules() {
		let root = base("https://example.com/docs/index.html");

		assert_eq!(
			resolve_url(&root, &"guide.html".into()).expect("Relative should resolve.").as_str(),
			"https://example.com/docs/guide.html"
		);
		assert_eq!(
			resolve_url(&root, &UrlTarget::pathname("/a b/c"))
				.expect("Pathname should resolve.")
				.as_str(),
			"https://example.com/a%20b/c"
		);
		assert_eq!(
			resolve_url(&root, &UrlTarget::segments(["x?y"]).with_query("k", "v"))
				.expect("Segments should resolve.")
				.as_str(),
			"https://example.com/docs/x%3Fy?k=v"
		);
	}

	#[test]
	fn trusted_hosts_match_suffixes() {
		let trusted = TrustedHosts::new(["example.com"]);

		assert!(trusted.is_trusted("https://example.com/a"));
		assert!(trusted.is_trusted("https://api.example.com/a"));
		assert!(!trusted.is_trusted("https://evilexample.com/a"));
		assert!(!trusted.is_trusted("https://example.org/a"));
		assert!(trusted.clone().dev_mode(true).is_trusted("https://example.org/a"));

		let predicate = trusted.into_predicate();

		assert!(predicate("https://www.example.com"));
		assert!(always()("anything"));
		assert!(!never()("anything"));
	}

	#[test]
	fn query_helpers() {
		let mut params = BTreeMap::new();

		params.insert("theme".to_owned(), "dark".to_owned());

		let rewritten = with_query_params("https://example.com/p?theme=light&x=1#frag", &params)
			.expect("URL should be rewritten.");

		assert_eq!(rewritten, "https://example.com/p?theme=dark&x=1&in-app=true");

		let query = parse_query(&rewritten);

		assert_eq!(query.get("in-app").map(String::as_str), Some("true"));
		assert!(parse_query("not a url").is_empty());
		assert_eq!(
			human_readable_url(Some("https://example.com:8443/a/b?c=d")).as_deref(),
			Some("example.com/a/b")
		);
		assert_eq!(human_readable_url(None), None);
	}
}
