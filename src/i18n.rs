//! Language preference helpers for `Accept-Language`.

/// Weighted `Accept-Language` values for `languages`, most preferred first.
///
/// The first language carries no explicit weight. Every following language and a trailing
/// wildcard `*` step down by `1/(n+1)`, where `n` counts the given languages. An empty input
/// yields an empty list.
///
/// ```
/// let values = apiclient::i18n::accept_language_header_values(&["en-ZA", "en", "af"]);
///
/// assert_eq!(values, ["en-ZA", "en;q=0.75", "af;q=0.50", "*;q=0.25"]);
/// ```
pub fn accept_language_header_values<S>(languages: &[S]) -> Vec<String>
where
	S: AsRef<str>,
{
	if languages.is_empty() {
		return Vec::new();
	}

	let step = 1. / (languages.len() + 1) as f64;
	let mut values = vec![languages[0].as_ref().to_owned()];
	let mut quality = 1.;

	for language in languages[1..].iter().map(AsRef::as_ref).chain(["*"]) {
		quality -= step;

		values.push(format!("{language};q={}", hundredths(quality)));
	}

	values
}

/// Appends each tag's primary subtag after the tag itself, e.g. `en-US` yields `en-US`, `en`.
pub fn explode_region_subtags<S>(languages: &[S]) -> Vec<String>
where
	S: AsRef<str>,
{
	let mut exploded = Vec::with_capacity(languages.len() * 2);

	for language in languages.iter().map(AsRef::as_ref) {
		exploded.push(language.to_owned());

		if let Some((primary, _)) = language.split_once('-') {
			exploded.push(primary.to_owned());
		}
	}

	exploded
}

// Rounds the exact binary value to two decimals. The only exactly representable ties are odd
// multiples of 1/8, and those round up.
fn hundredths(value: f64) -> String {
	let eighths = value * 8.;

	if eighths.fract() == 0. && eighths % 2. == 1. {
		format!("{:.2}", (value * 100.).ceil() / 100.)
	} else {
		format!("{value:.2}")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn weights_step_down_to_the_wildcard() {
		assert_eq!(accept_language_header_values(&["en"]), ["en", "*;q=0.50"]);
		assert_eq!(accept_language_header_values(&["en-ZA", "en", "af"]), [
			"en-ZA", "en;q=0.75", "af;q=0.50", "*;q=0.25"
		]);
		assert_eq!(accept_language_header_values(&["a", "b", "c", "d", "e", "f", "g"]), [
			"a", "b;q=0.88", "c;q=0.75", "d;q=0.63", "e;q=0.50", "f;q=0.38", "g;q=0.25", "*;q=0.13"
		]);
		assert!(accept_language_header_values::<&str>(&[]).is_empty());

		// Repeated subtraction drifts below the exact fraction for long lists.
		let many = (0..39).map(|idx| format!("l{idx}")).collect::<Vec<_>>();
		let values = accept_language_header_values(&many);

		assert_eq!(values.len(), 40);
		assert_eq!(values[1..6], ["l1;q=0.97", "l2;q=0.95", "l3;q=0.92", "l4;q=0.90", "l5;q=0.87"]);
		assert_eq!(values[39], "*;q=0.02");
	}

	#[test]
	fn region_subtags_follow_their_tag() {
		assert_eq!(explode_region_subtags(&["en-US", "fr", "zh-Hant-TW"]), [
			"en-US", "en", "fr", "zh-Hant-TW", "zh"
		]);
	}
}
