//! URL query-string parameters.

/// The raw value of parameter `name` in the query part of `url`.
///
/// `url` may be a full URL or just the query part as in `location.search` (`?a=1&b=2`).
/// Returns [`None`] if there's no query, no such parameter, or the parameter has no `=`.
/// Values are not percent-decoded.
#[must_use]
pub fn param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
	let query = &url[url.find('?')? + 1..];
	let query = query.split('#').next().unwrap_or_default();
	query.split('&').find_map(|pair| match pair.split_once('=') {
		Some((key, value)) if key == name => Some(value),
		_ => None,
	})
}
