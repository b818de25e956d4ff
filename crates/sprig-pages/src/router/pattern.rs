//! Route patterns and query parameters.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static PARAM: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^\{\{(.*?)\}\}$").unwrap_or_else(|_| unreachable!("param pattern is valid"))
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param(String),
}

/// A `/`-separated route pattern.
///
/// A segment written `{{name}}` matches any single path segment and binds
/// it to `name`; every other segment must match literally. Pattern and path
/// must have the same number of segments, so `"/users/{{id}}"` matches
/// `"/users/42"` but neither `"/users"` nor `"/users/42/posts"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
	source: String,
	segments: Vec<Segment>,
}

impl PathPattern {
	/// Parses a pattern. Every string is a valid pattern.
	pub fn new(pattern: impl Into<String>) -> Self {
		let source = pattern.into();
		let segments = source
			.split('/')
			.map(|part| match PARAM.captures(part) {
				Some(captures) => Segment::Param(captures[1].to_string()),
				None => Segment::Literal(part.to_string()),
			})
			.collect();
		Self { source, segments }
	}

	/// The pattern as written.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Names of the parameters, in order.
	pub fn param_names(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Param(name) => Some(name.as_str()),
			Segment::Literal(_) => None,
		})
	}

	/// Matches `path`, returning the bound parameters.
	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		let parts: Vec<&str> = path.split('/').collect();
		if parts.len() != self.segments.len() {
			return None;
		}

		let mut params = HashMap::new();
		for (segment, part) in self.segments.iter().zip(parts) {
			match segment {
				Segment::Literal(literal) if literal == part => {}
				Segment::Literal(_) => return None,
				Segment::Param(name) => {
					params.insert(name.clone(), part.to_string());
				}
			}
		}
		Some(params)
	}
}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

impl From<&str> for PathPattern {
	fn from(pattern: &str) -> Self {
		Self::new(pattern)
	}
}

impl From<String> for PathPattern {
	fn from(pattern: String) -> Self {
		Self::new(pattern)
	}
}

/// Matches `path` against `pattern`.
///
/// ```
/// use sprig_pages::router::match_route;
///
/// let params = match_route("/users/{{id}}", "/users/42").unwrap();
/// assert_eq!(params["id"], "42");
/// assert!(match_route("/users/{{id}}", "/users").is_none());
/// ```
pub fn match_route(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
	PathPattern::new(pattern).matches(path)
}

/// Decoded query string parameters, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(Vec<(String, String)>);

impl SearchParams {
	/// Parses a query string, with or without the leading `?`.
	pub fn parse(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);
		Self(
			url::form_urlencoded::parse(query.as_bytes())
				.into_owned()
				.collect(),
		)
	}

	/// The query parameters of `url`.
	pub fn from_url(url: &Url) -> Self {
		Self(url.query_pairs().into_owned().collect())
	}

	/// The first value of `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Every value of `name`.
	pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.0
			.iter()
			.filter(move |(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Whether `name` appears at all.
	pub fn has(&self, name: &str) -> bool {
		self.0.iter().any(|(key, _)| key == name)
	}

	/// Pairs in query order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Number of pairs, repeated names included.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the query had no pairs.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
