//! Options for string rendering.

use serde::Deserialize;

use super::ConfigError;
use crate::dom::DEFAULT_ORIGIN;

/// Options for [`SsrRenderer`](super::SsrRenderer).
///
/// Deserializable from TOML:
///
/// ```
/// use sprig_pages::ssr::RenderOptions;
///
/// let options = RenderOptions::from_toml_str(r#"
///     origin = "https://example.com/"
///     resolve_pending = true
/// "#)?;
///
/// assert_eq!(options.origin, "https://example.com/");
/// assert!(options.doctype);
/// assert!(options.resolve_pending);
/// # Ok::<(), sprig_pages::ssr::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
	/// Location of the headless document. Relative links resolve against it.
	pub origin: String,
	/// Prefix `<!DOCTYPE html>` when the output is a single `<html>` element.
	pub doctype: bool,
	/// Drive pending future leaves before serializing.
	pub resolve_pending: bool,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			origin: DEFAULT_ORIGIN.to_string(),
			doctype: true,
			resolve_pending: false,
		}
	}
}

impl RenderOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses options from a TOML document. Missing keys keep their
	/// defaults; unknown keys are rejected.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	/// Sets the origin.
	pub fn origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = origin.into();
		self
	}

	/// Enables or disables the doctype prefix.
	pub fn doctype(mut self, enable: bool) -> Self {
		self.doctype = enable;
		self
	}

	/// Enables or disables resolving pending futures.
	pub fn resolve_pending(mut self, enable: bool) -> Self {
		self.resolve_pending = enable;
		self
	}
}
