//! String renderer.

use url::Url;

use super::options::RenderOptions;
use super::RenderError;
use crate::component::{Element, Node, mount};
use crate::css::StyleSheet;
use crate::dom::{Document, DomError, NodeId};

const DOCTYPE: &str = "<!DOCTYPE html>";

/// Something the renderer can serialize.
#[derive(Debug, Clone)]
pub enum Renderable {
	/// A template, serialized as markup.
	Node(Node),
	/// A stylesheet, serialized as CSS.
	StyleSheet(StyleSheet),
}

impl From<Node> for Renderable {
	fn from(node: Node) -> Self {
		Self::Node(node)
	}
}

impl From<Element> for Renderable {
	fn from(element: Element) -> Self {
		Self::Node(element.into())
	}
}

impl From<StyleSheet> for Renderable {
	fn from(sheet: StyleSheet) -> Self {
		Self::StyleSheet(sheet)
	}
}

impl From<&StyleSheet> for Renderable {
	fn from(sheet: &StyleSheet) -> Self {
		Self::StyleSheet(sheet.clone())
	}
}

/// Renders templates and stylesheets to strings.
///
/// Every template is mounted into a detached container of a fresh headless
/// document, so no signal subscriptions outlive a render and stylesheets are
/// never adopted.
///
/// # Example
///
/// ```
/// use sprig_pages::builder::html::{body, html, p};
/// use sprig_pages::ssr::SsrRenderer;
///
/// let renderer = SsrRenderer::new();
/// let page = html().child(body().child(p().child("hi")));
///
/// assert_eq!(
///     renderer.render(page)?,
///     "<!DOCTYPE html><html><body><p>hi</p></body></html>"
/// );
/// # Ok::<(), sprig_pages::ssr::RenderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SsrRenderer {
	options: RenderOptions,
	origin: Url,
}

impl Default for SsrRenderer {
	fn default() -> Self {
		Self::new()
	}
}

impl SsrRenderer {
	/// Creates a renderer with default options.
	pub fn new() -> Self {
		let options = RenderOptions::default();
		let origin = Url::parse(&options.origin)
			.unwrap_or_else(|_| unreachable!("default origin is a valid url"));
		Self { options, origin }
	}

	/// Creates a renderer with custom options. Fails when the origin is not
	/// an absolute url.
	pub fn with_options(options: RenderOptions) -> Result<Self, RenderError> {
		let origin = Url::parse(&options.origin).map_err(|source| DomError::InvalidUrl {
			href: options.origin.clone(),
			source,
		})?;
		Ok(Self { options, origin })
	}

	/// The options this renderer was built with.
	pub fn options(&self) -> &RenderOptions {
		&self.options
	}

	/// Serializes a template or a stylesheet.
	pub fn render(&self, renderable: impl Into<Renderable>) -> Result<String, RenderError> {
		match renderable.into() {
			Renderable::Node(node) => self.render_node(&node),
			Renderable::StyleSheet(sheet) => Ok(self.render_css(&sheet)),
		}
	}

	/// Mounts `node` into a detached container and returns its markup.
	pub fn render_node(&self, node: &Node) -> Result<String, RenderError> {
		let document = Document::headless().with_location(self.origin.as_str())?;
		let container = document.create_element("div");
		mount(&document, container, node)?;
		if self.options.resolve_pending {
			document.run_until_stalled();
		}

		let markup = document.inner_html(container);
		tracing::debug!(bytes = markup.len(), "rendered template");
		if self.options.doctype && is_html_document(&document, container) {
			return Ok(format!("{DOCTYPE}{markup}"));
		}
		Ok(markup)
	}

	/// Serializes every rule of `sheet`, space separated.
	pub fn render_css(&self, sheet: &StyleSheet) -> String {
		sheet.to_css_string()
	}
}

fn is_html_document(document: &Document, container: NodeId) -> bool {
	match document.element_children(container).as_slice() {
		[only] => document.tag_name(*only).as_deref() == Some("html"),
		_ => false,
	}
}
