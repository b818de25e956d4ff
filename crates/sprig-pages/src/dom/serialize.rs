//! HTML serialization of document subtrees.

use super::document::{Document, NodeData, NodeId, NodeKind};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Elements whose text children are written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
	"style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Whether `tag` is a void element.
pub fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

/// Escapes text content.
pub fn escape_text(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'\u{a0}' => out.push_str("&nbsp;"),
			_ => out.push(c),
		}
	}
	out
}

/// Escapes a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'"' => out.push_str("&quot;"),
			'\u{a0}' => out.push_str("&nbsp;"),
			_ => out.push(c),
		}
	}
	out
}

enum Frame<'a> {
	Open(NodeId),
	Close(&'a str),
}

/// Writes `start` and its descendants. Uses an explicit stack so that deep
/// trees cannot overflow the call stack.
fn write_node(nodes: &[NodeData], start: NodeId, out: &mut String) {
	let mut stack = vec![Frame::Open(start)];
	while let Some(frame) = stack.pop() {
		match frame {
			Frame::Close(tag) => {
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
			Frame::Open(id) => {
				let data = &nodes[id.index()];
				match &data.kind {
					NodeKind::Text(text) => {
						let raw = data.parent.is_some_and(|parent| {
							matches!(
								&nodes[parent.index()].kind,
								NodeKind::Element { tag, .. } if RAW_TEXT_ELEMENTS.contains(&tag.as_str())
							)
						});
						if raw {
							out.push_str(text);
						} else {
							out.push_str(&escape_text(text));
						}
					}
					NodeKind::Element { tag, attributes } => {
						out.push('<');
						out.push_str(tag);
						for (name, value) in attributes {
							out.push(' ');
							out.push_str(name);
							out.push_str("=\"");
							out.push_str(&escape_attribute(value));
							out.push('"');
						}
						out.push('>');
						if is_void_element(tag) {
							continue;
						}
						stack.push(Frame::Close(tag));
						stack.extend(data.children.iter().rev().map(|child| Frame::Open(*child)));
					}
				}
			}
		}
	}
}

impl Document {
	/// Serializes the children of `node`.
	pub fn inner_html(&self, node: NodeId) -> String {
		let nodes = self.0.nodes.borrow();
		let mut out = String::new();
		if let Some(data) = nodes.get(node.index()) {
			for child in &data.children {
				write_node(&nodes, *child, &mut out);
			}
		}
		out
	}

	/// Serializes `node` itself.
	pub fn outer_html(&self, node: NodeId) -> String {
		let nodes = self.0.nodes.borrow();
		let mut out = String::new();
		if nodes.get(node.index()).is_some() {
			write_node(&nodes, node, &mut out);
		}
		out
	}

	/// Concatenated text of `node` and its descendants.
	pub fn text_content(&self, node: NodeId) -> String {
		let nodes = self.0.nodes.borrow();
		let mut out = String::new();
		let mut stack = vec![node];
		while let Some(id) = stack.pop() {
			let Some(data) = nodes.get(id.index()) else {
				continue;
			};
			if let NodeKind::Text(text) = &data.kind {
				out.push_str(text);
			}
			stack.extend(data.children.iter().rev().copied());
		}
		out
	}
}
