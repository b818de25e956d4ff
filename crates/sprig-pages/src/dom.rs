//! In-memory document model.
//!
//! The mount engine writes into a [`Document`]: an arena of element and text
//! nodes with event dispatch, an attachment tracker, a location with session
//! history, adopted stylesheets and a local task pool. The same type backs
//! both the interactive tree and server-side rendering, which mounts into a
//! [`Document::headless`] document and serializes the result.
//!
//! ## Example
//!
//! ```
//! use sprig_pages::dom::Document;
//!
//! let doc = Document::new();
//! let p = doc.create_element("p");
//! let text = doc.create_text("hello");
//! doc.append_child(p, text)?;
//! doc.append_child(doc.root(), p)?;
//!
//! assert_eq!(doc.inner_html(doc.root()), "<p>hello</p>");
//! # Ok::<(), sprig_pages::dom::DomError>(())
//! ```

mod document;
mod event;
mod history;
mod serialize;
mod stylesheet;

pub use document::{
	DEFAULT_ORIGIN, Document, ListenerId, ListenerTarget, NodeId, NodeKind, WatchId, WeakDocument,
};
pub use event::{Event, EventDetail, POPSTATE_EVENT, ROUTE_EVENT};
pub use serialize::{escape_attribute, escape_text, is_void_element};
pub use stylesheet::{CssRuleList, WeakRuleList};

/// Errors raised by document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
	/// The id does not belong to this document.
	#[error("node {0} does not exist in this document")]
	UnknownNode(NodeId),

	/// The operation needs an element.
	#[error("node {0} is not an element")]
	NotAnElement(NodeId),

	/// The operation needs a text node.
	#[error("node {0} is not a text node")]
	NotAText(NodeId),

	/// `child` is not a child of `parent`.
	#[error("node {child} is not a child of {parent}")]
	NotAChild {
		/// Expected parent.
		parent: NodeId,
		/// Offending node.
		child: NodeId,
	},

	/// The insertion would create a cycle or move the root.
	#[error("cannot insert {child} into {parent}")]
	HierarchyRequest {
		/// Target parent.
		parent: NodeId,
		/// Node being inserted.
		child: NodeId,
	},

	/// The href cannot be resolved against the current location.
	#[error("invalid url `{href}`: {source}")]
	InvalidUrl {
		/// Raw href.
		href: String,
		/// Parser error.
		#[source]
		source: url::ParseError,
	},

	/// History entries must stay on the document's origin.
	#[error("`{href}` is not on the document's origin")]
	CrossOrigin {
		/// Raw href.
		href: String,
	},

	/// Rule index outside of a [`CssRuleList`].
	#[error("rule index {index} out of bounds (len {len})")]
	IndexOutOfBounds {
		/// Requested index.
		index: usize,
		/// List length.
		len: usize,
	},

	/// The task pool refused a future.
	#[error("failed to spawn task: {0}")]
	Spawn(String),
}
