//! Mountable trait definition.

use super::mount::MountError;
use crate::dom::{Document, NodeId};

/// Something that materializes itself into a document.
///
/// [`Node::Component`](super::Node::Component) holds a `Rc<dyn Mountable>`;
/// every [`Component`](super::Component) implements it regardless of its
/// props type.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use sprig_pages::component::{MountError, Mountable, Node, mount};
/// use sprig_pages::dom::{Document, NodeId};
///
/// struct Badge;
///
/// impl Mountable for Badge {
///     fn mount(
///         &self,
///         document: &Document,
///         parent: NodeId,
///         before: Option<NodeId>,
///     ) -> Result<Vec<NodeId>, MountError> {
///         let text = document.create_text("new");
///         document.insert_before(parent, text, before)?;
///         Ok(vec![text])
///     }
/// }
///
/// let doc = Document::new();
/// mount(&doc, doc.root(), &Node::Component(Rc::new(Badge)))?;
/// assert_eq!(doc.inner_html(doc.root()), "new");
/// # Ok::<(), MountError>(())
/// ```
pub trait Mountable: 'static {
	/// Inserts the output into `parent` ahead of `before` (at the end when
	/// `None`) and returns the top-level nodes it inserted, in order.
	fn mount(
		&self,
		document: &Document,
		parent: NodeId,
		before: Option<NodeId>,
	) -> Result<Vec<NodeId>, MountError>;

	/// Name used in logs and `Debug` output.
	fn name(&self) -> &'static str {
		"Component"
	}
}
