//! Replaceable ranges of live output.

use std::iter;

use super::mount::{MountError, materialize};
use super::node::Node;
use crate::dom::{Document, NodeId};

/// A range of siblings delimited by two empty text markers.
///
/// Dynamic leaves own a slot rather than a list of nodes: nested output may
/// replace its own nodes at any time, but whatever lies between the markers
/// belongs to the slot. The markers serialize to nothing and double as the
/// placeholder when the range is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
	start: NodeId,
	end: NodeId,
}

impl Slot {
	/// Inserts an empty slot into `parent` ahead of `before`.
	pub(crate) fn open(
		document: &Document,
		parent: NodeId,
		before: Option<NodeId>,
	) -> Result<Self, MountError> {
		let start = document.create_text("");
		let end = document.create_text("");
		document.insert_before(parent, start, before)?;
		document.insert_before(parent, end, before)?;
		Ok(Self { start, end })
	}

	pub(crate) fn start(&self) -> NodeId {
		self.start
	}

	pub(crate) fn end(&self) -> NodeId {
		self.end
	}

	/// The common parent of both markers.
	pub(crate) fn parent(&self, document: &Document) -> Option<NodeId> {
		let parent = document.parent(self.start)?;
		(document.parent(self.end) == Some(parent)).then_some(parent)
	}

	/// Nodes strictly between the markers.
	pub(crate) fn contents(&self, document: &Document) -> Vec<NodeId> {
		let Some(parent) = self.parent(document) else {
			return Vec::new();
		};
		document
			.children(parent)
			.into_iter()
			.skip_while(|id| *id != self.start)
			.skip(1)
			.take_while(|id| *id != self.end)
			.collect()
	}

	/// Markers and contents, in order.
	pub(crate) fn nodes(&self, document: &Document) -> Vec<NodeId> {
		iter::once(self.start)
			.chain(self.contents(document))
			.chain(iter::once(self.end))
			.collect()
	}

	/// Materializes `node` after the current contents, then removes the old
	/// contents.
	pub(crate) fn replace(&self, document: &Document, node: &Node) -> Result<(), MountError> {
		let parent = self
			.parent(document)
			.ok_or(MountError::DetachedTarget(self.start))?;
		let old = self.contents(document);
		materialize(document, parent, Some(self.end), node)?;
		for id in old {
			document.remove_child(parent, id)?;
		}
		Ok(())
	}

	/// Removes the contents, leaving the markers.
	pub(crate) fn clear(&self, document: &Document) -> Result<(), MountError> {
		let parent = self
			.parent(document)
			.ok_or(MountError::DetachedTarget(self.start))?;
		for id in self.contents(document) {
			document.remove_child(parent, id)?;
		}
		Ok(())
	}
}
