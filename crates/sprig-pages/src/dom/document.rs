//! Document arena, structural mutation, events and the attachment tracker.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use url::Url;

use super::DomError;
use super::event::Event;
use super::history::History;
use super::stylesheet::AdoptedSheet;
use crate::callback::Callback;

/// Location every new document starts at.
pub const DEFAULT_ORIGIN: &str = "http://localhost/";

/// Handle to a node owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	/// Position of the node in its document's arena.
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Where a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
	/// A node of the document.
	Node(NodeId),
	/// The window.
	Window,
}

/// Handle returned when registering an event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId {
	target: ListenerTarget,
	seq: u64,
}

impl ListenerId {
	/// Where the listener was registered.
	pub fn target(&self) -> ListenerTarget {
		self.target
	}
}

/// Handle returned by [`Document::on_attach`] and [`Document::on_detach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId {
	node: NodeId,
	seq: u64,
}

impl WatchId {
	/// The watched node.
	pub fn node(&self) -> NodeId {
		self.node
	}
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	/// An element with ordered attributes.
	Element {
		/// Lowercase tag name.
		tag: String,
		/// Attributes in insertion order.
		attributes: Vec<(String, String)>,
	},
	/// A text node.
	Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	Attach,
	Detach,
}

struct Watcher {
	seq: u64,
	phase: Phase,
	callback: Rc<dyn Fn()>,
}

pub(crate) struct Listener {
	seq: u64,
	kind: String,
	callback: Callback,
}

pub(crate) struct NodeData {
	pub(crate) kind: NodeKind,
	pub(crate) parent: Option<NodeId>,
	pub(crate) children: Vec<NodeId>,
	listeners: Vec<Listener>,
	watchers: Vec<Watcher>,
}

impl NodeData {
	fn new(kind: NodeKind) -> Self {
		Self {
			kind,
			parent: None,
			children: Vec::new(),
			listeners: Vec::new(),
			watchers: Vec::new(),
		}
	}
}

pub(crate) struct DocumentInner {
	pub(crate) nodes: RefCell<Vec<NodeData>>,
	root: NodeId,
	headless: bool,
	window_listeners: RefCell<Vec<Listener>>,
	pub(crate) history: RefCell<History>,
	pub(crate) adopted: RefCell<Vec<AdoptedSheet>>,
	route_roots: RefCell<HashSet<NodeId>>,
	pool: RefCell<LocalPool>,
	spawner: LocalSpawner,
	next_seq: Cell<u64>,
}

/// An in-memory document.
///
/// `Document` is a cheap, cloneable handle. Nodes live in an arena owned by
/// the document and are addressed by [`NodeId`]; a node is never freed while
/// its document is alive, so ids stay valid after removal and a removed
/// subtree can be inserted again.
///
/// A node is *attached* when it is connected to [`Document::root`]. Every
/// structural change that alters the connectivity of a subtree fires the
/// attach or detach watchers of each node in that subtree, in document order.
/// Subtrees built under a container that is itself not connected (server
/// rendering, scratch containers) never fire watchers.
#[derive(Clone)]
pub struct Document(pub(crate) Rc<DocumentInner>);

/// Non-owning handle to a [`Document`], for closures stored inside it.
#[derive(Clone)]
pub struct WeakDocument(Weak<DocumentInner>);

impl WeakDocument {
	/// Upgrades to a strong handle if the document is still alive.
	pub fn upgrade(&self) -> Option<Document> {
		self.0.upgrade().map(Document)
	}
}

impl fmt::Debug for WeakDocument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakDocument")
			.field("alive", &(self.0.strong_count() > 0))
			.finish()
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates an interactive document located at [`DEFAULT_ORIGIN`].
	pub fn new() -> Self {
		Self::build(false)
	}

	/// Creates a headless document.
	///
	/// Headless documents behave like interactive ones except that they never
	/// adopt stylesheets; they are what the string renderer mounts into.
	pub fn headless() -> Self {
		Self::build(true)
	}

	fn build(headless: bool) -> Self {
		let pool = LocalPool::new();
		let spawner = pool.spawner();
		let root = NodeData::new(NodeKind::Element {
			tag: "body".to_string(),
			attributes: Vec::new(),
		});
		let initial = Url::parse(DEFAULT_ORIGIN).unwrap_or_else(|_| unreachable!("default origin parses"));
		Self(Rc::new(DocumentInner {
			nodes: RefCell::new(vec![root]),
			root: NodeId(0),
			headless,
			window_listeners: RefCell::new(Vec::new()),
			history: RefCell::new(History::new(initial)),
			adopted: RefCell::new(Vec::new()),
			route_roots: RefCell::new(HashSet::new()),
			pool: RefCell::new(pool),
			spawner,
			next_seq: Cell::new(1),
		}))
	}

	/// Moves the document to `href` before anything has been mounted.
	pub fn with_location(self, href: &str) -> Result<Self, DomError> {
		self.set_location(href)?;
		Ok(self)
	}

	/// Returns a weak handle.
	pub fn downgrade(&self) -> WeakDocument {
		WeakDocument(Rc::downgrade(&self.0))
	}

	/// Returns true when both handles refer to the same document.
	pub fn ptr_eq(&self, other: &Document) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Whether this document was created with [`Document::headless`].
	pub fn is_headless(&self) -> bool {
		self.0.headless
	}

	/// The `<body>` element every attached node descends from.
	pub fn root(&self) -> NodeId {
		self.0.root
	}

	fn next_seq(&self) -> u64 {
		let seq = self.0.next_seq.get();
		self.0.next_seq.set(seq + 1);
		seq
	}

	fn push_node(&self, kind: NodeKind) -> NodeId {
		let mut nodes = self.0.nodes.borrow_mut();
		nodes.push(NodeData::new(kind));
		NodeId(nodes.len() - 1)
	}

	/// Creates a detached element. Tag names are stored lowercase.
	pub fn create_element(&self, tag: &str) -> NodeId {
		self.push_node(NodeKind::Element {
			tag: tag.to_ascii_lowercase(),
			attributes: Vec::new(),
		})
	}

	/// Creates a detached text node.
	pub fn create_text(&self, text: &str) -> NodeId {
		self.push_node(NodeKind::Text(text.to_string()))
	}

	pub(crate) fn with_node<R>(
		&self,
		node: NodeId,
		f: impl FnOnce(&NodeData) -> R,
	) -> Result<R, DomError> {
		let nodes = self.0.nodes.borrow();
		nodes.get(node.0).map(f).ok_or(DomError::UnknownNode(node))
	}

	fn with_node_mut<R>(
		&self,
		node: NodeId,
		f: impl FnOnce(&mut NodeData) -> R,
	) -> Result<R, DomError> {
		let mut nodes = self.0.nodes.borrow_mut();
		nodes
			.get_mut(node.0)
			.map(f)
			.ok_or(DomError::UnknownNode(node))
	}

	/// Returns a copy of the node's kind.
	pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
		self.with_node(node, |data| data.kind.clone()).ok()
	}

	/// Tag name of an element.
	pub fn tag_name(&self, node: NodeId) -> Option<String> {
		self.with_node(node, |data| match &data.kind {
			NodeKind::Element { tag, .. } => Some(tag.clone()),
			NodeKind::Text(_) => None,
		})
		.ok()
		.flatten()
	}

	/// Whether the node is an element.
	pub fn is_element(&self, node: NodeId) -> bool {
		self.tag_name(node).is_some()
	}

	/// Parent of the node, if it has one.
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.with_node(node, |data| data.parent).ok().flatten()
	}

	/// Children in order.
	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.with_node(node, |data| data.children.clone())
			.unwrap_or_default()
	}

	/// Element children in order, skipping text nodes.
	pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
		let nodes = self.0.nodes.borrow();
		let Some(data) = nodes.get(node.0) else {
			return Vec::new();
		};
		data.children
			.iter()
			.copied()
			.filter(|child| matches!(nodes[child.0].kind, NodeKind::Element { .. }))
			.collect()
	}

	/// First child, if any.
	pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
		self.with_node(node, |data| data.children.first().copied())
			.ok()
			.flatten()
	}

	/// Whether the node is connected to [`Document::root`].
	pub fn is_connected(&self, node: NodeId) -> bool {
		let nodes = self.0.nodes.borrow();
		let mut current = Some(node);
		while let Some(id) = current {
			if id == self.0.root {
				return true;
			}
			current = nodes.get(id.0).and_then(|data| data.parent);
		}
		false
	}

	// ========================================================================
	// Structure
	// ========================================================================

	/// Appends `child` to `parent`, moving it out of its current parent.
	pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
		self.insert_before(parent, child, None)
	}

	/// Inserts `child` into `parent` before `reference`, or at the end when
	/// `reference` is `None`.
	pub fn insert_before(
		&self,
		parent: NodeId,
		child: NodeId,
		reference: Option<NodeId>,
	) -> Result<(), DomError> {
		self.check_insertion(parent, child, reference)?;
		if reference == Some(child) {
			return Ok(());
		}

		if let Some(old_parent) = self.parent(child) {
			self.unlink(old_parent, child)?;
		}

		{
			let mut nodes = self.0.nodes.borrow_mut();
			let siblings = &mut nodes[parent.0].children;
			let position = reference
				.and_then(|r| siblings.iter().position(|c| *c == r))
				.unwrap_or(siblings.len());
			siblings.insert(position, child);
			nodes[child.0].parent = Some(parent);
		}

		if self.is_connected(parent) {
			self.fire(child, Phase::Attach);
		}
		Ok(())
	}

	/// Replaces `old_child` with `new_child`.
	pub fn replace_child(
		&self,
		parent: NodeId,
		new_child: NodeId,
		old_child: NodeId,
	) -> Result<(), DomError> {
		if new_child == old_child {
			return self.ensure_child(parent, old_child);
		}
		self.insert_before(parent, new_child, Some(old_child))?;
		self.remove_child(parent, old_child)
	}

	/// Removes `child` from `parent`.
	pub fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
		self.ensure_child(parent, child)?;
		self.unlink(parent, child)
	}

	/// Removes every child of `parent`.
	pub fn clear_children(&self, parent: NodeId) -> Result<(), DomError> {
		for child in self.with_node(parent, |data| data.children.clone())? {
			self.unlink(parent, child)?;
		}
		Ok(())
	}

	fn ensure_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
		self.with_node(child, |_| ())?;
		if self.parent(child) == Some(parent) {
			Ok(())
		} else {
			Err(DomError::NotAChild { parent, child })
		}
	}

	fn check_insertion(
		&self,
		parent: NodeId,
		child: NodeId,
		reference: Option<NodeId>,
	) -> Result<(), DomError> {
		let nodes = self.0.nodes.borrow();
		let parent_data = nodes.get(parent.0).ok_or(DomError::UnknownNode(parent))?;
		nodes.get(child.0).ok_or(DomError::UnknownNode(child))?;
		if matches!(parent_data.kind, NodeKind::Text(_)) {
			return Err(DomError::NotAnElement(parent));
		}
		if child == self.0.root {
			return Err(DomError::HierarchyRequest { parent, child });
		}
		if let Some(reference) = reference {
			let data = nodes.get(reference.0).ok_or(DomError::UnknownNode(reference))?;
			if data.parent != Some(parent) {
				return Err(DomError::NotAChild {
					parent,
					child: reference,
				});
			}
		}
		let mut ancestor = Some(parent);
		while let Some(id) = ancestor {
			if id == child {
				return Err(DomError::HierarchyRequest { parent, child });
			}
			ancestor = nodes[id.0].parent;
		}
		Ok(())
	}

	fn unlink(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
		let connected = self.is_connected(parent);
		{
			let mut nodes = self.0.nodes.borrow_mut();
			let siblings = &mut nodes[parent.0].children;
			let position = siblings
				.iter()
				.position(|c| *c == child)
				.ok_or(DomError::NotAChild { parent, child })?;
			siblings.remove(position);
			nodes[child.0].parent = None;
		}
		if connected {
			self.fire(child, Phase::Detach);
		}
		Ok(())
	}

	/// Runs the watchers of `phase` for every node of the subtree rooted at
	/// `subtree`, in document order. No borrow is held while they run.
	///
	/// Callbacks may restructure the tree. A watcher is skipped once its node
	/// no longer matches the phase (detached again before its attach watcher
	/// ran, or reattached before its detach watcher ran) or once it has been
	/// unwatched by an earlier callback.
	fn fire(&self, subtree: NodeId, phase: Phase) {
		let pending: Vec<(NodeId, u64, Rc<dyn Fn()>)> = {
			let nodes = self.0.nodes.borrow();
			let mut pending = Vec::new();
			let mut stack = vec![subtree];
			while let Some(id) = stack.pop() {
				let data = &nodes[id.0];
				pending.extend(
					data.watchers
						.iter()
						.filter(|w| w.phase == phase)
						.map(|w| (id, w.seq, Rc::clone(&w.callback))),
				);
				stack.extend(data.children.iter().rev().copied());
			}
			pending
		};
		if !pending.is_empty() {
			tracing::trace!(node = %subtree, ?phase, watchers = pending.len(), "firing watchers");
		}
		let attaching = phase == Phase::Attach;
		for (node, seq, callback) in pending {
			if self.is_connected(node) != attaching {
				continue;
			}
			let registered = self
				.with_node(node, |data| data.watchers.iter().any(|w| w.seq == seq))
				.unwrap_or(false);
			if registered {
				callback();
			}
		}
	}

	// ========================================================================
	// Attributes and text
	// ========================================================================

	/// Sets an attribute, keeping the position of an existing one.
	pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
		self.with_node_mut(node, |data| match &mut data.kind {
			NodeKind::Element { attributes, .. } => {
				match attributes.iter().position(|(key, _)| key == name) {
					Some(index) => attributes[index].1 = value.to_string(),
					None => attributes.push((name.to_string(), value.to_string())),
				}
				Ok(())
			}
			NodeKind::Text(_) => Err(DomError::NotAnElement(node)),
		})?
	}

	/// Reads an attribute.
	pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
		self.with_node(node, |data| match &data.kind {
			NodeKind::Element { attributes, .. } => attributes
				.iter()
				.find(|(key, _)| key == name)
				.map(|(_, value)| value.clone()),
			NodeKind::Text(_) => None,
		})
		.ok()
		.flatten()
	}

	/// Removes an attribute. Returns whether it was present.
	pub fn remove_attribute(&self, node: NodeId, name: &str) -> bool {
		self.with_node_mut(node, |data| match &mut data.kind {
			NodeKind::Element { attributes, .. } => {
				let before = attributes.len();
				attributes.retain(|(key, _)| key != name);
				attributes.len() != before
			}
			NodeKind::Text(_) => false,
		})
		.unwrap_or(false)
	}

	/// All attributes in order.
	pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
		self.with_node(node, |data| match &data.kind {
			NodeKind::Element { attributes, .. } => attributes.clone(),
			NodeKind::Text(_) => Vec::new(),
		})
		.unwrap_or_default()
	}

	/// Adds `class` to the element's class list if it is not there yet.
	pub fn add_class(&self, node: NodeId, class: &str) -> Result<(), DomError> {
		let current = self.get_attribute(node, "class").unwrap_or_default();
		if current.split_whitespace().any(|c| c == class) {
			return Ok(());
		}
		let updated = if current.trim().is_empty() {
			class.to_string()
		} else {
			format!("{} {}", current.trim_end(), class)
		};
		self.set_attribute(node, "class", &updated)
	}

	/// Whether the element's class list contains `class`.
	pub fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.get_attribute(node, "class")
			.is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
	}

	/// Replaces the data of a text node.
	pub fn set_text(&self, node: NodeId, text: &str) -> Result<(), DomError> {
		self.with_node_mut(node, |data| match &mut data.kind {
			NodeKind::Text(current) => {
				if current != text {
					*current = text.to_string();
				}
				Ok(())
			}
			NodeKind::Element { .. } => Err(DomError::NotAText(node)),
		})?
	}

	/// Data of a text node.
	pub fn text(&self, node: NodeId) -> Option<String> {
		self.with_node(node, |data| match &data.kind {
			NodeKind::Text(text) => Some(text.clone()),
			NodeKind::Element { .. } => None,
		})
		.ok()
		.flatten()
	}

	// ========================================================================
	// Attachment tracker
	// ========================================================================

	/// Runs `callback` every time `node` becomes connected to the root.
	pub fn on_attach(&self, node: NodeId, callback: impl Fn() + 'static) -> Result<WatchId, DomError> {
		self.watch(node, Phase::Attach, Rc::new(callback))
	}

	/// Runs `callback` every time `node` stops being connected to the root.
	pub fn on_detach(&self, node: NodeId, callback: impl Fn() + 'static) -> Result<WatchId, DomError> {
		self.watch(node, Phase::Detach, Rc::new(callback))
	}

	fn watch(&self, node: NodeId, phase: Phase, callback: Rc<dyn Fn()>) -> Result<WatchId, DomError> {
		let seq = self.next_seq();
		self.with_node_mut(node, |data| {
			data.watchers.push(Watcher {
				seq,
				phase,
				callback,
			})
		})?;
		Ok(WatchId { node, seq })
	}

	/// Removes a watcher. Returns false when it was already removed.
	pub fn unwatch(&self, id: WatchId) -> bool {
		self.with_node_mut(id.node, |data| {
			let before = data.watchers.len();
			data.watchers.retain(|w| w.seq != id.seq);
			data.watchers.len() != before
		})
		.unwrap_or(false)
	}

	/// Number of watchers registered on `node`.
	pub fn watcher_count(&self, node: NodeId) -> usize {
		self.with_node(node, |data| data.watchers.len()).unwrap_or(0)
	}

	// ========================================================================
	// Events
	// ========================================================================

	/// Registers a listener for `kind` events on `node`.
	pub fn add_event_listener(
		&self,
		node: NodeId,
		kind: &str,
		callback: impl Into<Callback>,
	) -> Result<ListenerId, DomError> {
		let seq = self.next_seq();
		let listener = Listener {
			seq,
			kind: kind.to_string(),
			callback: callback.into(),
		};
		self.with_node_mut(node, |data| data.listeners.push(listener))?;
		Ok(ListenerId {
			target: ListenerTarget::Node(node),
			seq,
		})
	}

	/// Registers a window-level listener.
	pub fn add_window_listener(&self, kind: &str, callback: impl Into<Callback>) -> ListenerId {
		let seq = self.next_seq();
		self.0.window_listeners.borrow_mut().push(Listener {
			seq,
			kind: kind.to_string(),
			callback: callback.into(),
		});
		ListenerId {
			target: ListenerTarget::Window,
			seq,
		}
	}

	/// Removes a listener. Returns false when it was already removed.
	pub fn remove_event_listener(&self, id: ListenerId) -> bool {
		fn remove(listeners: &mut Vec<Listener>, seq: u64) -> bool {
			let before = listeners.len();
			listeners.retain(|l| l.seq != seq);
			listeners.len() != before
		}
		match id.target {
			ListenerTarget::Node(node) => self
				.with_node_mut(node, |data| remove(&mut data.listeners, id.seq))
				.unwrap_or(false),
			ListenerTarget::Window => remove(&mut self.0.window_listeners.borrow_mut(), id.seq),
		}
	}

	/// Number of listeners on `node` for `kind`.
	pub fn listener_count(&self, node: NodeId, kind: &str) -> usize {
		self.with_node(node, |data| {
			data.listeners.iter().filter(|l| l.kind == kind).count()
		})
		.unwrap_or(0)
	}

	/// Number of window listeners for `kind`.
	pub fn window_listener_count(&self, kind: &str) -> usize {
		self.0
			.window_listeners
			.borrow()
			.iter()
			.filter(|l| l.kind == kind)
			.count()
	}

	fn listeners_for(&self, target: ListenerTarget, kind: &str) -> Vec<(u64, Callback)> {
		let collect = |listeners: &[Listener]| -> Vec<(u64, Callback)> {
			listeners
				.iter()
				.filter(|l| l.kind == kind)
				.map(|l| (l.seq, l.callback.clone()))
				.collect()
		};
		match target {
			ListenerTarget::Node(node) => self
				.with_node(node, |data| collect(data.listeners.as_slice()))
				.unwrap_or_default(),
			ListenerTarget::Window => collect(self.0.window_listeners.borrow().as_slice()),
		}
	}

	fn is_listening(&self, target: ListenerTarget, seq: u64) -> bool {
		match target {
			ListenerTarget::Node(node) => self
				.with_node(node, |data| data.listeners.iter().any(|l| l.seq == seq))
				.unwrap_or(false),
			ListenerTarget::Window => self
				.0
				.window_listeners
				.borrow()
				.iter()
				.any(|l| l.seq == seq),
		}
	}

	/// Runs the listeners of one target. Returns false when propagation was
	/// stopped.
	fn invoke(&self, target: ListenerTarget, event: &Event) -> bool {
		event.set_current_target(match target {
			ListenerTarget::Node(node) => Some(node),
			ListenerTarget::Window => None,
		});
		for (seq, callback) in self.listeners_for(target, event.kind()) {
			if self.is_listening(target, seq) {
				callback.call(event);
			}
		}
		!event.propagation_stopped()
	}

	/// Dispatches `event` on `target`.
	///
	/// Bubbling events visit the target, each ancestor, and then the window
	/// when the target is connected. Returns false when a listener prevented
	/// the default action.
	pub fn dispatch_event(&self, target: NodeId, event: &Event) -> Result<bool, DomError> {
		self.with_node(target, |_| ())?;
		event.set_target(Some(target));

		let path: Vec<NodeId> = if event.bubbles() {
			let nodes = self.0.nodes.borrow();
			let mut path = Vec::new();
			let mut current = Some(target);
			while let Some(id) = current {
				path.push(id);
				current = nodes[id.0].parent;
			}
			path
		} else {
			vec![target]
		};
		let reaches_window = event.bubbles() && path.last() == Some(&self.0.root);

		let mut propagating = true;
		for node in path {
			if !self.invoke(ListenerTarget::Node(node), event) {
				propagating = false;
				break;
			}
		}
		if propagating && reaches_window {
			self.invoke(ListenerTarget::Window, event);
		}
		event.set_current_target(None);
		Ok(!event.default_prevented())
	}

	/// Dispatches `event` to window listeners only.
	pub fn dispatch_window_event(&self, event: &Event) -> bool {
		event.set_target(None);
		self.invoke(ListenerTarget::Window, event);
		event.set_current_target(None);
		!event.default_prevented()
	}

	/// Simulates a user click on `node`.
	///
	/// Dispatches a bubbling `click`; unless a listener prevented the default
	/// action, the nearest anchor with an `href` (the node or an ancestor)
	/// triggers a native navigation. Returns false when the default action
	/// was prevented.
	pub fn click(&self, node: NodeId) -> Result<bool, DomError> {
		let event = Event::bubbling("click");
		if !self.dispatch_event(node, &event)? {
			return Ok(false);
		}

		let mut current = Some(node);
		while let Some(id) = current {
			if self.tag_name(id).as_deref() == Some("a") {
				if let Some(href) = self.get_attribute(id, "href") {
					self.navigate(&href)?;
				}
				break;
			}
			current = self.parent(id);
		}
		Ok(true)
	}

	pub(crate) fn mark_route_root(&self, container: NodeId) -> bool {
		self.0.route_roots.borrow_mut().insert(container)
	}

	pub(crate) fn has_route_root_above(&self, node: NodeId) -> bool {
		let roots = self.0.route_roots.borrow();
		let mut current = self.parent(node);
		while let Some(id) = current {
			if roots.contains(&id) {
				return true;
			}
			current = self.parent(id);
		}
		false
	}

	// ========================================================================
	// Tasks
	// ========================================================================

	/// Queues a future on the document's local executor.
	///
	/// Tasks only make progress inside [`Document::run_until_stalled`].
	pub fn spawn_local(&self, future: impl Future<Output = ()> + 'static) -> Result<(), DomError> {
		self.0
			.spawner
			.spawn_local(future)
			.map_err(|error| DomError::Spawn(error.to_string()))
	}

	/// Polls queued tasks until none of them can make progress.
	///
	/// Calling it from inside a running task does nothing.
	pub fn run_until_stalled(&self) {
		match self.0.pool.try_borrow_mut() {
			Ok(mut pool) => pool.run_until_stalled(),
			Err(_) => tracing::warn!("run_until_stalled called from inside a task"),
		}
	}
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("nodes", &self.0.nodes.borrow().len())
			.field("headless", &self.0.headless)
			.field("location", &self.location().as_str())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn doc() -> Document {
		Document::new()
	}

	fn log() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Rc<dyn Fn()>) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let sink = log.clone();
		(log, move |label: &str| {
			let sink = sink.clone();
			let label = label.to_string();
			Rc::new(move || sink.borrow_mut().push(label.clone())) as Rc<dyn Fn()>
		})
	}

	#[rstest]
	fn test_append_and_remove_update_parent(doc: Document) {
		let div = doc.create_element("DIV");
		let text = doc.create_text("hi");

		doc.append_child(div, text).unwrap();

		assert_eq!(doc.tag_name(div).as_deref(), Some("div"));
		assert_eq!(doc.parent(text), Some(div));
		assert_eq!(doc.children(div), vec![text]);

		doc.remove_child(div, text).unwrap();
		assert_eq!(doc.parent(text), None);
		assert!(doc.children(div).is_empty());
	}

	#[rstest]
	fn test_insert_before_positions_child(doc: Document) {
		let list = doc.create_element("ul");
		let a = doc.create_element("li");
		let b = doc.create_element("li");
		let c = doc.create_element("li");
		doc.append_child(list, a).unwrap();
		doc.append_child(list, c).unwrap();

		doc.insert_before(list, b, Some(c)).unwrap();

		assert_eq!(doc.children(list), vec![a, b, c]);
	}

	#[rstest]
	fn test_append_moves_between_parents(doc: Document) {
		let first = doc.create_element("div");
		let second = doc.create_element("div");
		let child = doc.create_text("x");
		doc.append_child(first, child).unwrap();

		doc.append_child(second, child).unwrap();

		assert!(doc.children(first).is_empty());
		assert_eq!(doc.children(second), vec![child]);
	}

	#[rstest]
	fn test_remove_foreign_child_fails(doc: Document) {
		let parent = doc.create_element("div");
		let other = doc.create_text("x");

		assert_eq!(
			doc.remove_child(parent, other),
			Err(DomError::NotAChild {
				parent,
				child: other
			})
		);
	}

	#[rstest]
	fn test_cycle_is_rejected(doc: Document) {
		let outer = doc.create_element("div");
		let inner = doc.create_element("div");
		doc.append_child(outer, inner).unwrap();

		assert!(matches!(
			doc.append_child(inner, outer),
			Err(DomError::HierarchyRequest { .. })
		));
		assert!(matches!(
			doc.append_child(inner, doc.root()),
			Err(DomError::HierarchyRequest { .. })
		));
	}

	#[rstest]
	fn test_text_cannot_have_children(doc: Document) {
		let text = doc.create_text("a");
		let other = doc.create_text("b");

		assert_eq!(doc.append_child(text, other), Err(DomError::NotAnElement(text)));
	}

	#[rstest]
	fn test_attach_fires_for_whole_subtree_in_order(doc: Document) {
		let (log, make) = log();
		let outer = doc.create_element("div");
		let inner = doc.create_element("span");
		let text = doc.create_text("x");
		doc.append_child(inner, text).unwrap();
		doc.append_child(outer, inner).unwrap();
		for (node, label) in [(outer, "outer"), (inner, "inner"), (text, "text")] {
			let callback = make(label);
			doc.on_attach(node, move || callback()).unwrap();
		}

		doc.append_child(doc.root(), outer).unwrap();

		assert_eq!(*log.borrow(), vec!["outer", "inner", "text"]);
	}

	#[rstest]
	fn test_detached_containers_never_fire(doc: Document) {
		let (log, make) = log();
		let scratch = doc.create_element("div");
		let text = doc.create_text("x");
		let attach = make("attach");
		let detach = make("detach");
		doc.on_attach(text, move || attach()).unwrap();
		doc.on_detach(text, move || detach()).unwrap();

		doc.append_child(scratch, text).unwrap();
		doc.remove_child(scratch, text).unwrap();

		assert!(log.borrow().is_empty());
	}

	#[rstest]
	fn test_move_within_live_tree_fires_detach_then_attach(doc: Document) {
		let (log, make) = log();
		let a = doc.create_element("div");
		let b = doc.create_element("div");
		let text = doc.create_text("x");
		doc.append_child(doc.root(), a).unwrap();
		doc.append_child(doc.root(), b).unwrap();
		doc.append_child(a, text).unwrap();
		let attach = make("attach");
		let detach = make("detach");
		doc.on_attach(text, move || attach()).unwrap();
		doc.on_detach(text, move || detach()).unwrap();

		doc.append_child(b, text).unwrap();

		assert_eq!(*log.borrow(), vec!["detach", "attach"]);
	}

	#[rstest]
	fn test_attach_skips_nodes_removed_by_earlier_watcher(doc: Document) {
		let (log, make) = log();
		let outer = doc.create_element("div");
		let first = doc.create_text("a");
		let second = doc.create_text("b");
		doc.append_child(outer, first).unwrap();
		doc.append_child(outer, second).unwrap();
		let remover = doc.clone();
		let first_callback = make("first");
		doc.on_attach(first, move || {
			first_callback();
			remover.remove_child(outer, second).unwrap();
		})
		.unwrap();
		let second_callback = make("second");
		doc.on_attach(second, move || second_callback()).unwrap();

		doc.append_child(doc.root(), outer).unwrap();

		assert_eq!(*log.borrow(), vec!["first"]);
		assert!(!doc.is_connected(second));
	}

	#[rstest]
	fn test_watcher_unwatched_by_earlier_watcher_does_not_fire(doc: Document) {
		let (log, make) = log();
		let outer = doc.create_element("div");
		let text = doc.create_text("x");
		doc.append_child(outer, text).unwrap();
		let later = Rc::new(RefCell::new(None));
		let handle = Rc::clone(&later);
		let remover = doc.clone();
		doc.on_attach(outer, move || {
			if let Some(id) = handle.borrow_mut().take() {
				remover.unwatch(id);
			}
		})
		.unwrap();
		let callback = make("text");
		*later.borrow_mut() = Some(doc.on_attach(text, move || callback()).unwrap());

		doc.append_child(doc.root(), outer).unwrap();

		assert!(log.borrow().is_empty());
	}

	#[rstest]
	fn test_unwatch_stops_callbacks(doc: Document) {
		let (log, make) = log();
		let text = doc.create_text("x");
		let callback = make("attach");
		let id = doc.on_attach(text, move || callback()).unwrap();

		assert!(doc.unwatch(id));
		assert!(!doc.unwatch(id));
		doc.append_child(doc.root(), text).unwrap();

		assert!(log.borrow().is_empty());
		assert_eq!(doc.watcher_count(text), 0);
	}

	#[rstest]
	fn test_event_bubbles_to_window(doc: Document) {
		let order = Rc::new(RefCell::new(Vec::new()));
		let outer = doc.create_element("div");
		let button = doc.create_element("button");
		doc.append_child(outer, button).unwrap();
		doc.append_child(doc.root(), outer).unwrap();

		for (node, label) in [(button, "button"), (outer, "outer")] {
			let order = order.clone();
			doc.add_event_listener(node, "click", move |_: &Event| order.borrow_mut().push(label))
				.unwrap();
		}
		let window_order = order.clone();
		doc.add_window_listener("click", move |_: &Event| window_order.borrow_mut().push("window"));

		doc.click(button).unwrap();

		assert_eq!(*order.borrow(), vec!["button", "outer", "window"]);
	}

	#[rstest]
	fn test_stop_propagation_halts_bubbling(doc: Document) {
		let hits = Rc::new(Cell::new(0));
		let outer = doc.create_element("div");
		let inner = doc.create_element("span");
		doc.append_child(outer, inner).unwrap();
		doc.add_event_listener(inner, "click", |event: &Event| event.stop_propagation())
			.unwrap();
		let counter = hits.clone();
		doc.add_event_listener(outer, "click", move |_: &Event| counter.set(counter.get() + 1))
			.unwrap();

		doc.click(inner).unwrap();

		assert_eq!(hits.get(), 0);
	}

	#[rstest]
	fn test_detached_event_skips_window(doc: Document) {
		let hits = Rc::new(Cell::new(0));
		let orphan = doc.create_element("div");
		let counter = hits.clone();
		doc.add_window_listener("click", move |_: &Event| counter.set(counter.get() + 1));

		doc.click(orphan).unwrap();

		assert_eq!(hits.get(), 0);
	}

	#[rstest]
	fn test_removed_listener_is_not_called(doc: Document) {
		let hits = Rc::new(Cell::new(0));
		let button = doc.create_element("button");
		let counter = hits.clone();
		let id = doc
			.add_event_listener(button, "click", move |_: &Event| counter.set(counter.get() + 1))
			.unwrap();

		assert!(doc.remove_event_listener(id));
		doc.click(button).unwrap();

		assert_eq!(hits.get(), 0);
		assert_eq!(doc.listener_count(button, "click"), 0);
	}

	#[rstest]
	fn test_click_on_anchor_navigates_natively(doc: Document) {
		let anchor = doc.create_element("a");
		doc.set_attribute(anchor, "href", "/docs").unwrap();
		doc.append_child(doc.root(), anchor).unwrap();

		assert!(doc.click(anchor).unwrap());

		assert_eq!(doc.location().path(), "/docs");
		assert_eq!(doc.native_navigations().len(), 1);
	}

	#[rstest]
	fn test_attributes_keep_order_and_classes_dedupe(doc: Document) {
		let div = doc.create_element("div");
		doc.set_attribute(div, "id", "a").unwrap();
		doc.set_attribute(div, "title", "t").unwrap();
		doc.set_attribute(div, "id", "b").unwrap();
		doc.add_class(div, "x").unwrap();
		doc.add_class(div, "x").unwrap();
		doc.add_class(div, "y").unwrap();

		assert_eq!(
			doc.attributes(div),
			vec![
				("id".to_string(), "b".to_string()),
				("title".to_string(), "t".to_string()),
				("class".to_string(), "x y".to_string()),
			]
		);
		assert!(doc.has_class(div, "y"));
		assert!(doc.remove_attribute(div, "title"));
	}

	#[rstest]
	fn test_spawned_tasks_run_when_driven(doc: Document) {
		let done = Rc::new(Cell::new(false));
		let flag = done.clone();
		doc.spawn_local(async move { flag.set(true) }).unwrap();

		assert!(!done.get());
		doc.run_until_stalled();
		assert!(done.get());
	}
}
