//! Mount engine.
//!
//! Materializes a [`Node`] tree into a [`Document`] and wires reactivity:
//!
//! - signal-bound text and attributes subscribe while their node is attached
//!   and unsubscribe when it is detached, so detached output never receives
//!   notifications and re-attached output picks them up again;
//! - `on*` attributes become event listeners;
//! - `style` stylesheets add their class and, in interactive documents, are
//!   adopted;
//! - anchors intercept same-origin clicks and dispatch a bubbling `route`
//!   event instead of navigating;
//! - components, conditionals and routers mount themselves;
//! - future leaves are spawned on the document's task pool and mounted into
//!   the same container once resolved. Several pending futures in one
//!   container end up in resolution order.
//!
//! The tree is walked with an explicit work stack, so depth is bounded by
//! memory rather than by the call stack.

use std::cell::Cell;
use std::rc::Rc;

use sprig_core::{AnySignal, SubscriptionId};

use super::node::{AttrValue, Node, PendingNode};
use crate::dom::{Document, DomError, Event, EventDetail, NodeId, ROUTE_EVENT};
use crate::{debug_log, error_log, warn_log};

/// Errors raised while mounting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
	/// A document operation failed.
	#[error(transparent)]
	Dom(#[from] DomError),

	/// A stylesheet was bound to an attribute other than `style`.
	#[error("only style supported for stylesheet values, got `{key}`")]
	StyleAttribute {
		/// The offending attribute key.
		key: String,
	},

	/// The live output to replace is no longer in the tree.
	#[error("node {0} has no parent to mount into")]
	DetachedTarget(NodeId),
}

/// Options for [`mount_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountOptions {
	/// Remove the container's children before mounting.
	pub replace: bool,
}

impl MountOptions {
	/// Options that clear the container first.
	pub fn replace() -> Self {
		Self { replace: true }
	}
}

/// Mounts `node` at the end of `container`.
///
/// The container also becomes a navigation root: `route` events bubbling
/// out of intercepted anchors below it push a history entry. Returns the
/// top-level nodes that were appended synchronously.
///
/// # Example
///
/// ```
/// use sprig_core::Signal;
/// use sprig_pages::builder::html::{button, p};
/// use sprig_pages::component::{Node, mount};
/// use sprig_pages::dom::Document;
///
/// let doc = Document::new();
/// let count = Signal::new(0);
/// let increment = {
///     let count = count.clone();
///     move |_: &sprig_pages::dom::Event| count.update(|n| *n += 1)
/// };
/// let template = Node::from((p().child(&count), button().on("click", increment).child("+")));
///
/// let nodes = mount(&doc, doc.root(), &template)?;
/// assert_eq!(doc.inner_html(doc.root()), "<p>0</p><button>+</button>");
///
/// doc.click(nodes[1])?;
/// assert_eq!(doc.inner_html(doc.root()), "<p>1</p><button>+</button>");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn mount(document: &Document, container: NodeId, node: &Node) -> Result<Vec<NodeId>, MountError> {
	mount_with(document, container, node, MountOptions::default())
}

/// Mounts `node` into `container` with explicit options.
pub fn mount_with(
	document: &Document,
	container: NodeId,
	node: &Node,
	options: MountOptions,
) -> Result<Vec<NodeId>, MountError> {
	if options.replace {
		document.clear_children(container)?;
	}
	install_route_listener(document, container)?;
	let nodes = materialize(document, container, None, node)?;
	tracing::debug!(container = %container, nodes = nodes.len(), "mounted template");
	Ok(nodes)
}

enum Task<'a> {
	Visit {
		parent: NodeId,
		before: Option<NodeId>,
		node: &'a Node,
		top: bool,
	},
	Attach {
		parent: NodeId,
		before: Option<NodeId>,
		child: NodeId,
		top: bool,
	},
}

/// Inserts the output of `node` into `parent` ahead of `before` (at the end
/// when `None`) and returns the top-level nodes inserted synchronously.
///
/// Elements are inserted after their children have been built, so a
/// subtree joins the live tree in one structural change.
pub(crate) fn materialize(
	document: &Document,
	parent: NodeId,
	before: Option<NodeId>,
	node: &Node,
) -> Result<Vec<NodeId>, MountError> {
	let mut mounted = Vec::new();
	let mut stack = vec![Task::Visit {
		parent,
		before,
		node,
		top: true,
	}];

	while let Some(task) = stack.pop() {
		match task {
			Task::Attach {
				parent,
				before,
				child,
				top,
			} => {
				document.insert_before(parent, child, before)?;
				if top {
					mounted.push(child);
				}
			}
			Task::Visit {
				parent,
				before,
				node,
				top,
			} => match node {
				Node::Empty => {}
				Node::Text(text) => {
					let child = document.create_text(text);
					stack.push(Task::Attach {
						parent,
						before,
						child,
						top,
					});
				}
				Node::Signal(signal) => {
					let child = document.create_text(&signal.render());
					bind_signal(document, child, signal, move |doc, text| {
						if let Err(error) = doc.set_text(child, text) {
							error_log!("failed to update text {}: {}", child, error);
						}
					})?;
					stack.push(Task::Attach {
						parent,
						before,
						child,
						top,
					});
				}
				Node::Element(element) => {
					let child = document.create_element(element.tag_name());
					for (key, value) in element.attrs() {
						apply_attribute(document, child, key, value)?;
					}
					if element.tag_name().eq_ignore_ascii_case("a") {
						intercept_anchor(document, child)?;
					}
					stack.push(Task::Attach {
						parent,
						before,
						child,
						top,
					});
					stack.extend(element.child_nodes().iter().rev().map(|node| Task::Visit {
						parent: child,
						before: None,
						node,
						top: false,
					}));
				}
				Node::Fragment(children) => {
					stack.extend(children.iter().rev().map(|node| Task::Visit {
						parent,
						before,
						node,
						top,
					}));
				}
				Node::Future(pending) => {
					let marker = spawn_pending(document, parent, before, pending)?;
					stack.push(Task::Attach {
						parent,
						before,
						child: marker,
						top: false,
					});
				}
				Node::Component(component) => {
					let nodes = component.mount(document, parent, before)?;
					if top {
						mounted.extend(nodes);
					}
				}
				Node::Conditional(conditional) => {
					let nodes = conditional.mount(document, parent, before)?;
					if top {
						mounted.extend(nodes);
					}
				}
				Node::Router(router) => {
					let nodes = router.mount(document, parent, before)?;
					if top {
						mounted.extend(nodes);
					}
				}
			},
		}
	}

	debug_log!("materialized {} top-level nodes into {}", mounted.len(), parent);
	Ok(mounted)
}

/// Keeps `node` in sync with `signal` while it is attached. The subscription
/// is created on attach and released on detach; a repeated attach does not
/// subscribe twice.
fn bind_signal(
	document: &Document,
	node: NodeId,
	signal: &AnySignal,
	apply: impl Fn(&Document, &str) + 'static,
) -> Result<(), MountError> {
	let apply: Rc<dyn Fn(&Document, &str)> = Rc::new(apply);
	let slot: Rc<Cell<Option<SubscriptionId>>> = Rc::default();

	{
		let slot = slot.clone();
		let signal = signal.clone();
		let weak = document.downgrade();
		document.on_attach(node, move || {
			if slot.get().is_some() {
				return;
			}
			let weak = weak.clone();
			let apply = apply.clone();
			let id = signal.subscribe(move |text| {
				if let Some(doc) = weak.upgrade() {
					apply(&doc, text);
				}
			});
			slot.set(Some(id));
		})?;
	}

	let signal = signal.clone();
	document.on_detach(node, move || {
		if let Some(id) = slot.take() {
			signal.unsubscribe(id);
		}
	})?;
	Ok(())
}

fn apply_attribute(
	document: &Document,
	element: NodeId,
	key: &str,
	value: &AttrValue,
) -> Result<(), MountError> {
	match value {
		AttrValue::Text(text) => document.set_attribute(element, key, text)?,
		AttrValue::Bool(true) => document.set_attribute(element, key, "")?,
		AttrValue::Bool(false) => {}
		AttrValue::Signal(signal) => {
			document.set_attribute(element, key, &signal.render())?;
			let name = key.to_string();
			bind_signal(document, element, signal, move |doc, text| {
				if let Err(error) = doc.set_attribute(element, &name, text) {
					error_log!("failed to update attribute `{}`: {}", name, error);
				}
			})?;
		}
		AttrValue::Handler(callback) => {
			let event = key.strip_prefix("on").unwrap_or(key).to_ascii_lowercase();
			document.add_event_listener(element, &event, callback.clone())?;
		}
		AttrValue::Style(sheet) => {
			if key != "style" {
				return Err(MountError::StyleAttribute {
					key: key.to_string(),
				});
			}
			document.add_class(element, sheet.class_name())?;
			if !document.is_headless() {
				document.adopt_style_sheet(sheet);
			}
		}
	}
	Ok(())
}

/// Turns same-origin anchor clicks into `route` events.
fn intercept_anchor(document: &Document, anchor: NodeId) -> Result<(), MountError> {
	let weak = document.downgrade();
	document.add_event_listener(anchor, "click", move |event: &Event| {
		let Some(doc) = weak.upgrade() else {
			return;
		};
		let Some(href) = doc.get_attribute(anchor, "href") else {
			return;
		};
		match doc.resolve_url(&href) {
			Ok(url) if doc.is_same_origin(&url) => {}
			_ => return,
		}

		event.prevent_default();
		let route = Event::custom(ROUTE_EVENT, EventDetail::Route { href });
		if let Err(error) = doc.dispatch_event(anchor, &route) {
			error_log!("failed to dispatch route event: {}", error);
		}
	})?;
	Ok(())
}

/// Pushes history for `route` events reaching `container`. Nested
/// navigation roots leave the push to the outermost one.
fn install_route_listener(document: &Document, container: NodeId) -> Result<(), MountError> {
	if !document.mark_route_root(container) {
		return Ok(());
	}
	let weak = document.downgrade();
	document.add_event_listener(container, ROUTE_EVENT, move |event: &Event| {
		let Some(doc) = weak.upgrade() else {
			return;
		};
		let Some(href) = event.route_href() else {
			return;
		};
		if doc.has_route_root_above(container) {
			return;
		}
		match doc.push_state(href) {
			Ok(url) => tracing::debug!(url = %url, "client-side navigation"),
			Err(error) => warn_log!("ignoring navigation to `{}`: {}", href, error),
		}
	})?;
	Ok(())
}

/// Spawns a future leaf. An empty marker text node records where the leaf
/// was mounted; the resolved output lands ahead of `before` only while that
/// marker is still in `parent`, so output whose slot was cleared in the
/// meantime is dropped.
fn spawn_pending(
	document: &Document,
	parent: NodeId,
	before: Option<NodeId>,
	pending: &PendingNode,
) -> Result<NodeId, MountError> {
	let marker = document.create_text("");
	let future = pending.future();
	let weak = document.downgrade();
	document.spawn_local(async move {
		let node = future.await;
		let Some(doc) = weak.upgrade() else {
			return;
		};
		if doc.parent(marker) != Some(parent) {
			debug_log!("dropping resolved future: {} left {}", marker, parent);
			return;
		}
		if let Err(error) = doc.remove_child(parent, marker) {
			warn_log!("failed to remove future marker {}: {}", marker, error);
		}
		if let Some(anchor) = before {
			if doc.parent(anchor) != Some(parent) {
				debug_log!("dropping resolved future: {} left {}", anchor, parent);
				return;
			}
		}
		if let Err(error) = materialize(&doc, parent, before, &node) {
			error_log!("failed to mount resolved future: {}", error);
		}
	})?;
	Ok(marker)
}
