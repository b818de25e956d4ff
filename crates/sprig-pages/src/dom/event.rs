//! Events dispatched through a [`Document`](super::Document).
//!
//! An [`Event`] is created by the caller and handed to
//! [`Document::dispatch_event`](super::Document::dispatch_event) by
//! reference. Listeners observe and mutate the flags through shared
//! references, so the flags live in `Cell`s.

use std::cell::Cell;

use super::document::NodeId;

/// Name of the custom event fired by intercepted same-origin anchors.
pub const ROUTE_EVENT: &str = "route";

/// Name of the window event fired by history traversal.
pub const POPSTATE_EVENT: &str = "popstate";

/// Payload carried by custom events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
	/// A client-side navigation request.
	Route {
		/// The raw `href` of the anchor that was clicked.
		href: String,
	},
}

/// A dispatched event.
#[derive(Debug)]
pub struct Event {
	kind: String,
	bubbles: bool,
	detail: Option<EventDetail>,
	target: Cell<Option<NodeId>>,
	current_target: Cell<Option<NodeId>>,
	default_prevented: Cell<bool>,
	propagation_stopped: Cell<bool>,
}

impl Event {
	/// Creates a non-bubbling event.
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			bubbles: false,
			detail: None,
			target: Cell::new(None),
			current_target: Cell::new(None),
			default_prevented: Cell::new(false),
			propagation_stopped: Cell::new(false),
		}
	}

	/// Creates an event that bubbles to the document root and then to the
	/// window.
	pub fn bubbling(kind: impl Into<String>) -> Self {
		Self {
			bubbles: true,
			..Self::new(kind)
		}
	}

	/// Creates a bubbling event carrying `detail`.
	pub fn custom(kind: impl Into<String>, detail: EventDetail) -> Self {
		Self {
			detail: Some(detail),
			..Self::bubbling(kind)
		}
	}

	/// The event name, e.g. `"click"`.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Whether the event bubbles.
	pub fn bubbles(&self) -> bool {
		self.bubbles
	}

	/// Custom payload, if any.
	pub fn detail(&self) -> Option<&EventDetail> {
		self.detail.as_ref()
	}

	/// The `href` of a route event.
	pub fn route_href(&self) -> Option<&str> {
		match &self.detail {
			Some(EventDetail::Route { href }) => Some(href),
			None => None,
		}
	}

	/// Node the event was dispatched on. `None` for window events.
	pub fn target(&self) -> Option<NodeId> {
		self.target.get()
	}

	/// Node whose listener is currently running. `None` while window
	/// listeners run.
	pub fn current_target(&self) -> Option<NodeId> {
		self.current_target.get()
	}

	/// Suppresses the default action (native anchor navigation).
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	/// Returns true once any listener called [`Event::prevent_default`].
	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}

	/// Stops the event from reaching listeners further up the path.
	/// Listeners on the current node still run.
	pub fn stop_propagation(&self) {
		self.propagation_stopped.set(true);
	}

	pub(crate) fn propagation_stopped(&self) -> bool {
		self.propagation_stopped.get()
	}

	pub(crate) fn set_target(&self, target: Option<NodeId>) {
		self.target.set(target);
	}

	pub(crate) fn set_current_target(&self, target: Option<NodeId>) {
		self.current_target.set(target);
	}
}
