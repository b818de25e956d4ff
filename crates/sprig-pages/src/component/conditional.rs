//! Predicate-driven show/hide.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use sprig_core::{Signal, SignalId, SubscriptionId};

use super::mount::MountError;
use super::node::Node;
use super::slot::Slot;
use crate::dom::{Document, NodeId, WeakDocument};
use crate::{debug_log, error_log};

type Watch = Box<dyn Fn(Box<dyn Fn(bool)>) -> SubscriptionId>;

struct Inner {
	signal: SignalId,
	template: Node,
	evaluate: Box<dyn Fn() -> bool>,
	watch: Watch,
	unwatch: Box<dyn Fn(SubscriptionId)>,
}

/// Shows a template while a predicate over a signal holds.
///
/// Each mount owns a slot that is either empty (hidden) or holds the
/// materialized template (shown). Signal changes that keep the predicate
/// result unchanged do nothing. The subscription is only active while the
/// slot is attached to the document.
///
/// # Example
///
/// ```
/// use sprig_core::Signal;
/// use sprig_pages::builder::html::p;
/// use sprig_pages::component::{Conditional, Node, mount};
/// use sprig_pages::dom::Document;
///
/// let count = Signal::new(0);
/// let doc = Document::new();
/// let view = Conditional::new(&count, |n| *n > 2, p().child("many"));
/// mount(&doc, doc.root(), &Node::from(view))?;
/// assert_eq!(doc.inner_html(doc.root()), "");
///
/// count.set(3);
/// assert_eq!(doc.inner_html(doc.root()), "<p>many</p>");
/// # Ok::<(), sprig_pages::component::MountError>(())
/// ```
#[derive(Clone)]
pub struct Conditional(Rc<Inner>);

impl Conditional {
	/// Shows `template` while `predicate(signal)` is true.
	pub fn new<T: Clone + 'static>(
		signal: &Signal<T>,
		predicate: impl Fn(&T) -> bool + 'static,
		template: impl Into<Node>,
	) -> Self {
		let predicate: Rc<dyn Fn(&T) -> bool> = Rc::new(predicate);

		let evaluate = {
			let (signal, predicate) = (signal.clone(), Rc::clone(&predicate));
			Box::new(move || signal.with(|value| predicate(value)))
		};
		let watch: Watch = {
			let signal = signal.clone();
			Box::new(move |apply: Box<dyn Fn(bool)>| {
				let predicate = Rc::clone(&predicate);
				signal.subscribe(move |value| apply(predicate(value)))
			})
		};
		let unwatch = {
			let signal = signal.clone();
			Box::new(move |id| {
				signal.unsubscribe(id);
			})
		};

		Self(Rc::new(Inner {
			signal: signal.id(),
			template: template.into(),
			evaluate,
			watch,
			unwatch,
		}))
	}

	/// Shows `template` while `signal` is true.
	pub fn when(signal: &Signal<bool>, template: impl Into<Node>) -> Self {
		Self::new(signal, |shown| *shown, template)
	}

	/// The template shown while the predicate holds.
	pub fn template(&self) -> &Node {
		&self.0.template
	}

	pub(crate) fn mount(
		&self,
		document: &Document,
		parent: NodeId,
		before: Option<NodeId>,
	) -> Result<Vec<NodeId>, MountError> {
		let slot = Slot::open(document, parent, before)?;
		let binding = Rc::new(Binding {
			inner: Rc::clone(&self.0),
			document: document.downgrade(),
			slot,
			shown: Cell::new(false),
			subscription: Cell::new(None),
		});
		if (self.0.evaluate)() {
			binding.shown.set(true);
			slot.replace(document, &self.0.template)?;
		}
		binding.track(document)?;
		Ok(slot.nodes(document))
	}
}

impl fmt::Debug for Conditional {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Conditional")
			.field("signal", &self.0.signal)
			.field("template", &self.0.template)
			.finish()
	}
}

/// State of one mounted conditional. Owned by the document's watchers on
/// its slot; the signal subscription only refers to it weakly.
struct Binding {
	inner: Rc<Inner>,
	document: WeakDocument,
	slot: Slot,
	shown: Cell<bool>,
	subscription: Cell<Option<SubscriptionId>>,
}

impl Binding {
	fn track(self: &Rc<Self>, document: &Document) -> Result<(), MountError> {
		let attach = Rc::clone(self);
		document.on_attach(self.slot.start(), move || attach.subscribe())?;
		let detach = Rc::clone(self);
		document.on_detach(self.slot.start(), move || detach.unsubscribe())?;
		if document.is_connected(self.slot.start()) {
			self.subscribe();
		}
		Ok(())
	}

	fn subscribe(self: &Rc<Self>) {
		if self.subscription.get().is_some() {
			return;
		}
		let weak: Weak<Self> = Rc::downgrade(self);
		let id = (self.inner.watch)(Box::new(move |show| {
			if let Some(binding) = weak.upgrade() {
				binding.apply(show);
			}
		}));
		self.subscription.set(Some(id));
	}

	fn unsubscribe(&self) {
		if let Some(id) = self.subscription.take() {
			(self.inner.unwatch)(id);
		}
	}

	fn apply(&self, show: bool) {
		if self.shown.replace(show) == show {
			return;
		}
		let Some(document) = self.document.upgrade() else {
			return;
		};
		let result = if show {
			self.slot.replace(&document, &self.inner.template)
		} else {
			self.slot.clear(&document)
		};
		match result {
			Ok(()) => debug_log!("conditional on {:?} shown: {}", self.inner.signal, show),
			Err(error) => error_log!("failed to toggle conditional: {}", error),
		}
	}
}

impl Drop for Binding {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}
