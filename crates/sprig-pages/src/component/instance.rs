//! Component instances: a render function bound to props.
//!
//! A [`ComponentFactory`] turns props into [`Component`]s. Mounting renders
//! once into a [`Slot`] and fires mount hooks. A change to any watched
//! signal re-renders and replaces the whole slot contents. Detaching the
//! output from the document runs the cleanup hooks once and releases the
//! watched subscriptions. An instance may be mounted again afterwards; its
//! own hooks then fire again.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use sprig_core::{AnySignal, SubscriptionId};

use super::mount::{MountError, materialize};
use super::node::Node;
use super::slot::Slot;
use super::r#trait::Mountable;
use crate::dom::{Document, NodeId, WatchId, WeakDocument};
use crate::{error_log, warn_log};

type Hook = Box<dyn FnOnce()>;
type InstanceHook = Rc<dyn Fn()>;
type Render<P> = Rc<dyn Fn(&P, &Lifecycle) -> Node>;
type Selector<P> = Rc<dyn Fn(&P) -> Vec<AnySignal>>;

/// Handle passed to render functions.
///
/// Hooks registered during the first render of a mount are kept; those
/// registered while re-rendering for an update are discarded.
pub struct Lifecycle {
	document: Document,
	mount: RefCell<Vec<Hook>>,
	cleanup: RefCell<Vec<Hook>>,
}

impl Lifecycle {
	pub(crate) fn new(document: &Document) -> Self {
		Self {
			document: document.clone(),
			mount: RefCell::new(Vec::new()),
			cleanup: RefCell::new(Vec::new()),
		}
	}

	/// The document being rendered into.
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Runs `hook` once the output is in place.
	pub fn on_mount(&self, hook: impl FnOnce() + 'static) {
		self.mount.borrow_mut().push(Box::new(hook));
	}

	/// Runs `hook` once the output is removed from the document.
	pub fn on_cleanup(&self, hook: impl FnOnce() + 'static) {
		self.cleanup.borrow_mut().push(Box::new(hook));
	}

	fn into_hooks(self) -> (Vec<Hook>, Vec<Hook>) {
		(self.mount.into_inner(), self.cleanup.into_inner())
	}
}

impl fmt::Debug for Lifecycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Lifecycle")
			.field("mount", &self.mount.borrow().len())
			.field("cleanup", &self.cleanup.borrow().len())
			.finish()
	}
}

/// Creates [`Component`]s from props.
///
/// # Example
///
/// ```
/// use sprig_core::Signal;
/// use sprig_pages::builder::html::p;
/// use sprig_pages::component::{ComponentFactory, Node, mount};
/// use sprig_pages::dom::Document;
///
/// struct Props {
///     count: Signal<i32>,
/// }
///
/// let counter = ComponentFactory::new(|props: &Props, _| p().child(props.count.get()).into())
///     .watch(|props| vec![props.count.clone().into()]);
///
/// let count = Signal::new(1);
/// let doc = Document::new();
/// mount(&doc, doc.root(), &counter.create(Props { count: count.clone() }).into())?;
/// assert_eq!(doc.inner_html(doc.root()), "<p>1</p>");
///
/// count.set(2);
/// assert_eq!(doc.inner_html(doc.root()), "<p>2</p>");
/// # Ok::<(), sprig_pages::component::MountError>(())
/// ```
pub struct ComponentFactory<P: 'static> {
	name: &'static str,
	render: Render<P>,
	selector: Option<Selector<P>>,
}

impl<P: 'static> ComponentFactory<P> {
	/// Wraps a render function.
	pub fn new(render: impl Fn(&P, &Lifecycle) -> Node + 'static) -> Self {
		Self {
			name: "Component",
			render: Rc::new(render),
			selector: None,
		}
	}

	/// Re-renders instances whenever one of the signals picked out of their
	/// props changes.
	pub fn watch(mut self, selector: impl Fn(&P) -> Vec<AnySignal> + 'static) -> Self {
		self.selector = Some(Rc::new(selector));
		self
	}

	/// Name used in logs and `Debug` output.
	pub fn named(mut self, name: &'static str) -> Self {
		self.name = name;
		self
	}

	/// Creates an unmounted instance. Watched signals are subscribed right
	/// away.
	pub fn create(&self, props: P) -> Component<P> {
		let component = Component(Rc::new(ComponentState {
			name: self.name,
			render: Rc::clone(&self.render),
			selector: self.selector.clone(),
			props: RefCell::new(Rc::new(props)),
			mounted: RefCell::new(None),
			watched: RefCell::new(Vec::new()),
			subscribing: Cell::new(false),
			mount_hooks: RefCell::new(Vec::new()),
			cleanup_hooks: RefCell::new(Vec::new()),
			render_cleanups: RefCell::new(Vec::new()),
		}));
		component.subscribe_watched();
		component
	}
}

impl<P: 'static> Clone for ComponentFactory<P> {
	fn clone(&self) -> Self {
		Self {
			name: self.name,
			render: Rc::clone(&self.render),
			selector: self.selector.clone(),
		}
	}
}

impl<P: 'static> fmt::Debug for ComponentFactory<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentFactory")
			.field("name", &self.name)
			.field("watches", &self.selector.is_some())
			.finish()
	}
}

/// Shorthand for [`ComponentFactory::new`].
pub fn create_component<P: 'static>(
	render: impl Fn(&P, &Lifecycle) -> Node + 'static,
) -> ComponentFactory<P> {
	ComponentFactory::new(render)
}

struct Mounted {
	document: WeakDocument,
	slot: Slot,
	watch: WatchId,
}

struct ComponentState<P: 'static> {
	name: &'static str,
	render: Render<P>,
	selector: Option<Selector<P>>,
	props: RefCell<Rc<P>>,
	mounted: RefCell<Option<Mounted>>,
	watched: RefCell<Vec<(AnySignal, SubscriptionId)>>,
	subscribing: Cell<bool>,
	mount_hooks: RefCell<Vec<InstanceHook>>,
	cleanup_hooks: RefCell<Vec<InstanceHook>>,
	// cleanups registered by the render of the current mount
	render_cleanups: RefCell<Vec<Hook>>,
}

impl<P: 'static> Drop for ComponentState<P> {
	fn drop(&mut self) {
		for (signal, id) in self.watched.get_mut().drain(..) {
			signal.unsubscribe(id);
		}
	}
}

/// A component instance.
///
/// Clones are handles to the same instance. While mounted, the document
/// keeps the instance alive; subscriptions to watched signals only hold it
/// weakly.
pub struct Component<P: 'static>(Rc<ComponentState<P>>);

impl<P: 'static> Component<P> {
	/// Adds a hook run after every mount.
	pub fn on_mount(self, hook: impl Fn() + 'static) -> Self {
		self.0.mount_hooks.borrow_mut().push(Rc::new(hook));
		self
	}

	/// Adds a hook run every time the mounted output is removed.
	pub fn on_cleanup(self, hook: impl Fn() + 'static) -> Self {
		self.0.cleanup_hooks.borrow_mut().push(Rc::new(hook));
		self
	}

	/// The current props.
	pub fn props(&self) -> Rc<P> {
		Rc::clone(&self.0.props.borrow())
	}

	/// Whether the instance has live output.
	pub fn is_mounted(&self) -> bool {
		self.0.mounted.borrow().is_some()
	}

	/// The live output, markers included. Empty when unmounted.
	pub fn output(&self) -> Vec<NodeId> {
		let mounted = self.0.mounted.borrow();
		let Some(mounted) = mounted.as_ref() else {
			return Vec::new();
		};
		match mounted.document.upgrade() {
			Some(document) => mounted.slot.nodes(&document),
			None => Vec::new(),
		}
	}

	/// Replaces the props and re-renders.
	///
	/// The new output is built in place of the old one; the whole previous
	/// output is removed, whatever changed. Does nothing else while
	/// unmounted.
	pub fn update(&self, props: P) -> Result<(), MountError> {
		*self.0.props.borrow_mut() = Rc::new(props);
		if !self.0.watched.borrow().is_empty() {
			self.unsubscribe_watched();
			self.subscribe_watched();
		}
		self.rerender()
	}

	/// Releases the instance: stops watching, forgets the output and runs
	/// the cleanup hooks. The output itself is left in place. Does nothing
	/// when unmounted.
	pub fn cleanup(&self) {
		let Some(mounted) = self.0.mounted.borrow_mut().take() else {
			return;
		};
		if let Some(document) = mounted.document.upgrade() {
			document.unwatch(mounted.watch);
		}
		self.unsubscribe_watched();

		let hooks = self.0.cleanup_hooks.borrow().clone();
		let render_cleanups = std::mem::take(&mut *self.0.render_cleanups.borrow_mut());
		tracing::debug!(
			component = self.0.name,
			hooks = hooks.len() + render_cleanups.len(),
			"component cleaned up"
		);
		for hook in hooks {
			hook();
		}
		for hook in render_cleanups {
			hook();
		}
	}

	fn render(&self, lifecycle: &Lifecycle) -> Node {
		let props = self.props();
		(self.0.render)(&props, lifecycle)
	}

	fn rerender(&self) -> Result<(), MountError> {
		let target = self
			.0
			.mounted
			.borrow()
			.as_ref()
			.map(|mounted| (mounted.document.clone(), mounted.slot));
		let Some((document, slot)) = target else {
			return Ok(());
		};
		let Some(document) = document.upgrade() else {
			return Ok(());
		};

		let template = self.render(&Lifecycle::new(&document));
		slot.replace(&document, &template)?;
		tracing::debug!(component = self.0.name, "component updated");
		Ok(())
	}

	fn subscribe_watched(&self) {
		let Some(selector) = &self.0.selector else {
			return;
		};
		if !self.0.watched.borrow().is_empty() {
			return;
		}

		let signals = selector(&self.props());
		self.0.subscribing.set(true);
		let watched = signals
			.into_iter()
			.map(|signal| {
				let weak = Rc::downgrade(&self.0);
				let id = signal.subscribe(move |_| Self::on_watched_change(&weak));
				(signal, id)
			})
			.collect();
		self.0.subscribing.set(false);
		*self.0.watched.borrow_mut() = watched;
	}

	fn unsubscribe_watched(&self) {
		let watched = std::mem::take(&mut *self.0.watched.borrow_mut());
		for (signal, id) in watched {
			signal.unsubscribe(id);
		}
	}

	fn on_watched_change(weak: &Weak<ComponentState<P>>) {
		let Some(state) = weak.upgrade() else {
			return;
		};
		if state.subscribing.get() {
			return;
		}
		let component = Component(state);
		if let Err(error) = component.rerender() {
			error_log!("failed to update {}: {}", component.0.name, error);
		}
	}
}

impl<P: 'static> Mountable for Component<P> {
	fn mount(
		&self,
		document: &Document,
		parent: NodeId,
		before: Option<NodeId>,
	) -> Result<Vec<NodeId>, MountError> {
		if self.is_mounted() {
			warn_log!("{} is already mounted; releasing the previous output", self.0.name);
			self.cleanup();
		}
		self.subscribe_watched();

		let lifecycle = Lifecycle::new(document);
		let template = self.render(&lifecycle);
		let slot = Slot::open(document, parent, before)?;
		materialize(document, parent, Some(slot.end()), &template)?;

		let component = self.clone();
		let watch = document.on_detach(slot.start(), move || component.cleanup())?;
		*self.0.mounted.borrow_mut() = Some(Mounted {
			document: document.downgrade(),
			slot,
			watch,
		});

		let (mount_hooks, cleanup_hooks) = lifecycle.into_hooks();
		*self.0.render_cleanups.borrow_mut() = cleanup_hooks;
		let instance_hooks = self.0.mount_hooks.borrow().clone();
		for hook in instance_hooks {
			hook();
		}
		for hook in mount_hooks {
			hook();
		}

		tracing::debug!(component = self.0.name, parent = %parent, "component mounted");
		Ok(slot.nodes(document))
	}

	fn name(&self) -> &'static str {
		self.0.name
	}
}

impl<P: 'static> Clone for Component<P> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<P: 'static> fmt::Debug for Component<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("name", &self.0.name)
			.field("mounted", &self.is_mounted())
			.field("watched", &self.0.watched.borrow().len())
			.finish()
	}
}

impl<P: 'static> From<Component<P>> for Node {
	fn from(component: Component<P>) -> Self {
		Node::Component(Rc::new(component))
	}
}
