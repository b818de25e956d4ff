//! Template tree: [`Node`], [`Element`] and attribute values.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use sprig_core::{AnySignal, Signal};

use super::conditional::Conditional;
use super::instance::{ComponentFactory, Lifecycle};
use super::r#trait::Mountable;
use crate::callback::Callback;
use crate::css::StyleSheet;
use crate::dom::is_void_element;
use crate::router::Router;

/// Formats a number the way a browser prints it: integral values without a
/// fractional part, `NaN`, `Infinity` and `-Infinity` spelled out, and
/// negative zero printed as `0`.
pub fn format_number(value: f64) -> String {
	if value.is_nan() {
		"NaN".to_string()
	} else if value.is_infinite() {
		if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
	} else if value == 0.0 {
		"0".to_string()
	} else {
		value.to_string()
	}
}

/// A future leaf, mounted when the future resolves.
///
/// Clones share one underlying future. Every mount awaits it, so a leaf that
/// is shown again (a re-shown conditional, a revisited route) mounts the same
/// resolved output again.
#[derive(Clone)]
pub struct PendingNode(Shared<LocalBoxFuture<'static, Node>>);

impl PendingNode {
	/// Wraps a future whose output converts into a [`Node`].
	pub fn new<F, T>(future: F) -> Self
	where
		F: Future<Output = T> + 'static,
		T: Into<Node>,
	{
		Self(async move { future.await.into() }.boxed_local().shared())
	}

	pub(crate) fn future(&self) -> Shared<LocalBoxFuture<'static, Node>> {
		self.0.clone()
	}

	/// Whether the future has resolved.
	pub fn is_resolved(&self) -> bool {
		self.0.peek().is_some()
	}
}

impl fmt::Debug for PendingNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PendingNode")
			.field("resolved", &self.is_resolved())
			.finish()
	}
}

/// An attribute value.
#[derive(Debug, Clone)]
pub enum AttrValue {
	/// Set verbatim.
	Text(String),
	/// `true` sets an empty attribute, `false` omits it.
	Bool(bool),
	/// Rendered with `Display` and kept in sync while the element is attached.
	Signal(AnySignal),
	/// Event handler. The key names the event with an `on` prefix.
	Handler(Callback),
	/// Scoped stylesheet. Only valid under the `style` key.
	Style(StyleSheet),
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<AnySignal> for AttrValue {
	fn from(signal: AnySignal) -> Self {
		Self::Signal(signal)
	}
}

impl<T: fmt::Display + Clone + 'static> From<Signal<T>> for AttrValue {
	fn from(signal: Signal<T>) -> Self {
		Self::Signal(signal.into())
	}
}

impl<T: fmt::Display + Clone + 'static> From<&Signal<T>> for AttrValue {
	fn from(signal: &Signal<T>) -> Self {
		Self::Signal(signal.into())
	}
}

impl From<Callback> for AttrValue {
	fn from(callback: Callback) -> Self {
		Self::Handler(callback)
	}
}

impl From<StyleSheet> for AttrValue {
	fn from(sheet: StyleSheet) -> Self {
		Self::Style(sheet)
	}
}

impl From<&StyleSheet> for AttrValue {
	fn from(sheet: &StyleSheet) -> Self {
		Self::Style(sheet.clone())
	}
}

/// An element of the template tree.
#[derive(Debug, Clone)]
pub struct Element {
	tag: Cow<'static, str>,
	attrs: Vec<(Cow<'static, str>, AttrValue)>,
	children: Vec<Node>,
}

impl Element {
	/// Creates an element with no attributes or children.
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		Self {
			tag: tag.into(),
			attrs: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Adds an attribute.
	pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<AttrValue>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Adds a handler for `event` under the `on{event}` key.
	pub fn on(self, event: &str, handler: impl Into<Callback>) -> Self {
		self.attr(format!("on{event}"), AttrValue::Handler(handler.into()))
	}

	/// Scopes the element with a stylesheet.
	pub fn style(self, sheet: impl Into<StyleSheet>) -> Self {
		self.attr("style", AttrValue::Style(sheet.into()))
	}

	/// Adds a child.
	pub fn child(mut self, child: impl Into<Node>) -> Self {
		self.children.push(child.into());
		self
	}

	/// Adds several children.
	pub fn children<I>(mut self, children: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<Node>,
	{
		self.children.extend(children.into_iter().map(Into::into));
		self
	}

	/// Tag name.
	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	/// Attributes in declaration order.
	pub fn attrs(&self) -> &[(Cow<'static, str>, AttrValue)] {
		&self.attrs
	}

	/// Children.
	pub fn child_nodes(&self) -> &[Node] {
		&self.children
	}

	/// Whether the element has no closing tag.
	pub fn is_void(&self) -> bool {
		is_void_element(&self.tag.to_ascii_lowercase())
	}
}

impl Drop for Element {
	// Unwinds uniquely owned descendants through an explicit stack so deep
	// templates are dropped without recursion.
	fn drop(&mut self) {
		let mut stack = std::mem::take(&mut self.children);
		while let Some(node) = stack.pop() {
			match node {
				Node::Element(element) => {
					if let Ok(mut element) = Rc::try_unwrap(element) {
						stack.append(&mut element.children);
					}
				}
				Node::Fragment(mut children) => stack.append(&mut children),
				_ => {}
			}
		}
	}
}

/// A template tree node.
///
/// Primitive leaves become text, dynamic leaves (signals, futures,
/// components, conditionals and routers) manage their own slice of the live
/// output once mounted. Cloning is cheap; dynamic leaves are shared handles.
#[derive(Clone, Default)]
pub enum Node {
	/// Produces nothing, not even an empty text node.
	#[default]
	Empty,
	/// A text node.
	Text(Cow<'static, str>),
	/// An element with attributes and children.
	Element(Rc<Element>),
	/// Children mounted in order into the same container.
	Fragment(Vec<Node>),
	/// A text node bound to a signal.
	Signal(AnySignal),
	/// Mounted when the future resolves.
	Future(PendingNode),
	/// A component instance.
	Component(Rc<dyn Mountable>),
	/// Shows a template while a predicate holds.
	Conditional(Conditional),
	/// Shows the route matching the current pathname.
	Router(Router),
}

impl Node {
	/// Creates a text node.
	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Self::Text(content.into())
	}

	/// Creates a fragment.
	pub fn fragment<I>(children: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<Node>,
	{
		Self::Fragment(children.into_iter().map(Into::into).collect())
	}

	/// Creates a future leaf.
	pub fn future<F, T>(future: F) -> Self
	where
		F: Future<Output = T> + 'static,
		T: Into<Node>,
	{
		Self::Future(PendingNode::new(future))
	}

	/// Wraps a bare render function as a prop-less component leaf.
	///
	/// Every mount renders afresh; hooks registered on the [`Lifecycle`]
	/// belong to that mount.
	pub fn component(render: impl Fn(&Lifecycle) -> Node + 'static) -> Self {
		ComponentFactory::new(move |_: &(), lifecycle: &Lifecycle| render(lifecycle))
			.named("RenderFn")
			.create(())
			.into()
	}

	/// Whether this is [`Node::Empty`].
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("Empty"),
			Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
			Self::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
			Self::Signal(signal) => f.debug_tuple("Signal").field(signal).finish(),
			Self::Future(pending) => f.debug_tuple("Future").field(pending).finish(),
			Self::Component(component) => f.debug_tuple("Component").field(&component.name()).finish(),
			Self::Conditional(conditional) => f.debug_tuple("Conditional").field(conditional).finish(),
			Self::Router(router) => f.debug_tuple("Router").field(router).finish(),
		}
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Self::Element(Rc::new(element))
	}
}

impl From<&'static str> for Node {
	fn from(text: &'static str) -> Self {
		Self::Text(Cow::Borrowed(text))
	}
}

impl From<String> for Node {
	fn from(text: String) -> Self {
		Self::Text(Cow::Owned(text))
	}
}

impl From<Cow<'static, str>> for Node {
	fn from(text: Cow<'static, str>) -> Self {
		Self::Text(text)
	}
}

impl From<bool> for Node {
	fn from(value: bool) -> Self {
		Self::Text(Cow::Borrowed(if value { "true" } else { "false" }))
	}
}

impl From<char> for Node {
	fn from(value: char) -> Self {
		Self::Text(Cow::Owned(value.to_string()))
	}
}

macro_rules! impl_integer_node {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Node {
				fn from(value: $ty) -> Self {
					Self::Text(Cow::Owned(value.to_string()))
				}
			}
		)*
	};
}

impl_integer_node!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<f32> for Node {
	fn from(value: f32) -> Self {
		Self::Text(Cow::Owned(format_number(f64::from(value))))
	}
}

impl From<f64> for Node {
	fn from(value: f64) -> Self {
		Self::Text(Cow::Owned(format_number(value)))
	}
}

impl From<()> for Node {
	fn from(_: ()) -> Self {
		Self::Empty
	}
}

impl<T: Into<Node>> From<Option<T>> for Node {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Empty, Into::into)
	}
}

impl<T: Into<Node>> From<Vec<T>> for Node {
	fn from(children: Vec<T>) -> Self {
		Self::fragment(children)
	}
}

impl<A: Into<Node>, B: Into<Node>> From<(A, B)> for Node {
	fn from((a, b): (A, B)) -> Self {
		Self::Fragment(vec![a.into(), b.into()])
	}
}

impl<A: Into<Node>, B: Into<Node>, C: Into<Node>> From<(A, B, C)> for Node {
	fn from((a, b, c): (A, B, C)) -> Self {
		Self::Fragment(vec![a.into(), b.into(), c.into()])
	}
}

impl From<AnySignal> for Node {
	fn from(signal: AnySignal) -> Self {
		Self::Signal(signal)
	}
}

impl<T: fmt::Display + Clone + 'static> From<Signal<T>> for Node {
	fn from(signal: Signal<T>) -> Self {
		Self::Signal(signal.into())
	}
}

impl<T: fmt::Display + Clone + 'static> From<&Signal<T>> for Node {
	fn from(signal: &Signal<T>) -> Self {
		Self::Signal(signal.into())
	}
}

impl From<PendingNode> for Node {
	fn from(pending: PendingNode) -> Self {
		Self::Future(pending)
	}
}

impl From<Conditional> for Node {
	fn from(conditional: Conditional) -> Self {
		Self::Conditional(conditional)
	}
}

impl From<Router> for Node {
	fn from(router: Router) -> Self {
		Self::Router(router)
	}
}
