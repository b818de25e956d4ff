//! Type-erased signal handle.
//!
//! Templates and stylesheets only ever need the textual form of a signal:
//! its current value rendered with `Display`, and a way to be told when it
//! changes. [`AnySignal`] captures exactly that so heterogeneous signals can
//! live side by side in a node tree.

use std::fmt;
use std::rc::Rc;

use super::signal::{Signal, SignalId, SubscriptionId};

/// Object-safe view of a signal whose value can be displayed.
pub trait DynSignal {
	/// Identifier of the underlying signal.
	fn id(&self) -> SignalId;

	/// Current value rendered with `Display`.
	fn render(&self) -> String;

	/// Subscribes to the rendered value; replays the current value.
	fn subscribe_rendered(&self, f: Rc<dyn Fn(&str)>) -> SubscriptionId;

	/// Removes a registration made through [`DynSignal::subscribe_rendered`].
	fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

impl<T> DynSignal for Signal<T>
where
	T: fmt::Display + Clone + 'static,
{
	fn id(&self) -> SignalId {
		Signal::id(self)
	}

	fn render(&self) -> String {
		self.with(|value| value.to_string())
	}

	fn subscribe_rendered(&self, f: Rc<dyn Fn(&str)>) -> SubscriptionId {
		self.subscribe(move |value: &T| f(&value.to_string()))
	}

	fn unsubscribe(&self, id: SubscriptionId) -> bool {
		Signal::unsubscribe(self, id)
	}
}

/// A cloneable, type-erased signal.
#[derive(Clone)]
pub struct AnySignal(Rc<dyn DynSignal>);

impl AnySignal {
	/// Wraps a typed signal.
	pub fn new<T>(signal: Signal<T>) -> Self
	where
		T: fmt::Display + Clone + 'static,
	{
		Self(Rc::new(signal))
	}

	/// Identifier of the underlying signal.
	pub fn id(&self) -> SignalId {
		self.0.id()
	}

	/// Current value as text.
	pub fn render(&self) -> String {
		self.0.render()
	}

	/// Subscribes to the textual value. The callback runs immediately with
	/// the current value.
	pub fn subscribe(&self, f: impl Fn(&str) + 'static) -> SubscriptionId {
		self.0.subscribe_rendered(Rc::new(f))
	}

	/// Removes a registration.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.0.unsubscribe(id)
	}

	/// Returns true when `other` wraps the same signal.
	pub fn same_signal(&self, other: &AnySignal) -> bool {
		self.id() == other.id()
	}
}

impl PartialEq for AnySignal {
	fn eq(&self, other: &Self) -> bool {
		self.same_signal(other)
	}
}

impl Eq for AnySignal {}

impl<T> From<Signal<T>> for AnySignal
where
	T: fmt::Display + Clone + 'static,
{
	fn from(signal: Signal<T>) -> Self {
		Self::new(signal)
	}
}

impl<T> From<&Signal<T>> for AnySignal
where
	T: fmt::Display + Clone + 'static,
{
	fn from(signal: &Signal<T>) -> Self {
		Self::new(signal.clone())
	}
}

impl fmt::Debug for AnySignal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AnySignal")
			.field("id", &self.id())
			.field("value", &self.render())
			.finish()
	}
}

impl fmt::Display for AnySignal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.render())
	}
}
