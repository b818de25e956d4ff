//! Signal - Reactive Mutable Cell
//!
//! `Signal<T>` holds a value and a list of subscribers. Subscribers are plain
//! callbacks invoked synchronously, in subscription order, whenever the value
//! changes.
//!
//! ## Semantics
//!
//! - **Replay on subscribe**: [`Signal::subscribe`] calls the new subscriber
//!   immediately with the current value, so a subscriber always observes the
//!   value at subscribe time.
//! - **Skip unchanged writes**: [`Signal::set`] compares the new value with the
//!   current one using `PartialEq` and notifies nobody when they are equal.
//!   Payloads that should compare by identity can be wrapped in a newtype whose
//!   `PartialEq` uses `Rc::ptr_eq`.
//! - **No batching**: every effective write notifies right away. A subscriber
//!   that writes to the signal while being notified triggers a nested
//!   notification of every current subscriber before the outer call returns;
//!   the outer loop then resumes with the remaining subscribers and the value
//!   it started with.
//! - **Removal during notification**: a subscriber removed while a
//!   notification is in flight is not called by that notification.
//!
//! ## Example
//!
//! ```
//! use sprig_core::Signal;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let count = Signal::new(0);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let log = seen.clone();
//! let id = count.subscribe(move |value| log.borrow_mut().push(*value));
//!
//! count.set(1);
//! count.set(1); // unchanged, no notification
//! count.unsubscribe(id);
//! count.set(2);
//!
//! assert_eq!(*seen.borrow(), vec![0, 1]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SIGNAL_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a signal, shared by all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u64);

impl SignalId {
	fn next() -> Self {
		Self(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed))
	}
}

/// Handle returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
	fn next() -> Self {
		Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
	}
}

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
	id: SignalId,
	value: RefCell<T>,
	subscribers: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
}

/// A reactive cell with subscriber notification.
///
/// Cloning a `Signal` yields another handle to the same cell.
pub struct Signal<T: 'static> {
	inner: Rc<Inner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: Default + 'static> Default for Signal<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: 'static> Signal<T> {
	/// Creates a signal holding `value`.
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(Inner {
				id: SignalId::next(),
				value: RefCell::new(value),
				subscribers: RefCell::new(Vec::new()),
			}),
		}
	}

	/// Returns the identifier shared by every clone of this signal.
	pub fn id(&self) -> SignalId {
		self.inner.id
	}

	/// Returns a copy of the current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.inner.value.borrow().clone()
	}

	/// Reads the current value through a closure without cloning it.
	///
	/// Writing to the same signal from inside `f` panics.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Stores `value` and notifies subscribers if it differs from the
	/// current value.
	pub fn set(&self, value: T)
	where
		T: PartialEq + Clone,
	{
		{
			let mut current = self.inner.value.borrow_mut();
			if *current == value {
				return;
			}
			*current = value;
		}
		self.notify();
	}

	/// Mutates the value in place; subscribers are notified only when the
	/// result differs from the previous value.
	pub fn update(&self, f: impl FnOnce(&mut T))
	where
		T: PartialEq + Clone,
	{
		let changed = {
			let mut current = self.inner.value.borrow_mut();
			let previous = current.clone();
			f(&mut *current);
			*current != previous
		};
		if changed {
			self.notify();
		}
	}

	/// Registers `f` and immediately calls it with the current value.
	pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubscriptionId
	where
		T: Clone,
	{
		let id = SubscriptionId::next();
		let callback: Callback<T> = Rc::new(f);
		self.inner
			.subscribers
			.borrow_mut()
			.push((id, Rc::clone(&callback)));

		let value = self.get();
		callback(&value);
		id
	}

	/// Removes a registration. Returns `false` when `id` was not registered,
	/// so calling it twice is harmless.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.inner.subscribers.borrow_mut();
		match subscribers.iter().position(|(sub, _)| *sub == id) {
			Some(index) => {
				subscribers.remove(index);
				true
			}
			None => false,
		}
	}

	/// Number of active subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.borrow().len()
	}

	/// Returns true when both handles point to the same cell.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	fn is_subscribed(&self, id: SubscriptionId) -> bool {
		self.inner
			.subscribers
			.borrow()
			.iter()
			.any(|(sub, _)| *sub == id)
	}

	fn notify(&self)
	where
		T: Clone,
	{
		let snapshot: Vec<(SubscriptionId, Callback<T>)> = self
			.inner
			.subscribers
			.borrow()
			.iter()
			.map(|(id, callback)| (*id, Rc::clone(callback)))
			.collect();
		let value = self.get();

		tracing::trace!(
			signal = self.inner.id.0,
			subscribers = snapshot.len(),
			"notifying subscribers"
		);

		for (id, callback) in snapshot {
			if self.is_subscribed(id) {
				callback(&value);
			}
		}
	}
}

impl<T: fmt::Display + 'static> fmt::Display for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.inner.value.borrow().fmt(f)
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("id", &self.inner.id)
			.field("value", &*self.inner.value.borrow())
			.field("subscribers", &self.inner.subscribers.borrow().len())
			.finish()
	}
}
