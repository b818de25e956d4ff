//! Callback type for event handlers.
//!
//! [`Callback`] wraps a closure in an `Rc`, making it cheaply cloneable so the
//! same handler can be attached every time a template is materialized.
//!
//! ## Example
//!
//! ```
//! use sprig_core::Signal;
//! use sprig_pages::Callback;
//!
//! let count = Signal::new(0);
//! let increment = Callback::new({
//!     let count = count.clone();
//!     move |_| count.update(|n| *n += 1)
//! });
//! # let _ = increment;
//! ```

use std::fmt;
use std::rc::Rc;

use crate::dom::Event;

/// A cloneable event handler.
pub struct Callback {
	inner: Rc<dyn Fn(&Event)>,
}

impl Callback {
	/// Wraps a closure.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Invokes the handler.
	pub fn call(&self, event: &Event) {
		(self.inner)(event)
	}

	/// Returns true when both handles wrap the same closure.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Clone for Callback {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<F> From<F> for Callback
where
	F: Fn(&Event) + 'static,
{
	fn from(f: F) -> Self {
		Self::new(f)
	}
}

impl fmt::Debug for Callback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_callback_clone_shares_closure() {
		let hits = Rc::new(Cell::new(0));
		let counter = hits.clone();
		let callback = Callback::new(move |_| counter.set(counter.get() + 1));
		let other = callback.clone();

		callback.call(&Event::new("click"));
		other.call(&Event::new("click"));

		assert_eq!(hits.get(), 2);
		assert!(callback.ptr_eq(&other));
	}

	#[rstest]
	fn test_closure_converts_into_callback() {
		let seen = Rc::new(Cell::new(false));
		let flag = seen.clone();
		let callback: Callback = (move |event: &Event| flag.set(event.kind() == "input")).into();

		callback.call(&Event::new("input"));

		assert!(seen.get());
	}
}
