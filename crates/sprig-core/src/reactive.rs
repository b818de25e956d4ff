//! Reactive primitives.
//!
//! - [`Signal`]: a typed mutable cell with synchronous subscriber notification
//! - [`AnySignal`]: a type-erased handle used by templates and stylesheets

pub mod any;
pub mod signal;

pub use any::{AnySignal, DynSignal};
pub use signal::{Signal, SignalId, SubscriptionId};
