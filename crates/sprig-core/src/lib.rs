//! Sprig Core - reactive primitives
//!
//! This crate holds the single reactive building block the rest of sprig is
//! made of: [`Signal`], a mutable cell that synchronously notifies its
//! subscribers when its value changes.
//!
//! Rendering, components and routing live in `sprig-pages`.

#![warn(missing_docs)]

pub mod reactive;

pub use reactive::{AnySignal, DynSignal, Signal, SignalId, SubscriptionId};
