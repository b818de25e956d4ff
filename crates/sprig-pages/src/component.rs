//! Templates and the machinery that mounts them.
//!
//! A template is a [`Node`] tree built with [`crate::builder`] (or by hand).
//! [`mount`] materializes it into a [`Document`](crate::dom::Document).
//! Dynamic leaves then keep their part of the output up to date:
//!
//! | Leaf | Live output |
//! |------|-------------|
//! | [`Node::Signal`] | one text node, rewritten on change |
//! | [`Node::Future`] | mounted in place once resolved |
//! | [`Component`] | re-rendered when a watched signal changes |
//! | [`Conditional`] | template shown while a predicate holds |
//! | [`Router`](crate::router::Router) | the route matching the pathname |

mod conditional;
mod instance;
mod mount;
mod node;
mod slot;
mod r#trait;

pub use conditional::Conditional;
pub use instance::{Component, ComponentFactory, Lifecycle, create_component};
pub use mount::{MountError, MountOptions, mount, mount_with};
pub use node::{AttrValue, Element, Node, PendingNode, format_number};
pub use r#trait::Mountable;
