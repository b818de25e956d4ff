//! Sprig Pages - templates, mounting and rendering
//!
//! Everything above the reactive primitive of `sprig-core`:
//!
//! - [`dom`]: in-memory document with events, an attachment tracker and
//!   session history
//! - [`component`]: the [`Node`](component::Node) template tree and the
//!   engine that mounts it, plus components and conditionals
//! - [`builder`]: tag constructors for templates
//! - [`router`]: client-side routing on `{{param}}` patterns
//! - [`css`]: class-scoped stylesheets with reactive values
//! - [`ssr`]: rendering templates and stylesheets to strings
//!
//! ## Example
//!
//! ```
//! use sprig_pages::prelude::*;
//!
//! let count = Signal::new(0);
//! let increment = {
//!     let count = count.clone();
//!     move |_: &Event| count.update(|n| *n += 1)
//! };
//! let template = Node::from((p().child(&count), button().on_click(increment).text("+")));
//!
//! let doc = Document::new();
//! let nodes = mount(&doc, doc.root(), &template)?;
//! doc.click(nodes[1])?;
//!
//! assert_eq!(doc.inner_html(doc.root()), "<p>1</p><button>+</button>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Logging
//!
//! Events are emitted through [`tracing`]. Per-node traces of the mount
//! engine need the `debug-hooks` feature in a debug build.

#![warn(missing_docs)]

// Core modules
pub mod builder;
pub mod callback;
pub mod component;
pub mod css;
pub mod dom;
pub mod logging;

// Unified prelude for simplified imports
pub mod prelude;

// Client-side routing
pub mod router;

// Server-side rendering
pub mod ssr;

#[doc(hidden)]
pub use tracing as __tracing;

pub use callback::Callback;
pub use component::{Component, ComponentFactory, Conditional, Element, Node, mount};
pub use dom::Document;
pub use router::Router;
pub use sprig_core::Signal;
pub use ssr::{SsrRenderer, render, render_css};

// Logging macros are exported via #[macro_export]:
// sprig_pages::debug_log!, sprig_pages::info_log!, and so on.
