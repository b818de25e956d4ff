//! # Sprig
//!
//! A small reactive UI library: signals drive fine-grained updates of a live
//! document, and the same templates render to strings on the server.
//!
//! ## Feature Flags
//!
//! - `pages` (default) - document, mount engine, components, router, scoped
//!   css and string rendering
//! - `debug-hooks` - per-node traces from the mount engine in debug builds
//!
//! Without `pages` only the reactive primitive is available.
//!
//! ## Quick Example
//!
//! ```
//! use sprig::prelude::*;
//!
//! let name = Signal::new("world".to_string());
//! let doc = Document::new();
//! mount(&doc, doc.root(), &Node::from(h1().text("Hello, ").child(&name)))?;
//!
//! name.set("sprig".to_string());
//!
//! assert_eq!(doc.inner_html(doc.root()), "<h1>Hello, sprig</h1>");
//! assert_eq!(render(p().child(&name))?, "<p>sprig</p>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "pages")]
pub mod pages;

// Reactive primitive
pub use sprig_core::{AnySignal, Signal, SignalId, SubscriptionId};

#[cfg(feature = "pages")]
pub use sprig_pages::{Component, Conditional, Document, Node, Router, css, mount, render};

/// Everything needed to build and mount templates.
pub mod prelude {
	pub use sprig_core::{AnySignal, Signal};

	#[cfg(feature = "pages")]
	pub use sprig_pages::prelude::*;
}
