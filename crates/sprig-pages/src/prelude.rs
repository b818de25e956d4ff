//! Unified prelude for sprig-pages.
//!
//! ```
//! use sprig_pages::prelude::*;
//!
//! let count = Signal::new(0);
//! let doc = Document::new();
//! mount(&doc, doc.root(), &Node::from(p().child(&count)))?;
//! # Ok::<(), MountError>(())
//! ```

pub use sprig_core::{AnySignal, Signal};

pub use crate::builder::html::*;
pub use crate::callback::Callback;
pub use crate::component::{
	Component, ComponentFactory, Conditional, Element, Lifecycle, MountError, MountOptions,
	Mountable, Node, create_component, mount, mount_with,
};
pub use crate::css;
pub use crate::css::{CssError, StyleSheet};
pub use crate::dom::{Document, Event, NodeId};
pub use crate::router::{Route, RouteContext, Router};
pub use crate::ssr::{RenderOptions, SsrRenderer, render, render_css};
