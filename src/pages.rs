//! Rendering layer
//!
//! Access to sprig-pages: the headless document, the mount engine,
//! components, conditionals, the router, scoped css and string rendering.
//!
//! ## Example
//!
//! ```
//! use sprig::pages::router::Router;
//! use sprig::pages::ssr::SsrRenderer;
//! use sprig::pages::builder::html::p;
//! use sprig::pages::component::Node;
//!
//! let router = Router::new().route("/", p().child("home"));
//!
//! assert_eq!(SsrRenderer::new().render(Node::from(router))?, "<p>home</p>");
//! # Ok::<(), sprig::pages::ssr::RenderError>(())
//! ```

// Re-export all sprig-pages functionality
pub use sprig_pages::*;
