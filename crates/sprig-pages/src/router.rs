//! Client-side routing.
//!
//! A [`Router`] maps `/`-separated patterns to templates. Anchors mounted
//! through [`crate::component::mount`] turn same-origin clicks into `route`
//! events; the mount container pushes the history entry and every mounted
//! router picks up the new pathname.
//!
//! ## Example
//!
//! ```
//! use sprig_pages::builder::html::{a, p};
//! use sprig_pages::component::{Node, mount};
//! use sprig_pages::dom::Document;
//! use sprig_pages::router::Router;
//!
//! let router = Router::new()
//!     .route("/", p().child("home"))
//!     .route_with("/users/{{id}}", |ctx| p().child(format!("user {}", ctx.url_params["id"])).into());
//!
//! let doc = Document::new();
//! let nodes = mount(&doc, doc.root(), &Node::from((a().attr("href", "/users/7"), router)))?;
//! doc.click(nodes[0])?;
//!
//! assert_eq!(doc.location().path(), "/users/7");
//! assert_eq!(doc.inner_html(doc.root()), "<a href=\"/users/7\"></a><p>user 7</p>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod core;
mod pattern;

pub use self::core::{Route, RouteContext, RouteTarget, Router};
pub use self::pattern::{PathPattern, SearchParams, match_route};
