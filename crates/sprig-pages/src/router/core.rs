//! Core router implementation.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use sprig_core::Signal;

use super::pattern::{PathPattern, SearchParams};
use crate::component::{ComponentFactory, Lifecycle, MountError, Mountable, Node};
use crate::dom::{
	Document, DomError, Event, EventDetail, ListenerId, NodeId, POPSTATE_EVENT, ROUTE_EVENT,
};
use crate::debug_log;

type Handler = Rc<dyn Fn(&RouteContext) -> Node>;

/// What a route shows.
#[derive(Clone)]
pub enum RouteTarget {
	/// A fixed template.
	Template(Node),
	/// Builds the template from the match.
	Handler(Handler),
}

impl fmt::Debug for RouteTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Template(node) => f.debug_tuple("Template").field(node).finish(),
			Self::Handler(_) => f.write_str("Handler"),
		}
	}
}

/// Data handed to route handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteContext {
	/// Parameters bound by the pattern.
	pub url_params: HashMap<String, String>,
	/// Query parameters of the current location.
	pub search_params: SearchParams,
}

/// A single route definition.
#[derive(Debug, Clone)]
pub struct Route {
	pattern: PathPattern,
	target: RouteTarget,
}

impl Route {
	/// A route showing a fixed template.
	pub fn new(pattern: impl Into<PathPattern>, template: impl Into<Node>) -> Self {
		Self {
			pattern: pattern.into(),
			target: RouteTarget::Template(template.into()),
		}
	}

	/// A route whose template is built from the bound parameters.
	pub fn handler<F>(pattern: impl Into<PathPattern>, handler: F) -> Self
	where
		F: Fn(&RouteContext) -> Node + 'static,
	{
		Self {
			pattern: pattern.into(),
			target: RouteTarget::Handler(Rc::new(handler)),
		}
	}

	/// The pattern this route matches.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// What the route renders.
	pub fn target(&self) -> &RouteTarget {
		&self.target
	}

	fn render(&self, context: &RouteContext) -> Node {
		match &self.target {
			RouteTarget::Template(node) => node.clone(),
			RouteTarget::Handler(handler) => handler(context),
		}
	}
}

/// Shows the first route whose pattern matches the pathname.
///
/// The router is a component watching its pathname signal: every change
/// recomputes the match from scratch and replaces the output. While
/// mounted, `popstate` and `route` window events update the pathname. When
/// no pathname signal is supplied, each mount starts from the document
/// location.
///
/// # Example
///
/// ```
/// use sprig_core::Signal;
/// use sprig_pages::builder::html::h1;
/// use sprig_pages::component::{Node, mount};
/// use sprig_pages::dom::Document;
/// use sprig_pages::router::Router;
///
/// let pathname = Signal::new("/".to_string());
/// let router = Router::new()
///     .route("/", h1().child("Home"))
///     .route("/about", h1().child("About"))
///     .pathname(pathname.clone());
///
/// let doc = Document::new();
/// mount(&doc, doc.root(), &Node::from(router))?;
/// assert_eq!(doc.inner_html(doc.root()), "<h1>Home</h1>");
///
/// pathname.set("/about".to_string());
/// assert_eq!(doc.inner_html(doc.root()), "<h1>About</h1>");
/// # Ok::<(), sprig_pages::component::MountError>(())
/// ```
#[derive(Clone)]
pub struct Router {
	routes: Vec<Route>,
	fallback: Box<Node>,
	pathname: Signal<String>,
	explicit_pathname: bool,
}

impl Default for Router {
	fn default() -> Self {
		Self::new()
	}
}

impl Router {
	/// Creates a router without routes.
	pub fn new() -> Self {
		Self {
			routes: Vec::new(),
			fallback: Box::new(Node::Empty),
			pathname: Signal::new(String::from("/")),
			explicit_pathname: false,
		}
	}

	/// Creates a router from a route table.
	pub fn with_routes(routes: impl IntoIterator<Item = Route>) -> Self {
		Self {
			routes: routes.into_iter().collect(),
			..Self::new()
		}
	}

	/// Adds a route showing a fixed template.
	pub fn route(mut self, pattern: &str, template: impl Into<Node>) -> Self {
		self.routes.push(Route::new(pattern, template));
		self
	}

	/// Adds a route built by `handler`.
	pub fn route_with<F>(mut self, pattern: &str, handler: F) -> Self
	where
		F: Fn(&RouteContext) -> Node + 'static,
	{
		self.routes.push(Route::handler(pattern, handler));
		self
	}

	/// Shown when no route matches. Defaults to nothing.
	pub fn fallback(mut self, template: impl Into<Node>) -> Self {
		self.fallback = Box::new(template.into());
		self
	}

	/// Drives the router from `pathname` instead of the document location.
	pub fn pathname(mut self, pathname: Signal<String>) -> Self {
		self.pathname = pathname;
		self.explicit_pathname = true;
		self
	}

	/// The pathname signal.
	pub fn current_path(&self) -> &Signal<String> {
		&self.pathname
	}

	/// Routes in registration order.
	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	/// The first route matching `path`, with its bound parameters.
	pub fn match_path(&self, path: &str) -> Option<(&Route, HashMap<String, String>)> {
		self.routes
			.iter()
			.find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
	}

	/// The template for `path`: the matching route, else the fallback.
	pub fn render_path(&self, document: &Document, path: &str) -> Node {
		match self.match_path(path) {
			Some((route, url_params)) => {
				debug_log!("{} matched route {}", path, route.pattern);
				route.render(&RouteContext {
					url_params,
					search_params: SearchParams::from_url(&document.location()),
				})
			}
			None => {
				debug_log!("no route matched {}", path);
				(*self.fallback).clone()
			}
		}
	}

	/// Pushes `href` onto the document history and shows its route.
	///
	/// Other routers mounted in `document` follow through a window `route`
	/// event.
	pub fn navigate(&self, document: &Document, href: &str) -> Result<(), DomError> {
		let url = document.push_state(href)?;
		self.pathname.set(url.path().to_string());
		document.dispatch_window_event(&Event::custom(
			ROUTE_EVENT,
			EventDetail::Route {
				href: url.to_string(),
			},
		));
		Ok(())
	}

	pub(crate) fn mount(
		&self,
		document: &Document,
		parent: NodeId,
		before: Option<NodeId>,
	) -> Result<Vec<NodeId>, MountError> {
		if !self.explicit_pathname {
			self.pathname.set(document.location().path().to_string());
		}
		ComponentFactory::new(render_router)
			.watch(|router: &Router| vec![router.pathname.clone().into()])
			.named("Router")
			.create(self.clone())
			.mount(document, parent, before)
	}
}

fn render_router(router: &Router, lifecycle: &Lifecycle) -> Node {
	let document = lifecycle.document();
	let listeners: Rc<Cell<Option<[ListenerId; 2]>>> = Rc::default();

	{
		let weak = document.downgrade();
		let pathname = router.pathname.clone();
		let listeners = Rc::clone(&listeners);
		lifecycle.on_mount(move || {
			let Some(doc) = weak.upgrade() else {
				return;
			};
			listeners.set(Some([
				doc.add_window_listener(POPSTATE_EVENT, on_popstate(&doc, pathname.clone())),
				doc.add_window_listener(ROUTE_EVENT, on_route(&doc, pathname)),
			]));
		});
	}
	{
		let weak = document.downgrade();
		lifecycle.on_cleanup(move || {
			let (Some(doc), Some(ids)) = (weak.upgrade(), listeners.take()) else {
				return;
			};
			for id in ids {
				doc.remove_event_listener(id);
			}
		});
	}

	router.render_path(document, &router.pathname.get())
}

fn on_popstate(document: &Document, pathname: Signal<String>) -> impl Fn(&Event) + 'static {
	let weak = document.downgrade();
	move |_| {
		if let Some(doc) = weak.upgrade() {
			pathname.set(doc.location().path().to_string());
		}
	}
}

/// Route events are dispatched after the history entry was pushed, so the
/// location already holds the resolved target.
fn on_route(document: &Document, pathname: Signal<String>) -> impl Fn(&Event) + 'static {
	let weak = document.downgrade();
	move |event| {
		let Some(doc) = weak.upgrade() else {
			return;
		};
		if event.route_href().is_some() {
			pathname.set(doc.location().path().to_string());
		}
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.routes.len())
			.field("pathname", &self.pathname.with(|path| path.clone()))
			.field("has_fallback", &!self.fallback.is_empty())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::html::{a, h1, p};
	use crate::component::mount;
	use rstest::{fixture, rstest};

	#[fixture]
	fn router() -> Router {
		Router::new()
			.route("/", h1().child("Home"))
			.route("/about", h1().child("About"))
			.route_with("/users/{{id}}", |ctx| {
				p().child(format!("user {}", ctx.url_params["id"])).into()
			})
	}

	fn render(router: Router, path: &str) -> String {
		let doc = Document::new();
		let path = Signal::new(path.to_string());
		mount(&doc, doc.root(), &router.pathname(path).into()).unwrap();
		doc.inner_html(doc.root())
	}

	#[rstest]
	#[case("/", "<h1>Home</h1>")]
	#[case("/about", "<h1>About</h1>")]
	#[case("/users/42", "<p>user 42</p>")]
	#[case("/missing", "")]
	fn test_renders_matching_route(router: Router, #[case] path: &str, #[case] expected: &str) {
		assert_eq!(render(router, path), expected);
	}

	#[rstest]
	fn test_fallback(router: Router) {
		assert_eq!(render(router.fallback(p().child("not found")), "/nope"), "<p>not found</p>");
	}

	#[rstest]
	fn test_first_match_wins() {
		let router = Router::new()
			.route("/{{page}}", "param")
			.route("/about", "literal");

		assert_eq!(render(router, "/about"), "param");
	}

	#[rstest]
	fn test_match_path_binds_params(router: Router) {
		let (route, params) = router.match_path("/users/7").unwrap();

		assert_eq!(route.pattern().as_str(), "/users/{{id}}");
		assert_eq!(params["id"], "7");
		assert!(router.match_path("/users/7/edit").is_none());
	}

	#[rstest]
	fn test_handler_sees_search_params() {
		let doc = Document::new().with_location("http://localhost/search?q=signals").unwrap();
		let router = Router::new().route_with("/search", |ctx| {
			Node::from(ctx.search_params.get("q").unwrap_or_default().to_string())
		});

		mount(&doc, doc.root(), &router.into()).unwrap();

		assert_eq!(doc.inner_html(doc.root()), "signals");
	}

	#[rstest]
	fn test_default_pathname_comes_from_location(router: Router) {
		let doc = Document::new().with_location("http://localhost/about").unwrap();

		mount(&doc, doc.root(), &router.into()).unwrap();

		assert_eq!(doc.inner_html(doc.root()), "<h1>About</h1>");
	}

	#[rstest]
	fn test_anchor_click_routes(router: Router) {
		let doc = Document::new();
		let link = a().attr("href", "/users/9").child("nine");
		let nodes = mount(&doc, doc.root(), &Node::from((link, router.clone()))).unwrap();

		doc.click(nodes[0]).unwrap();

		assert_eq!(doc.location().path(), "/users/9");
		assert_eq!(router.current_path().get(), "/users/9");
		assert_eq!(doc.inner_html(doc.root()), "<a href=\"/users/9\">nine</a><p>user 9</p>");
	}

	#[rstest]
	fn test_relative_anchor_resolves_once() {
		let doc = Document::new().with_location("http://localhost/a/b").unwrap();
		let router = Router::new()
			.route("/a/c/d", "nested")
			.fallback("missing");
		let link = a().attr("href", "c/d").child("go");
		let nodes = mount(&doc, doc.root(), &Node::from((link, router.clone()))).unwrap();

		doc.click(nodes[0]).unwrap();

		assert_eq!(doc.location().path(), "/a/c/d");
		assert_eq!(router.current_path().get(), "/a/c/d");
		assert_eq!(doc.inner_html(doc.root()), "<a href=\"c/d\">go</a>nested");
	}

	#[rstest]
	fn test_revisited_route_mounts_its_future_again() {
		let doc = Document::new();
		let router = Router::new()
			.route("/", "home")
			.route("/feed", Node::future(async { "feed loaded" }));
		mount(&doc, doc.root(), &router.clone().into()).unwrap();

		router.navigate(&doc, "/feed").unwrap();
		doc.run_until_stalled();
		assert_eq!(doc.inner_html(doc.root()), "feed loaded");

		router.navigate(&doc, "/").unwrap();
		assert_eq!(doc.inner_html(doc.root()), "home");
		router.navigate(&doc, "/feed").unwrap();
		doc.run_until_stalled();

		assert_eq!(doc.inner_html(doc.root()), "feed loaded");
	}

	#[rstest]
	fn test_back_restores_previous_route(router: Router) {
		let doc = Document::new();
		mount(&doc, doc.root(), &router.clone().into()).unwrap();
		router.navigate(&doc, "/about").unwrap();
		assert_eq!(doc.inner_html(doc.root()), "<h1>About</h1>");

		assert!(doc.back());

		assert_eq!(doc.inner_html(doc.root()), "<h1>Home</h1>");
	}

	#[rstest]
	fn test_listeners_removed_on_cleanup(router: Router) {
		let doc = Document::new();
		let nodes = mount(&doc, doc.root(), &router.into()).unwrap();
		assert_eq!(doc.window_listener_count(ROUTE_EVENT), 1);
		assert_eq!(doc.window_listener_count(POPSTATE_EVENT), 1);

		for node in nodes {
			doc.remove_child(doc.root(), node).unwrap();
		}

		assert_eq!(doc.window_listener_count(ROUTE_EVENT), 0);
		assert_eq!(doc.window_listener_count(POPSTATE_EVENT), 0);
	}

	#[rstest]
	fn test_navigate_rejects_other_origins(router: Router) {
		let doc = Document::new();

		assert!(matches!(
			router.navigate(&doc, "https://example.com/"),
			Err(DomError::CrossOrigin { .. })
		));
	}
}
