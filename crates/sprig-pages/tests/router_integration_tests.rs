//! Integration tests for client-side routing
//!
//! These tests verify the routing system functionality:
//! 1. Path pattern matching with `{{param}}` segments
//! 2. Anchor interception and history
//! 3. Route handlers reading url and search parameters

use rstest::{fixture, rstest};
use sprig_core::Signal;
use sprig_pages::builder::html::{a, h1, nav, p};
use sprig_pages::component::{Node, mount};
use sprig_pages::dom::Document;
use sprig_pages::router::{PathPattern, Route, Router, SearchParams, match_route};

#[fixture]
fn router() -> Router {
	Router::with_routes([
		Route::new("/", h1().child("Home")),
		Route::handler("/users/{{id}}", |ctx| {
			p().child(format!("user {}", ctx.url_params["id"])).into()
		}),
		Route::handler("/users/{{id}}/posts/{{post}}", |ctx| {
			p().child(format!("{}/{}", ctx.url_params["id"], ctx.url_params["post"]))
				.into()
		}),
	])
	.fallback(p().child("404"))
}

fn links() -> Node {
	nav()
		.child(a().href("/").child("home"))
		.child(a().href("/users/1").child("one"))
		.child(a().href("https://example.com/").child("out"))
		.into()
}

/// Success Criterion 1: parameters bind by name
#[rstest]
#[case("/users/{{id}}", "/users/42", Some(vec![("id", "42")]))]
#[case("/a/{{x}}/b/{{y}}", "/a/1/b/2", Some(vec![("x", "1"), ("y", "2")]))]
#[case("/users/{{id}}", "/users/42/edit", None)]
#[case("/about", "/About", None)]
fn test_match_route(#[case] pattern: &str, #[case] path: &str, #[case] expected: Option<Vec<(&str, &str)>>) {
	let params = match_route(pattern, path);

	let expected = expected.map(|pairs| {
		pairs
			.into_iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	});
	assert_eq!(params, expected);
}

/// Success Criterion 2: clicking links swaps routes and grows history
#[rstest]
fn test_links_drive_the_router(router: Router) {
	let doc = Document::new();
	mount(&doc, doc.root(), &Node::from((links(), router.clone()))).unwrap();
	let anchors = doc.element_children(doc.element_children(doc.root())[0]);
	assert_eq!(doc.text_content(doc.root()), "homeoneoutHome");

	doc.click(anchors[1]).unwrap();
	assert_eq!(doc.location().path(), "/users/1");
	assert_eq!(doc.history_len(), 2);
	assert!(doc.text_content(doc.root()).ends_with("user 1"));

	doc.click(anchors[0]).unwrap();
	assert_eq!(doc.history_len(), 3);
	assert!(doc.text_content(doc.root()).ends_with("Home"));
	assert!(doc.native_navigations().is_empty());
}

/// Success Criterion 2: cross-origin links leave the router alone
#[rstest]
fn test_cross_origin_link_navigates_natively(router: Router) {
	let doc = Document::new();
	mount(&doc, doc.root(), &Node::from((links(), router.clone()))).unwrap();
	let anchors = doc.element_children(doc.element_children(doc.root())[0]);

	assert!(doc.click(anchors[2]).unwrap());

	assert_eq!(doc.location().as_str(), "https://example.com/");
	assert_eq!(router.current_path().get(), "/");
	assert_eq!(doc.native_navigations().len(), 1);
}

/// Success Criterion 2: back and forward replay the pathname
#[rstest]
fn test_back_and_forward(router: Router) {
	let doc = Document::new();
	mount(&doc, doc.root(), &router.clone().into()).unwrap();
	router.navigate(&doc, "/users/5").unwrap();
	router.navigate(&doc, "/users/5/posts/9").unwrap();
	assert_eq!(doc.inner_html(doc.root()), "<p>5/9</p>");

	assert!(doc.back());
	assert_eq!(doc.inner_html(doc.root()), "<p>user 5</p>");

	assert!(doc.forward());
	assert_eq!(doc.inner_html(doc.root()), "<p>5/9</p>");
}

/// Success Criterion 2: two routers share one navigation
#[rstest]
fn test_routers_follow_the_same_history() {
	let doc = Document::new();
	let header = Router::new().route("/", "main").route("/docs", "docs");
	let body = Router::new().route("/", p().child("welcome")).fallback(p().child("page"));
	mount(&doc, doc.root(), &Node::from((header.clone(), body))).unwrap();

	header.navigate(&doc, "/docs").unwrap();

	assert_eq!(doc.inner_html(doc.root()), "docs<p>page</p>");
}

/// Success Criterion 3: handlers read the query of the current location
#[rstest]
fn test_search_params_reach_handlers() {
	let doc = Document::new()
		.with_location("http://localhost/search?q=sprig&tag=a&tag=b")
		.unwrap();
	let router = Router::new().route_with("/search", |ctx| {
		let tags: Vec<&str> = ctx.search_params.get_all("tag").collect();
		let tags = tags.join(",");
		p().child(format!("{} [{}]", ctx.search_params.get("q").unwrap_or(""), tags))
			.into()
	});

	mount(&doc, doc.root(), &router.into()).unwrap();

	assert_eq!(doc.inner_html(doc.root()), "<p>sprig [a,b]</p>");
}

/// Success Criterion 3: an explicit pathname signal overrides the location
#[rstest]
fn test_explicit_pathname_signal(router: Router) {
	let doc = Document::new().with_location("http://localhost/users/1").unwrap();
	let pathname = Signal::new("/".to_string());
	mount(&doc, doc.root(), &router.pathname(pathname.clone()).into()).unwrap();
	assert_eq!(doc.inner_html(doc.root()), "<h1>Home</h1>");

	pathname.set("/nowhere".to_string());

	assert_eq!(doc.inner_html(doc.root()), "<p>404</p>");
}

/// Success Criterion 1: patterns keep their source
#[rstest]
fn test_pattern_source_and_names() {
	let pattern = PathPattern::new("/users/{{id}}/posts/{{post}}");

	assert_eq!(pattern.to_string(), "/users/{{id}}/posts/{{post}}");
	assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id", "post"]);
}

#[rstest]
fn test_search_params_parse() {
	let params = SearchParams::parse("?a=1&b=two%20words&a=3");

	assert_eq!(params.get("a"), Some("1"));
	assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
	assert_eq!(params.get("b"), Some("two words"));
	assert!(!params.has("c"));
	assert_eq!(params.len(), 3);
}
