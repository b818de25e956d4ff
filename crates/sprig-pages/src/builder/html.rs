//! HTML element builder
//!
//! One constructor per common tag, plus shortcuts on [`Element`] for the
//! attributes and events templates use most.

use std::borrow::Cow;

use crate::callback::Callback;
use crate::component::{AttrValue, Element, Node};
use crate::dom::Event;

impl Element {
	/// Set the class attribute
	pub fn class(self, class: impl Into<AttrValue>) -> Self {
		self.attr("class", class)
	}

	/// Set the id attribute
	pub fn id(self, id: impl Into<AttrValue>) -> Self {
		self.attr("id", id)
	}

	/// Set the href attribute
	pub fn href(self, href: impl Into<AttrValue>) -> Self {
		self.attr("href", href)
	}

	/// Append a text child
	pub fn text(self, text: impl Into<Cow<'static, str>>) -> Self {
		self.child(Node::text(text))
	}

	/// Attach a click handler
	pub fn on_click<F>(self, callback: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		self.on("click", Callback::new(callback))
	}

	/// Attach an input handler
	pub fn on_input<F>(self, callback: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		self.on("input", Callback::new(callback))
	}

	/// Attach a submit handler
	pub fn on_submit<F>(self, callback: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		self.on("submit", Callback::new(callback))
	}
}

/// Macro for defining HTML element creation functions
macro_rules! define_element {
	($($(#[$meta:meta])* $name:ident => $tag:literal),* $(,)?) => {
		$(
			$(#[$meta])*
			pub fn $name() -> Element {
				Element::new($tag)
			}
		)*
	};
}

define_element!(
	/// Create an `<html>` element
	///
	/// A template whose only element is `<html>` renders with a doctype.
	html => "html",
	/// Create a `<head>` element
	head => "head",
	/// Create a `<title>` element
	title => "title",
	/// Create a `<body>` element
	body => "body",
	/// Create a `<main>` element
	main => "main",
	/// Create a `<header>` element
	header => "header",
	/// Create a `<footer>` element
	footer => "footer",
	/// Create a `<nav>` element
	nav => "nav",
	/// Create a `<section>` element
	section => "section",
	/// Create an `<article>` element
	article => "article",
	/// Create a `<div>` element
	///
	/// ## Example
	///
	/// ```
	/// use sprig_pages::builder::html::{div, p};
	///
	/// let container = div().class("container").child(p().text("Content"));
	/// assert_eq!(container.child_nodes().len(), 1);
	/// ```
	div => "div",
	/// Create a `<span>` element
	span => "span",
	/// Create a `<p>` element (paragraph)
	p => "p",
	/// Create an `<h1>` element
	h1 => "h1",
	/// Create an `<h2>` element
	h2 => "h2",
	/// Create an `<h3>` element
	h3 => "h3",
	/// Create an `<a>` element
	///
	/// Same-origin links are routed client-side once mounted.
	a => "a",
	/// Create a `<strong>` element
	strong => "strong",
	/// Create an `<em>` element
	em => "em",
	/// Create a `<code>` element
	code => "code",
	/// Create a `<pre>` element
	pre => "pre",
	/// Create a `<ul>` element
	ul => "ul",
	/// Create an `<ol>` element
	ol => "ol",
	/// Create an `<li>` element
	li => "li",
	/// Create a `<button>` element
	button => "button",
	/// Create a `<form>` element
	form => "form",
	/// Create a `<label>` element
	label => "label",
	/// Create an `<input>` element (void)
	input => "input",
	/// Create a `<textarea>` element
	textarea => "textarea",
	/// Create an `<img>` element (void)
	img => "img",
	/// Create a `<br>` element (void)
	br => "br",
	/// Create an `<hr>` element (void)
	hr => "hr",
);
