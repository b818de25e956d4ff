//! Integration tests for the mount engine
//!
//! These tests drive whole templates through a live document:
//! 1. Counter wiring (handlers, signal text)
//! 2. Components and conditionals composed together
//! 3. Future leaves resolving in position
//! 4. Scoped stylesheets reacting to signals

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use rstest::{fixture, rstest};
use sprig_core::Signal;
use sprig_pages::builder::html::{button, div, li, p, span, ul};
use sprig_pages::component::{
	Component, ComponentFactory, Conditional, Lifecycle, MountOptions, Node, mount, mount_with,
};
use sprig_pages::css;
use sprig_pages::dom::{Document, Event};

#[fixture]
fn doc() -> Document {
	Document::new()
}

fn html(doc: &Document) -> String {
	doc.inner_html(doc.root())
}

struct CounterProps {
	count: Signal<i32>,
}

fn counter(count: Signal<i32>) -> Component<CounterProps> {
	ComponentFactory::new(|props: &CounterProps, _: &Lifecycle| {
		let count = props.count.clone();
		Node::from((
			p().child(&props.count),
			button()
				.on_click(move |_: &Event| count.update(|n| *n += 1))
				.text("+"),
		))
	})
	.named("Counter")
	.create(CounterProps { count })
}

/// Success Criterion 1: clicking the button updates the paragraph
#[rstest]
fn test_counter_increments(doc: Document) {
	let count = Signal::new(0);
	let nodes = mount(&doc, doc.root(), &counter(count.clone()).into()).unwrap();
	let button = doc.element_children(doc.root())[1];

	doc.click(button).unwrap();
	doc.click(button).unwrap();

	assert_eq!(count.get(), 2);
	assert_eq!(html(&doc), "<p>2</p><button>+</button>");
	// two markers around the rendered pair
	assert_eq!(nodes.len(), 4);
}

/// Success Criterion 1: the paragraph text node is reused across updates
#[rstest]
fn test_counter_keeps_text_node(doc: Document) {
	let count = Signal::new(0);
	mount(&doc, doc.root(), &counter(count.clone()).into()).unwrap();
	let paragraph = doc.element_children(doc.root())[0];
	let text = doc.first_child(paragraph).unwrap();

	count.set(41);

	assert_eq!(doc.first_child(paragraph), Some(text));
	assert_eq!(doc.text(text).as_deref(), Some("41"));
}

/// Success Criterion 2: a conditional inside a component toggles in place
#[rstest]
fn test_conditional_inside_list(doc: Document) {
	let open = Signal::new(false);
	let template = ul()
		.child(li().child("first"))
		.child(Conditional::when(&open, li().child("second")))
		.child(li().child("third"));

	mount(&doc, doc.root(), &template.into()).unwrap();
	assert_eq!(html(&doc), "<ul><li>first</li><li>third</li></ul>");

	open.set(true);
	assert_eq!(html(&doc), "<ul><li>first</li><li>second</li><li>third</li></ul>");

	open.set(false);
	assert_eq!(html(&doc), "<ul><li>first</li><li>third</li></ul>");
}

/// Success Criterion 2: hiding a component runs its cleanup
#[rstest]
fn test_hidden_component_is_cleaned_up(doc: Document) {
	let log = Rc::new(RefCell::new(Vec::new()));
	let shown = Signal::new(true);
	let child = {
		let log = Rc::clone(&log);
		let cleanup_log = Rc::clone(&log);
		ComponentFactory::new(|_: &(), _: &Lifecycle| span().child("child").into())
			.create(())
			.on_mount(move || log.borrow_mut().push("mount"))
			.on_cleanup(move || cleanup_log.borrow_mut().push("cleanup"))
	};

	mount(&doc, doc.root(), &Conditional::when(&shown, child.clone()).into()).unwrap();
	assert!(child.is_mounted());

	shown.set(false);

	assert!(!child.is_mounted());
	assert_eq!(*log.borrow(), vec!["mount", "cleanup"]);
	assert_eq!(html(&doc), "");
}

/// Success Criterion 2: an outer re-render replaces nested output without leaking
#[rstest]
fn test_outer_rerender_releases_inner_signals(doc: Document) {
	let title = Signal::new("a".to_string());
	let detail = Signal::new(1);
	let outer = {
		let detail = detail.clone();
		ComponentFactory::new(move |title: &Signal<String>, _: &Lifecycle| {
			div().child(p().child(title.get())).child(span().child(&detail)).into()
		})
		.watch(|title| vec![title.clone().into()])
		.create(title.clone())
	};

	mount(&doc, doc.root(), &outer.into()).unwrap();
	title.set("b".to_string());
	title.set("c".to_string());

	assert_eq!(detail.subscriber_count(), 1);
	detail.set(2);
	assert_eq!(html(&doc), "<div><p>c</p><span>2</span></div>");
}

/// Success Criterion 3: futures in one container append in resolution order
#[rstest]
fn test_futures_append_in_resolution_order(doc: Document) {
	let (first_tx, first_rx) = oneshot::channel::<&'static str>();
	let (second_tx, second_rx) = oneshot::channel::<&'static str>();
	let template = div()
		.child("items:")
		.child(Node::future(async move { first_rx.await.unwrap_or("?") }))
		.child(Node::future(async move { second_rx.await.unwrap_or("?") }));

	mount(&doc, doc.root(), &template.into()).unwrap();
	second_tx.send(" two").unwrap();
	doc.run_until_stalled();
	assert_eq!(html(&doc), "<div>items: two</div>");

	first_tx.send(" one").unwrap();
	doc.run_until_stalled();
	assert_eq!(html(&doc), "<div>items: two one</div>");
}

/// Success Criterion 3: a future rendered by a component stays inside its output
#[rstest]
fn test_component_future_stays_in_slot(doc: Document) {
	let (sender, receiver) = oneshot::channel::<&'static str>();
	let receiver = RefCell::new(Some(receiver));
	let loader = ComponentFactory::new(move |_: &(), _: &Lifecycle| match receiver.borrow_mut().take() {
		Some(receiver) => Node::future(async move { receiver.await.unwrap_or("?") }),
		None => Node::Empty,
	})
	.create(());
	let template = Node::from((p().child("before"), loader, p().child("after")));

	mount(&doc, doc.root(), &template).unwrap();
	sender.send("loaded").unwrap();
	doc.run_until_stalled();

	assert_eq!(html(&doc), "<p>before</p>loaded<p>after</p>");
}

/// Success Criterion 3: a dropped sender still resolves the leaf
#[rstest]
fn test_future_with_cancelled_source(doc: Document) {
	let (sender, receiver) = oneshot::channel::<&'static str>();
	let node = Node::future(async move { receiver.await.unwrap_or("cancelled") });

	mount(&doc, doc.root(), &node).unwrap();
	drop(sender);
	doc.run_until_stalled();

	assert_eq!(html(&doc), "cancelled");
}

/// Success Criterion 4: adopted rules follow their signals
#[rstest]
fn test_reactive_stylesheet(doc: Document) {
	let color = Signal::new("red".to_string());
	let sheet = css!("& { color: " {&color} "; }").unwrap();
	let class = sheet.class_name().to_string();

	mount(&doc, doc.root(), &div().style(sheet).into()).unwrap();
	color.set("blue".to_string());

	let adopted = doc.adopted_style_sheets();
	assert_eq!(adopted.len(), 1);
	assert_eq!(adopted[0].rules(), vec![format!(".{class} {{ color: blue; }}")]);
	assert!(doc.has_class(doc.element_children(doc.root())[0], &class));
}

/// Success Criterion 1: replace mode swaps previous content
#[rstest]
fn test_mount_with_replace(doc: Document) {
	mount(&doc, doc.root(), &p().child("old").into()).unwrap();

	mount_with(&doc, doc.root(), &p().child("new").into(), MountOptions::replace()).unwrap();

	assert_eq!(html(&doc), "<p>new</p>");
}
