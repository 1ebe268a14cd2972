use mini_vdom::{
	h, materialize,
	memory::MemoryDom,
	render, Dom as _, EventHandler, Error, VElement, VNode, Value,
};
use std::{cell::Cell, rc::Rc};
use tracing::Level;

fn init_logging() {
	let _ = tracing_subscriber::fmt().with_max_level(Level::TRACE).with_test_writer().try_init();
}

#[test]
fn class_name_renders_as_class() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();

	let mount = render(&mut dom, h("ul", vec![("className", "todo-list".into())], vec![]), container).unwrap();
	let ul = *mount.root().unwrap().node();

	assert_eq!(dom.attribute(ul, "class"), Some("todo-list"));
	assert_eq!(dom.attribute(ul, "className"), None);
	assert_eq!(dom.to_html(container), r#"<div><ul class="todo-list"></ul></div>"#);
}

#[test]
fn attribute_kinds() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();

	let tree = h(
		"input",
		vec![
			("key", 7.into()),
			("type", "checkbox".into()),
			("checked", true.into()),
			("disabled", false.into()),
			("data-done", false.into()),
			("tabindex", 3.into()),
		],
		vec![],
	);
	let mount = render(&mut dom, tree, container).unwrap();
	let input = *mount.root().unwrap().node();

	assert_eq!(dom.attribute(input, "key"), None);
	assert_eq!(dom.attribute(input, "checked"), Some(""));
	assert_eq!(dom.attribute(input, "disabled"), None);
	assert_eq!(dom.attribute(input, "data-done"), Some("false"));
	assert_eq!(dom.attribute(input, "tabindex"), Some("3"));
	assert_eq!(
		dom.to_html(container),
		r#"<div><input checked="" data-done="false" tabindex="3" type="checkbox"></input></div>"#
	);
}

#[test]
fn styles() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();

	let tree = h(
		"section",
		vec![],
		vec![
			h("p", vec![("style", "color: red".into())], vec![]),
			h("p", vec![("style", Value::style([("color", "red"), ("margin", "0")]))], vec![]),
		],
	);
	let mount = render(&mut dom, tree, container).unwrap();
	let paragraphs = mount.root().unwrap().children();

	assert_eq!(dom.attribute(*paragraphs[0].node(), "style"), Some("color: red"));
	assert_eq!(dom.style(*paragraphs[1].node(), "color"), Some("red"));
	assert_eq!(dom.style(*paragraphs[1].node(), "margin"), Some("0"));
	assert_eq!(
		dom.to_html(container),
		r#"<div><section><p style="color: red"></p><p style="color: red; margin: 0;"></p></section></div>"#
	);
}

#[test]
fn listeners_are_bound_not_rendered() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();

	let clicks = Rc::new(Cell::new(0));
	let inputs = Rc::new(Cell::new(0));
	let tree = VElement::new("button")
		.on("Click", {
			let clicks = Rc::clone(&clicks);
			move |event| {
				assert_eq!(event.kind(), "click");
				clicks.set(clicks.get() + 1)
			}
		})
		.attr(
			"on",
			Value::events([("input", {
				let inputs = Rc::clone(&inputs);
				EventHandler::new(move |_| inputs.set(inputs.get() + 1))
			})]),
		)
		.child("Add")
		.into();
	let mount = render(&mut dom, tree, container).unwrap();
	let button = *mount.root().unwrap().node();

	assert_eq!(dom.listener_count(button), 2);
	assert_eq!(mount.root().unwrap().total_listener_count(), 2);
	assert_eq!(dom.to_html(container), "<div><button>Add</button></div>");

	assert_eq!(dom.dispatch(button, "click"), 1);
	assert_eq!(dom.dispatch(button, "input"), 1);
	assert_eq!(dom.dispatch(button, "keydown"), 0);
	assert_eq!((clicks.get(), inputs.get()), (1, 1));
}

#[test]
fn text_is_escaped_in_html_only() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();

	let mount = render(&mut dom, h("p", vec![("title", "\"quoted\"".into())], vec!["a < b".into()]), container).unwrap();
	let text = *mount.root().unwrap().children()[0].node();

	assert_eq!(dom.text(text), Some("a < b"));
	assert_eq!(dom.to_html(container), r#"<div><p title="&quot;quoted&quot;">a &lt; b</p></div>"#);
}

#[test]
fn render_clears_the_container() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();
	let stale = dom.create_text_node("Loading…");
	dom.append_child(&container, &stale).unwrap();

	let mount = render(&mut dom, h("main", vec![], vec![]), container).unwrap();

	assert_eq!(dom.children(container), &[*mount.root().unwrap().node()]);
	assert_eq!(dom.parent(stale), None);
}

#[test]
fn materialize_is_detached() {
	init_logging();
	let mut dom = MemoryDom::new();

	let live = materialize(&mut dom, &h("ul", vec![], vec![h("li", vec![], vec!["x".into()])])).unwrap();

	assert_eq!(dom.parent(*live.node()), None);
	assert_eq!(live.children().len(), 1);
	assert_eq!(dom.to_html(*live.node()), "<ul><li>x</li></ul>");
}

#[test]
fn invalid_input_creates_nothing() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();
	dom.take_mutations();

	let nested_invalid = h("ul", vec![], vec![h("li", vec![], vec![]), h("1li", vec![], vec![])]);
	assert!(matches!(render(&mut dom, nested_invalid, container), Err(Error::InvalidTag(tag)) if tag == "1li"));

	let conflicting = h("p", vec![("class", "a".into()), ("className", "b".into())], vec![]);
	assert!(matches!(render(&mut dom, conflicting, container), Err(Error::ConflictingAttributes(..))));

	let doubly_bound = VElement::new("button")
		.on("click", |_| ())
		.attr("on", Value::events([("click", EventHandler::new(|_| ()))]))
		.into();
	assert!(matches!(render(&mut dom, doubly_bound, container), Err(Error::ConflictingAttributes(..))));

	let misplaced_handler = h("p", vec![("title", Value::handler(|_| ()))], vec![]);
	assert!(matches!(render(&mut dom, misplaced_handler, container), Err(Error::InvalidAttributeValue { .. })));

	assert!(dom.mutations().is_empty());
	assert!(dom.children(container).is_empty());
}

#[test]
fn numbers_and_skipped_children() {
	init_logging();
	let mut dom = MemoryDom::new();
	let container = dom.create_element("div").unwrap();

	let done = false;
	let tree = VElement::new("span")
		.with_children([Some(3.into()), done.then(|| "done".into()), Some(VNode::from(" of ")), Some(2.5.into())])
		.into();
	let mount = render(&mut dom, tree, container).unwrap();

	assert_eq!(mount.root().unwrap().children().len(), 3);
	assert_eq!(dom.to_html(container), "<div><span>3 of 2.5</span></div>");
}
