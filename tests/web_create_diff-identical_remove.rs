#![cfg(target_arch = "wasm32")]

use mini_vdom::{h, web::WebDom, Dom as _, Mount, VNode, Value};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::Node;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn text() {
	test_create_diff_identical_remove(VNode::text("Hello mini-vdom text!"), 1);
}

#[wasm_bindgen_test]
fn minimal_div() {
	test_create_diff_identical_remove(h("div", vec![], vec![]), 1);
}

#[wasm_bindgen_test]
fn nested() {
	test_create_diff_identical_remove(
		h("p", vec![("title", "nested".into())], vec!["Hello".into(), h("b", vec![], vec![" nested ".into()]), "nodes!".into()]),
		5,
	);
}

#[wasm_bindgen_test]
fn clickable_div() {
	test_create_diff_identical_remove(h("div", vec![("onclick", Value::handler(|_| ()))], vec![]), 1);
}

fn test_create_diff_identical_remove(vdom: VNode, created: usize) {
	let mut dom = WebDom::new().unwrap();
	let container = dom.create_element("div").unwrap();
	let body: Node = dom.document().body().unwrap().into();
	dom.append_child(&body, &container).unwrap();

	let mut mount = Mount::new(container.clone());

	mount.update(&mut dom, vdom.clone()).unwrap();
	assert_eq!(mount.last_patch().created, created);
	let root = mount.root().unwrap().node().clone();

	mount.update(&mut dom, vdom.clone()).unwrap();
	assert!(mount.last_patch().is_noop());
	assert_eq!(mount.root().unwrap().node(), &root);

	assert_eq!(mount.unmount(&mut dom).unwrap(), Some(vdom));
	assert_eq!(mount.root().map(|root| root.total_listener_count()), None);
	assert!(!container.has_child_nodes());
}
