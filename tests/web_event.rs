#![cfg(target_arch = "wasm32")]

use mini_vdom::{render, web::WebDom, Dom as _, VElement};
use std::{cell::Cell, rc::Rc, sync::Once};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

#[wasm_bindgen_test]
fn click() {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let mut dom = WebDom::new().unwrap();
	let container = dom.create_element("div").unwrap();
	let body: Node = dom.document().body().unwrap().into();
	dom.append_child(&body, &container).unwrap();

	let click_count = Rc::new(Cell::new(0));
	let button = VElement::new("button")
		.attr("id", "test-button")
		.on("click", {
			let click_count = Rc::clone(&click_count);
			move |event| {
				event.web().expect("Expected a browser event.");
				click_count.set(click_count.get() + 1)
			}
		})
		.into();

	let mut mount = render(&mut dom, button, container).unwrap();
	assert_eq!(click_count.get(), 0);

	let button: HtmlElement = window().unwrap().document().unwrap().get_element_by_id("test-button").unwrap().dyn_into().unwrap();
	button.click();
	assert_eq!(click_count.get(), 1);

	mount.unmount(&mut dom).unwrap();
	button.click();
	assert_eq!(click_count.get(), 1);
}
