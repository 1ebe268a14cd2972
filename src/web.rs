//! The browser host.

use crate::{
	dom::{Dom, HostError, HostNode},
	Event, EventHandler,
};
use js_sys::Reflect;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{CharacterData, Document, Element, HtmlElement, Node};

/// Writes into a live [`web_sys::Document`].
///
/// Listeners are [`Closure`]s owned by the [`LiveNode`](`crate::LiveNode`) that bound them.
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
}

impl WebDom {
	/// Uses the current window's document.
	///
	/// # Errors
	///
	/// Iff there's no window or it has no document, i.e. outside a browser main thread.
	pub fn new() -> Result<Self, HostError> {
		let document = web_sys::window()
			.ok_or_else(|| HostError::new("window", "no global window"))?
			.document()
			.ok_or_else(|| HostError::new("window.document", "window has no document"))?;
		Ok(Self::from_document(document))
	}

	#[must_use]
	pub fn from_document(document: Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}
}

fn host_error(operation: &'static str) -> impl FnOnce(JsValue) -> HostError {
	move |error| HostError::new(operation, format!("{:?}", error))
}

fn as_element<'a>(node: &'a Node, operation: &'static str) -> Result<&'a Element, HostError> {
	node.dyn_ref::<Element>()
		.ok_or_else(|| HostError::new(operation, format!("{:?} is not an element", node.node_name())))
}

fn html_element<'a>(node: &'a Node, operation: &'static str) -> Result<&'a HtmlElement, HostError> {
	node.dyn_ref::<HtmlElement>()
		.ok_or_else(|| HostError::new(operation, format!("{:?} is not an HTML element", node.node_name())))
}

/// Sets the IDL property `name` if `element` has one, so live state (like `checked`) follows the attribute.
fn reflect(element: &Element, name: &str, value: &JsValue, operation: &'static str) -> Result<(), HostError> {
	let key = JsValue::from_str(name);
	if Reflect::has(element, &key).map_err(host_error(operation))? {
		Reflect::set(element, &key, value).map_err(host_error(operation))?;
	}
	Ok(())
}

impl Dom for WebDom {
	type Node = Node;
	type Listener = Closure<dyn Fn(web_sys::Event)>;

	fn create_element(&mut self, tag: &str) -> Result<Node, HostError> {
		self.document.create_element(tag).map(Into::into).map_err(host_error("createElement"))
	}

	fn create_text_node(&mut self, data: &str) -> Node {
		self.document.create_text_node(data).into()
	}

	fn set_text(&mut self, text: &Node, data: &str) -> Result<(), HostError> {
		text.dyn_ref::<CharacterData>()
			.ok_or_else(|| HostError::new("setText", format!("{:?} is not character data", text.node_name())))?
			.set_data(data);
		Ok(())
	}

	fn set_attribute(&mut self, element: &Node, name: &str, value: &str) -> Result<(), HostError> {
		let element = as_element(element, "setAttribute")?;
		element.set_attribute(name, value).map_err(host_error("setAttribute"))?;
		if name == "value" {
			reflect(element, name, &JsValue::from_str(value), "setAttribute")?;
		}
		Ok(())
	}

	fn remove_attribute(&mut self, element: &Node, name: &str) -> Result<(), HostError> {
		let element = as_element(element, "removeAttribute")?;
		element.remove_attribute(name).map_err(host_error("removeAttribute"))?;
		if name == "value" {
			reflect(element, name, &JsValue::from_str(""), "removeAttribute")?;
		}
		Ok(())
	}

	fn set_boolean(&mut self, element: &Node, name: &str, present: bool) -> Result<(), HostError> {
		let element = as_element(element, "setBoolean")?;
		if present {
			element.set_attribute(name, "").map_err(host_error("setAttribute"))?;
		} else {
			element.remove_attribute(name).map_err(host_error("removeAttribute"))?;
		}
		reflect(element, name, &JsValue::from_bool(present), "setBoolean")
	}

	fn set_style_property(&mut self, element: &Node, property: &str, value: &str) -> Result<(), HostError> {
		html_element(element, "style.setProperty")?
			.style()
			.set_property(property, value)
			.map_err(host_error("style.setProperty"))
	}

	fn remove_style_property(&mut self, element: &Node, property: &str) -> Result<(), HostError> {
		html_element(element, "style.removeProperty")?
			.style()
			.remove_property(property)
			.map(drop)
			.map_err(host_error("style.removeProperty"))
	}

	fn add_event_listener(&mut self, element: &Node, event: &str, handler: &EventHandler) -> Result<Self::Listener, HostError> {
		let handler = handler.clone();
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| handler.call(&Event::from_web(event))) as Box<dyn Fn(web_sys::Event)>);
		element
			.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
			.map_err(host_error("addEventListener"))?;
		Ok(closure)
	}

	fn remove_event_listener(&mut self, element: &Node, event: &str, listener: Self::Listener) -> Result<(), HostError> {
		element
			.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
			.map_err(host_error("removeEventListener"))
	}

	fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), HostError> {
		parent.append_child(child).map(drop).map_err(host_error("appendChild"))
	}

	fn replace_child(&mut self, parent: &Node, new_child: &Node, old_child: &Node) -> Result<(), HostError> {
		parent.replace_child(new_child, old_child).map(drop).map_err(host_error("replaceChild"))
	}

	fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<(), HostError> {
		parent.remove_child(child).map(drop).map_err(host_error("removeChild"))
	}

	fn clear_children(&mut self, parent: &Node) -> Result<(), HostError> {
		while let Some(child) = parent.first_child() {
			parent.remove_child(&child).map_err(host_error("removeChild"))?;
		}
		Ok(())
	}

	fn inspect(&self, node: &Node) -> HostNode {
		match node.node_type() {
			Node::ELEMENT_NODE => match node.dyn_ref::<Element>() {
				Some(element) => {
					let map = element.attributes();
					let attributes = (0..map.length())
						.filter_map(|i| map.item(i))
						.map(|attribute| (attribute.name(), attribute.value()))
						.collect();
					HostNode::Element {
						tag: element.tag_name(),
						attributes,
					}
				}
				None => HostNode::Other,
			},
			Node::TEXT_NODE => match node.dyn_ref::<CharacterData>() {
				Some(text) => HostNode::Text(text.data()),
				None => HostNode::Other,
			},
			_ => HostNode::Other,
		}
	}

	fn child_nodes(&self, parent: &Node) -> Vec<Node> {
		let list = parent.child_nodes();
		(0..list.length()).filter_map(|i| list.item(i)).collect()
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}
}
