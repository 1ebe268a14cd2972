//! Reading host DOM content back into [`VNode`]s.
//!
//! Every attribute is loaded as [`Value::Text`] under its DOM name, so `className` comes back as `class`
//! and boolean attributes come back as `""`. Listeners aren't visible to the host and are never loaded.

use crate::{dom::HostNode, Dom, VElement, VNode, Value};
use tracing::warn;

pub fn load_child_nodes<D: Dom>(dom: &D, parent: &D::Node) -> Vec<VNode> {
	dom.child_nodes(parent).iter().filter_map(|child| load_node(dom, child)).collect()
}

/// Loads `node` and its subtree, or [`None`] for node kinds [`VNode`] can't describe (like comments).
pub fn load_node<D: Dom>(dom: &D, node: &D::Node) -> Option<VNode> {
	match dom.inspect(node) {
		HostNode::Element { tag, attributes } => Some(load_element(dom, node, &tag, attributes).into()),
		HostNode::Text(text) => Some(VNode::Text(text)),
		HostNode::Other => {
			warn!("Skipping unrecognised node {:?}", node);
			None
		}
	}
}

pub fn load_element<D: Dom>(dom: &D, element: &D::Node, tag: &str, attributes: Vec<(String, String)>) -> VElement {
	attributes
		.into_iter()
		.fold(VElement::new(tag.to_ascii_lowercase()), |loaded, (name, value)| loaded.attr(name, Value::Text(value)))
		.with_children(load_child_nodes(dom, element))
}
