//! The host DOM abstraction the differ writes through.
//!
//! [`WebDom`](`crate::web::WebDom`) implements it on top of [***web-sys***](https://docs.rs/web-sys),
//! [`MemoryDom`](`crate::memory::MemoryDom`) on top of an in-process arena.

use crate::EventHandler;
use core::fmt::Debug;
use thiserror::Error;

/// A failed host operation.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {message}")]
pub struct HostError {
	pub operation: &'static str,
	pub message: String,
}
impl HostError {
	#[must_use]
	pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
		Self {
			operation,
			message: message.into(),
		}
	}
}

/// Read-only view of a single host node, as used by [`load`](`crate::load`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNode {
	Element { tag: String, attributes: Vec<(String, String)> },
	Text(String),
	/// Comments, processing instructions and the like.
	Other,
}

/// A mutable document the differ can materialize into and patch.
///
/// Element-only operations receive element handles. Calling them with a text node is a host error.
pub trait Dom {
	/// A cheap handle to one node. Equality must be node identity.
	type Node: Clone + PartialEq + Debug;

	/// An owned registration of one event listener, returned to [`Dom::remove_event_listener`] to unbind it.
	type Listener;

	fn create_element(&mut self, tag: &str) -> Result<Self::Node, HostError>;
	fn create_text_node(&mut self, data: &str) -> Self::Node;

	/// Overwrites a text node's character data in place.
	fn set_text(&mut self, text: &Self::Node, data: &str) -> Result<(), HostError>;

	fn set_attribute(&mut self, element: &Self::Node, name: &str, value: &str) -> Result<(), HostError>;
	fn remove_attribute(&mut self, element: &Self::Node, name: &str) -> Result<(), HostError>;

	/// Presence/absence attribute. `true` sets it to the empty string, `false` removes it entirely.
	fn set_boolean(&mut self, element: &Self::Node, name: &str, present: bool) -> Result<(), HostError>;

	fn set_style_property(&mut self, element: &Self::Node, property: &str, value: &str) -> Result<(), HostError>;
	fn remove_style_property(&mut self, element: &Self::Node, property: &str) -> Result<(), HostError>;

	fn add_event_listener(&mut self, element: &Self::Node, event: &str, handler: &EventHandler) -> Result<Self::Listener, HostError>;
	fn remove_event_listener(&mut self, element: &Self::Node, event: &str, listener: Self::Listener) -> Result<(), HostError>;

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
	fn replace_child(&mut self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node) -> Result<(), HostError>;
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

	/// Detaches all children of `parent`.
	fn clear_children(&mut self, parent: &Self::Node) -> Result<(), HostError>;

	fn inspect(&self, node: &Self::Node) -> HostNode;
	fn child_nodes(&self, parent: &Self::Node) -> Vec<Self::Node>;
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
}
