//! An in-process [`Dom`] that records every mutation.
//!
//! Nodes live in an arena and are never freed, so a [`NodeId`] stays valid (and keeps its identity)
//! for the lifetime of its [`MemoryDom`], detached or not.

use crate::{
	dom::{Dom, HostError, HostNode},
	Event, EventHandler,
};
use core::fmt::Write as _;
use std::collections::BTreeMap;
use tracing::trace;

/// A node handle. Equal ids are the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// One recorded host write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	CreateElement { node: NodeId, tag: String },
	CreateText { node: NodeId, data: String },
	SetText { node: NodeId, data: String },
	SetAttribute { node: NodeId, name: String, value: String },
	RemoveAttribute { node: NodeId, name: String },
	SetStyle { node: NodeId, property: String, value: String },
	RemoveStyle { node: NodeId, property: String },
	AddListener { node: NodeId, event: String },
	RemoveListener { node: NodeId, event: String },
	AppendChild { parent: NodeId, child: NodeId },
	ReplaceChild { parent: NodeId, new_child: NodeId, old_child: NodeId },
	RemoveChild { parent: NodeId, child: NodeId },
}

#[derive(Debug)]
enum Data {
	Element(ElementData),
	Text(String),
}

#[derive(Debug)]
struct ElementData {
	tag: String,
	attributes: BTreeMap<String, String>,
	styles: BTreeMap<String, String>,
	listeners: Vec<(ListenerId, String, EventHandler)>,
}

#[derive(Debug)]
struct Slot {
	data: Data,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct MemoryDom {
	slots: Vec<Slot>,
	next_listener: u64,
	mutations: Vec<Mutation>,
}

impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn slot(&self, node: NodeId) -> Option<&Slot> {
		self.slots.get(node.0)
	}

	fn slot_mut(&mut self, node: NodeId, operation: &'static str) -> Result<&mut Slot, HostError> {
		self.slots.get_mut(node.0).ok_or_else(|| HostError::new(operation, format!("unknown node {:?}", node)))
	}

	fn element(&self, node: NodeId) -> Option<&ElementData> {
		match &self.slot(node)?.data {
			Data::Element(element) => Some(element),
			Data::Text(_) => None,
		}
	}

	fn element_mut(&mut self, node: NodeId, operation: &'static str) -> Result<&mut ElementData, HostError> {
		match &mut self.slot_mut(node, operation)?.data {
			Data::Element(element) => Ok(element),
			Data::Text(_) => Err(HostError::new(operation, format!("{:?} is not an element", node))),
		}
	}

	fn push(&mut self, data: Data) -> NodeId {
		let id = NodeId(self.slots.len());
		self.slots.push(Slot {
			data,
			parent: None,
			children: Vec::new(),
		});
		id
	}

	fn record(&mut self, mutation: Mutation) {
		trace!(?mutation, "Recording");
		self.mutations.push(mutation);
	}

	/// Removes `child` from its current parent's child list, if any. Not recorded.
	fn detach(&mut self, child: NodeId) {
		if let Some(parent) = self.slots.get_mut(child.0).and_then(|slot| slot.parent.take()) {
			if let Some(parent) = self.slots.get_mut(parent.0) {
				parent.children.retain(|&sibling| sibling != child);
			}
		}
	}

	fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.parent(node) {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}

	fn check_insertable(&self, parent: NodeId, child: NodeId, operation: &'static str) -> Result<(), HostError> {
		if self.element(parent).is_none() {
			return Err(HostError::new(operation, format!("parent {:?} is not an element", parent)));
		}
		if self.slot(child).is_none() {
			return Err(HostError::new(operation, format!("unknown node {:?}", child)));
		}
		if self.is_ancestor_or_self(child, parent) {
			return Err(HostError::new(operation, format!("{:?} would become its own descendant", child)));
		}
		Ok(())
	}

	/// Every mutation recorded so far.
	#[must_use]
	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	/// Returns and clears the mutation log.
	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		std::mem::take(&mut self.mutations)
	}

	#[must_use]
	pub fn tag(&self, node: NodeId) -> Option<&str> {
		self.element(node).map(|element| element.tag.as_str())
	}

	/// A text node's character data.
	#[must_use]
	pub fn text(&self, node: NodeId) -> Option<&str> {
		match &self.slot(node)?.data {
			Data::Text(text) => Some(text),
			Data::Element(_) => None,
		}
	}

	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.element(node)?.attributes.get(name).map(String::as_str)
	}

	#[must_use]
	pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
		self.element(node)?.styles.get(property).map(String::as_str)
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> &[NodeId] {
		self.slot(node).map_or(&[][..], |slot| slot.children.as_slice())
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.slot(node)?.parent
	}

	#[must_use]
	pub fn listener_count(&self, node: NodeId) -> usize {
		self.element(node).map_or(0, |element| element.listeners.len())
	}

	/// Calls each listener bound on `node` for `kind`, in binding order, and returns how many ran.
	///
	/// Events don't bubble. Dispatching to a node without matching listeners does nothing.
	pub fn dispatch(&self, node: NodeId, kind: &str) -> usize {
		let handlers: Vec<EventHandler> = match self.element(node) {
			Some(element) => element.listeners.iter().filter(|(_, event, _)| event == kind).map(|(_, _, handler)| handler.clone()).collect(),
			None => return 0,
		};
		let event = Event::new(kind);
		for handler in &handlers {
			handler.call(&event);
		}
		handlers.len()
	}

	/// Serializes `node` and its subtree. Attributes are sorted by name, `style` properties are folded into the `style` attribute.
	#[must_use]
	pub fn to_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		let slot = match self.slot(node) {
			Some(slot) => slot,
			None => return,
		};
		match &slot.data {
			Data::Text(text) => escape_into(text, html),
			Data::Element(element) => {
				html.push('<');
				html.push_str(&element.tag);
				for (name, value) in element_attributes(element) {
					let _ = write!(html, " {}=\"", name);
					escape_into(&value, html);
					html.push('"');
				}
				html.push('>');
				for &child in &slot.children {
					self.write_html(child, html);
				}
				let _ = write!(html, "</{}>", element.tag);
			}
		}
	}
}

/// The element's attributes as the DOM would report them, with style properties folded into `style`.
fn element_attributes(element: &ElementData) -> Vec<(String, String)> {
	let mut attributes: Vec<(String, String)> = element.attributes.iter().map(|(name, value)| (name.clone(), value.clone())).collect();
	if !element.styles.is_empty() {
		let style = element.styles.iter().map(|(property, value)| format!("{}: {};", property, value)).collect::<Vec<_>>().join(" ");
		attributes.retain(|(name, _)| name != "style");
		attributes.push(("style".to_owned(), style));
		attributes.sort();
	}
	attributes
}

fn escape_into(text: &str, html: &mut String) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' => html.push_str("&lt;"),
			'>' => html.push_str("&gt;"),
			'"' => html.push_str("&quot;"),
			c => html.push(c),
		}
	}
}

impl Dom for MemoryDom {
	type Node = NodeId;
	type Listener = ListenerId;

	fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError> {
		if tag.is_empty() {
			return Err(HostError::new("createElement", "empty tag name"));
		}
		let node = self.push(Data::Element(ElementData {
			tag: tag.to_owned(),
			attributes: BTreeMap::new(),
			styles: BTreeMap::new(),
			listeners: Vec::new(),
		}));
		self.record(Mutation::CreateElement { node, tag: tag.to_owned() });
		Ok(node)
	}

	fn create_text_node(&mut self, data: &str) -> NodeId {
		let node = self.push(Data::Text(data.to_owned()));
		self.record(Mutation::CreateText { node, data: data.to_owned() });
		node
	}

	fn set_text(&mut self, text: &NodeId, data: &str) -> Result<(), HostError> {
		match &mut self.slot_mut(*text, "setText")?.data {
			Data::Text(current) => data.clone_into(current),
			Data::Element(_) => return Err(HostError::new("setText", format!("{:?} is not a text node", text))),
		}
		self.record(Mutation::SetText { node: *text, data: data.to_owned() });
		Ok(())
	}

	fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) -> Result<(), HostError> {
		let data = self.element_mut(*element, "setAttribute")?;
		if name == "style" {
			data.styles.clear();
		}
		data.attributes.insert(name.to_owned(), value.to_owned());
		self.record(Mutation::SetAttribute {
			node: *element,
			name: name.to_owned(),
			value: value.to_owned(),
		});
		Ok(())
	}

	fn remove_attribute(&mut self, element: &NodeId, name: &str) -> Result<(), HostError> {
		let data = self.element_mut(*element, "removeAttribute")?;
		if name == "style" {
			data.styles.clear();
		}
		data.attributes.remove(name);
		self.record(Mutation::RemoveAttribute { node: *element, name: name.to_owned() });
		Ok(())
	}

	fn set_boolean(&mut self, element: &NodeId, name: &str, present: bool) -> Result<(), HostError> {
		if present {
			self.set_attribute(element, name, "")
		} else {
			self.remove_attribute(element, name)
		}
	}

	fn set_style_property(&mut self, element: &NodeId, property: &str, value: &str) -> Result<(), HostError> {
		self.element_mut(*element, "style.setProperty")?.styles.insert(property.to_owned(), value.to_owned());
		self.record(Mutation::SetStyle {
			node: *element,
			property: property.to_owned(),
			value: value.to_owned(),
		});
		Ok(())
	}

	fn remove_style_property(&mut self, element: &NodeId, property: &str) -> Result<(), HostError> {
		self.element_mut(*element, "style.removeProperty")?.styles.remove(property);
		self.record(Mutation::RemoveStyle {
			node: *element,
			property: property.to_owned(),
		});
		Ok(())
	}

	fn add_event_listener(&mut self, element: &NodeId, event: &str, handler: &EventHandler) -> Result<ListenerId, HostError> {
		let id = ListenerId(self.next_listener);
		self.element_mut(*element, "addEventListener")?.listeners.push((id, event.to_owned(), handler.clone()));
		self.next_listener += 1;
		self.record(Mutation::AddListener {
			node: *element,
			event: event.to_owned(),
		});
		Ok(id)
	}

	fn remove_event_listener(&mut self, element: &NodeId, event: &str, listener: ListenerId) -> Result<(), HostError> {
		let listeners = &mut self.element_mut(*element, "removeEventListener")?.listeners;
		let index = listeners
			.iter()
			.position(|(id, bound_event, _)| *id == listener && bound_event == event)
			.ok_or_else(|| HostError::new("removeEventListener", format!("{:?} is not bound for {:?}", listener, event)))?;
		listeners.remove(index);
		self.record(Mutation::RemoveListener {
			node: *element,
			event: event.to_owned(),
		});
		Ok(())
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
		self.check_insertable(*parent, *child, "appendChild")?;
		self.detach(*child);
		self.slot_mut(*parent, "appendChild")?.children.push(*child);
		self.slot_mut(*child, "appendChild")?.parent = Some(*parent);
		self.record(Mutation::AppendChild { parent: *parent, child: *child });
		Ok(())
	}

	fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) -> Result<(), HostError> {
		if self.parent(*old_child) != Some(*parent) {
			return Err(HostError::new("replaceChild", format!("{:?} is not a child of {:?}", old_child, parent)));
		}
		if new_child == old_child {
			return Ok(());
		}
		self.check_insertable(*parent, *new_child, "replaceChild")?;
		self.detach(*new_child);

		let siblings = &mut self.slot_mut(*parent, "replaceChild")?.children;
		let index = siblings
			.iter()
			.position(|sibling| sibling == old_child)
			.ok_or_else(|| HostError::new("replaceChild", format!("{:?} is missing from {:?}", old_child, parent)))?;
		siblings[index] = *new_child;

		self.slot_mut(*old_child, "replaceChild")?.parent = None;
		self.slot_mut(*new_child, "replaceChild")?.parent = Some(*parent);
		self.record(Mutation::ReplaceChild {
			parent: *parent,
			new_child: *new_child,
			old_child: *old_child,
		});
		Ok(())
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
		if self.parent(*child) != Some(*parent) {
			return Err(HostError::new("removeChild", format!("{:?} is not a child of {:?}", child, parent)));
		}
		self.detach(*child);
		self.record(Mutation::RemoveChild { parent: *parent, child: *child });
		Ok(())
	}

	fn clear_children(&mut self, parent: &NodeId) -> Result<(), HostError> {
		let children = std::mem::take(&mut self.slot_mut(*parent, "clearChildren")?.children);
		for child in children {
			if let Some(slot) = self.slots.get_mut(child.0) {
				slot.parent = None;
			}
			self.record(Mutation::RemoveChild { parent: *parent, child });
		}
		Ok(())
	}

	fn inspect(&self, node: &NodeId) -> HostNode {
		match self.slot(*node).map(|slot| &slot.data) {
			Some(Data::Element(element)) => HostNode::Element {
				tag: element.tag.clone(),
				attributes: element_attributes(element),
			},
			Some(Data::Text(text)) => HostNode::Text(text.clone()),
			None => HostNode::Other,
		}
	}

	fn child_nodes(&self, parent: &NodeId) -> Vec<NodeId> {
		self.children(*parent).to_vec()
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.parent(*node)
	}
}
