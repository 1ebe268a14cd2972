use crate::{
	attributes::{self, Attribute},
	Error,
};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use std::rc::Rc;

/// The tag [`VNode::Text`] reports through [`VNode::tag`].
pub const TEXT_TAG: &str = "#text";

/// An immutable description of one DOM node and its subtree.
///
/// A fresh tree is produced on each application render and handed to [`Mount::update`](`crate::Mount::update`),
/// which diffs it against the tree it replaces. Trees are never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
	Element(VElement),
	Text(String),
}

/// The element variant of [`VNode`].
///
/// Attribute order is irrelevant. Child order is significant and maps positionally onto the DOM's `childNodes`.
#[derive(Debug, Clone, PartialEq)]
pub struct VElement {
	tag: String,
	attributes: HashMap<String, Value>,
	children: Vec<VNode>,
}

/// An attribute or property value.
///
/// How a value is written to the DOM depends on both its variant and the attribute name.
/// See [`VElement::attr`] for the rules.
#[derive(Debug, Clone)]
pub enum Value {
	Text(String),
	/// Must be finite.
	Number(f64),
	/// Presence/absence, like `checked` or `disabled`. Passed through as `"true"`/`"false"` for `data-*` names.
	Bool(bool),
	/// Individual style properties, only valid as `style`.
	Style(HashMap<String, String>),
	/// A native event listener, only valid under an `on…` name.
	Handler(EventHandler),
	/// Event name to listener, only valid as `on`.
	Events(HashMap<String, EventHandler>),
}

/// A shared event callback.
///
/// Two handlers are the same exactly if they were cloned from the same [`EventHandler::new`] call,
/// so re-rendering with a clone doesn't rebind the listener.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

/// An event delivered to an [`EventHandler`].
#[derive(Debug, Clone)]
pub struct Event {
	kind: String,
	web: Option<web_sys::Event>,
}

impl VNode {
	pub fn text(data: impl Into<String>) -> Self {
		Self::Text(data.into())
	}

	/// The element's tag name, or [`TEXT_TAG`] for text.
	#[must_use]
	pub fn tag(&self) -> &str {
		match self {
			VNode::Element(element) => element.tag(),
			VNode::Text(_) => TEXT_TAG,
		}
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&VElement> {
		match self {
			VNode::Element(element) => Some(element),
			VNode::Text(_) => None,
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			VNode::Element(_) => None,
			VNode::Text(text) => Some(text),
		}
	}

	#[must_use]
	pub fn key(&self) -> Option<&Value> {
		self.as_element().and_then(VElement::key)
	}

	/// Whether the DOM node produced for `self` can be reused for `other`.
	///
	/// Tags must match. Keys are compared only if both elements define one.
	#[must_use]
	pub fn same_instance(&self, other: &Self) -> bool {
		match (self, other) {
			(VNode::Text(_), VNode::Text(_)) => true,
			(VNode::Element(e_1), VNode::Element(e_2)) => e_1.same_instance(e_2),
			_ => false,
		}
	}

	/// Checks the whole tree for input the differ would reject, without touching any DOM.
	///
	/// # Errors
	///
	/// Invalid tags, attribute names or values, conflicting attributes, or a tree deeper than `depth_limit`.
	pub fn validate(&self, depth_limit: usize) -> Result<(), Error> {
		self.validate_at(1, depth_limit)
	}

	fn validate_at(&self, depth: usize, depth_limit: usize) -> Result<(), Error> {
		if depth > depth_limit {
			return Err(Error::DepthLimit { limit: depth_limit });
		}
		match self {
			VNode::Text(_) => Ok(()),
			VNode::Element(element) => {
				element.validate_shallow()?;
				element.children.iter().try_for_each(|child| child.validate_at(depth + 1, depth_limit))
			}
		}
	}
}

impl VElement {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attributes: HashMap::new(),
			children: Vec::new(),
		}
	}

	/// Sets an attribute, replacing any previous value under the same name.
	///
	/// - `key` is used only to tell element instances apart and is never rendered.
	/// - `on<event>` with a [`Value::Handler`] binds a native listener for the lowercased `<event>`.
	/// - `on` with [`Value::Events`] binds one listener per entry.
	/// - `style` takes either a [`Value::Text`] or a [`Value::Style`] map.
	/// - `class` and `className` both render as `class`.
	/// - `data-*` values are passed through verbatim.
	/// - [`Value::Bool`] anywhere else is a presence/absence attribute.
	#[must_use]
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Shorthand for `.attr(format!("on{}", event), Value::handler(handler))`.
	#[must_use]
	pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
		self.attr(format!("on{}", event), Value::handler(handler))
	}

	#[must_use]
	pub fn with_key(self, key: impl Into<Value>) -> Self {
		self.attr("key", key)
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<VNode>) -> Self {
		self.children.push(child.into());
		self
	}

	/// Appends `children` in order. [`None`] entries are skipped, which keeps conditional children inline.
	#[must_use]
	pub fn with_children(mut self, children: impl IntoIterator<Item = impl Into<Option<VNode>>>) -> Self {
		self.children.extend(children.into_iter().filter_map(Into::<Option<VNode>>::into));
		self
	}

	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn attributes(&self) -> &HashMap<String, Value> {
		&self.attributes
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&Value> {
		self.attributes.get(name)
	}

	#[must_use]
	pub fn children(&self) -> &[VNode] {
		&self.children
	}

	#[must_use]
	pub fn key(&self) -> Option<&Value> {
		self.attributes.get("key")
	}

	#[must_use]
	pub fn same_instance(&self, other: &Self) -> bool {
		self.tag == other.tag
			&& match (self.key(), other.key()) {
				(Some(k_1), Some(k_2)) => k_1.same_as(k_2),
				_ => true,
			}
	}

	fn validate_shallow(&self) -> Result<(), Error> {
		if !is_valid_tag(&self.tag) {
			return Err(Error::InvalidTag(self.tag.clone()));
		}

		let mut class_source: Option<&str> = None;
		let mut listener_sources = HashMap::<String, &str>::new();
		for (name, value) in &self.attributes {
			match attributes::classify(name, value)? {
				Attribute::Plain { name: "class", .. } => {
					if let Some(previous) = class_source.replace(name) {
						return Err(Error::ConflictingAttributes(previous.to_owned(), name.clone()));
					}
				}
				Attribute::Listener { event, .. } => {
					if let Some(previous) = listener_sources.insert(event, name) {
						return Err(Error::ConflictingAttributes(previous.to_owned(), name.clone()));
					}
				}
				Attribute::Listeners(events) => {
					for event in events.keys() {
						if let Some(previous) = listener_sources.insert(event.clone(), name) {
							return Err(Error::ConflictingAttributes(previous.to_owned(), name.clone()));
						}
					}
				}
				_ => (),
			}
		}
		Ok(())
	}
}

fn is_valid_tag(tag: &str) -> bool {
	let mut chars = tag.chars();
	chars.next().map_or(false, |first| first.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Builds an element [`VNode`] in one expression.
///
/// ```
/// use mini_vdom::{h, Value};
///
/// let list = h("ul", vec![("className", "todo-list".into())], vec![h("li", vec![("checked", Value::Bool(true))], vec!["x".into()])]);
/// assert_eq!(list.tag(), "ul");
/// ```
#[must_use]
pub fn h(tag: &str, attributes: Vec<(&str, Value)>, children: Vec<VNode>) -> VNode {
	attributes
		.into_iter()
		.fold(VElement::new(tag), |element, (name, value)| element.attr(name, value))
		.with_children(children)
		.into()
}

impl From<VElement> for VNode {
	fn from(element: VElement) -> Self {
		Self::Element(element)
	}
}

impl From<&str> for VNode {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for VNode {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

/// Numbers become text, formatted like numeric attribute values.
impl From<f64> for VNode {
	fn from(number: f64) -> Self {
		Self::Text(number.to_string())
	}
}

impl From<i32> for VNode {
	fn from(number: i32) -> Self {
		f64::from(number).into()
	}
}

impl From<u32> for VNode {
	fn from(number: u32) -> Self {
		f64::from(number).into()
	}
}

impl Value {
	pub fn handler(handler: impl Fn(&Event) + 'static) -> Self {
		Self::Handler(EventHandler::new(handler))
	}

	pub fn style<K: Into<String>, V: Into<String>>(properties: impl IntoIterator<Item = (K, V)>) -> Self {
		Self::Style(properties.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}

	pub fn events<K: Into<String>>(events: impl IntoIterator<Item = (K, EventHandler)>) -> Self {
		Self::Events(events.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}

	/// Value equality for primitives and maps, identity for handlers.
	#[must_use]
	#[allow(clippy::float_cmp)]
	pub fn same_as(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Text(a), Value::Text(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Style(a), Value::Style(b)) => a == b,
			(Value::Handler(a), Value::Handler(b)) => a.same_as(b),
			(Value::Events(a), Value::Events(b)) => a.len() == b.len() && a.iter().all(|(event, handler)| b.get(event).map_or(false, |other| handler.same_as(other))),
			_ => false,
		}
	}

	pub(crate) fn kind_name(&self) -> &'static str {
		match self {
			Value::Text(_) => "text",
			Value::Number(number) if !number.is_finite() => "a non-finite number",
			Value::Number(_) => "a number",
			Value::Bool(_) => "a bool",
			Value::Style(_) => "a style map",
			Value::Handler(_) => "an event handler",
			Value::Events(_) => "an event map",
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		self.same_as(other)
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<bool> for Value {
	fn from(bool: bool) -> Self {
		Self::Bool(bool)
	}
}

impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}

impl From<i32> for Value {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}

impl From<u32> for Value {
	fn from(number: u32) -> Self {
		Self::Number(number.into())
	}
}

impl From<EventHandler> for Value {
	fn from(handler: EventHandler) -> Self {
		Self::Handler(handler)
	}
}

impl EventHandler {
	pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &Event) {
		(self.0)(event)
	}

	#[must_use]
	pub fn same_as(&self, other: &Self) -> bool {
		self.address() == other.address()
	}

	fn address(&self) -> *const () {
		Rc::as_ptr(&self.0).cast::<()>()
	}
}

impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		self.same_as(other)
	}
}

impl Debug for EventHandler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EventHandler").field(&self.address()).finish()
	}
}

impl Event {
	pub fn new(kind: impl Into<String>) -> Self {
		Self { kind: kind.into(), web: None }
	}

	#[must_use]
	pub fn from_web(event: web_sys::Event) -> Self {
		Self {
			kind: event.type_(),
			web: Some(event),
		}
	}

	/// The event type, like `"click"`.
	#[must_use]
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// The browser event this was created from, if any.
	#[must_use]
	pub fn web(&self) -> Option<&web_sys::Event> {
		self.web.as_ref()
	}
}
