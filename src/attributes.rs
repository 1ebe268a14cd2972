//! Attribute classification and the host writes for each attribute kind.
//!
//! Every `(name, value)` pair is resolved once into an [`Attribute`], which then decides
//! how it's applied, removed, or patched against its previous value.

use crate::{diff::PatchStats, materialize::LiveNode, Dom, Error, EventHandler, Value};
use hashbrown::HashMap;
use std::borrow::Cow;
use tracing::{error, trace};

#[derive(Debug)]
pub(crate) enum Attribute<'a> {
	/// Instance identity only. Never rendered.
	Key,
	Listener { event: String, handler: &'a EventHandler },
	Listeners(&'a HashMap<String, EventHandler>),
	InlineStyle(&'a str),
	StyleProperties(&'a HashMap<String, String>),
	Boolean { name: &'a str, present: bool },
	Data { name: &'a str, value: Cow<'a, str> },
	/// Includes `class`/`className`, normalized to `class`.
	Plain { name: &'a str, value: Cow<'a, str> },
}

pub(crate) fn classify<'a>(name: &'a str, value: &'a Value) -> Result<Attribute<'a>, Error> {
	if !is_valid_name(name) {
		return Err(Error::InvalidAttributeName(name.to_owned()));
	}

	let invalid = || Error::InvalidAttributeValue {
		name: name.to_owned(),
		found: value.kind_name(),
	};

	// Numbers must be finite, or an unchanged NaN would diff as changed.
	if matches!(value, Value::Number(number) if !number.is_finite()) {
		return Err(invalid());
	}

	Ok(match (name, value) {
		("key", Value::Text(_) | Value::Number(_)) => Attribute::Key,
		("key", _) => return Err(invalid()),

		("on", Value::Events(events)) => {
			if let Some(event) = events.keys().find(|event| !is_valid_name(event)) {
				return Err(Error::InvalidAttributeName(format!("on.{}", event)));
			}
			Attribute::Listeners(events)
		}
		("on", _) => return Err(invalid()),

		("style", Value::Text(style)) => Attribute::InlineStyle(style),
		("style", Value::Style(properties)) => Attribute::StyleProperties(properties),
		("style", _) => return Err(invalid()),

		("class" | "className", Value::Text(_) | Value::Number(_)) => Attribute::Plain {
			name: "class",
			value: stringify(value).ok_or_else(invalid)?,
		},
		("class" | "className", _) => return Err(invalid()),

		(_, Value::Handler(handler)) => match name.strip_prefix("on") {
			Some(event) if !event.is_empty() => Attribute::Listener {
				event: event.to_ascii_lowercase(),
				handler,
			},
			_ => return Err(invalid()),
		},
		(_, Value::Events(_) | Value::Style(_)) => return Err(invalid()),

		(_, _) if name.starts_with("data-") => Attribute::Data {
			name,
			value: stringify(value).ok_or_else(invalid)?,
		},
		(_, &Value::Bool(present)) => Attribute::Boolean { name, present },
		(_, _) => Attribute::Plain {
			name,
			value: stringify(value).ok_or_else(invalid)?,
		},
	})
}

fn is_valid_name(name: &str) -> bool {
	!name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '='))
}

fn stringify(value: &Value) -> Option<Cow<'_, str>> {
	match value {
		Value::Text(text) => Some(Cow::Borrowed(text)),
		Value::Number(number) => Some(Cow::Owned(number.to_string())),
		Value::Bool(bool) => Some(Cow::Borrowed(if *bool { "true" } else { "false" })),
		Value::Style(_) | Value::Handler(_) | Value::Events(_) => None,
	}
}

/// Writes `attribute` onto a node that doesn't have it yet.
pub(crate) fn apply<D: Dom>(dom: &mut D, live: &mut LiveNode<D>, attribute: &Attribute<'_>, stats: &mut PatchStats) {
	match attribute {
		Attribute::Key => (),
		Attribute::Listener { event, handler } => bind(dom, live, event, handler, stats),
		Attribute::Listeners(events) => {
			for (event, handler) in events.iter() {
				bind(dom, live, event, handler, stats)
			}
		}
		Attribute::InlineStyle(style) => set_attribute(dom, live, "style", style, stats),
		Attribute::StyleProperties(properties) => {
			for (property, value) in properties.iter() {
				set_style_property(dom, live, property, value, stats)
			}
		}
		&Attribute::Boolean { name, present } => {
			stats.attribute_writes += 1;
			if let Err(error) = dom.set_boolean(&live.node, name, present) {
				error!("Failed to set boolean attribute {:?}: {}", name, error)
			}
		}
		Attribute::Data { name, value } | Attribute::Plain { name, value } => set_attribute(dom, live, name, value, stats),
	}
}

/// Undoes `attribute`, which was previously applied to this node.
pub(crate) fn remove<D: Dom>(dom: &mut D, live: &mut LiveNode<D>, attribute: &Attribute<'_>, stats: &mut PatchStats) {
	match attribute {
		Attribute::Key => (),
		Attribute::Listener { event, .. } => unbind(dom, live, event, stats),
		Attribute::Listeners(events) => {
			for event in events.keys() {
				unbind(dom, live, event, stats)
			}
		}
		Attribute::InlineStyle(_) | Attribute::StyleProperties(_) => remove_attribute(dom, live, "style", stats),
		&Attribute::Boolean { name, .. } => {
			stats.attribute_writes += 1;
			if let Err(error) = dom.set_boolean(&live.node, name, false) {
				error!("Failed to clear boolean attribute {:?}: {}", name, error)
			}
		}
		Attribute::Data { name, .. } | Attribute::Plain { name, .. } => remove_attribute(dom, live, name, stats),
	}
}

/// Moves a node from `old` to `new`, both classified from the same attribute name.
pub(crate) fn patch<D: Dom>(dom: &mut D, live: &mut LiveNode<D>, old: &Attribute<'_>, new: &Attribute<'_>, stats: &mut PatchStats) {
	match (old, new) {
		(Attribute::Listener { event: e_1, .. }, Attribute::Listener { event: e_2, handler }) if e_1 == e_2 => bind(dom, live, e_2, handler, stats),
		(Attribute::Listeners(events_1), Attribute::Listeners(events_2)) => {
			for event in events_1.keys().filter(|event| !events_2.contains_key(*event)) {
				unbind(dom, live, event, stats)
			}
			for (event, handler) in events_2.iter() {
				match events_1.get(event) {
					Some(previous) if previous.same_as(handler) => (),
					_ => bind(dom, live, event, handler, stats),
				}
			}
		}
		(Attribute::StyleProperties(properties_1), Attribute::StyleProperties(properties_2)) => {
			for property in properties_1.keys().filter(|property| !properties_2.contains_key(*property)) {
				stats.attribute_writes += 1;
				if let Err(error) = dom.remove_style_property(&live.node, property) {
					error!("Failed to remove style property {:?}: {}", property, error)
				}
			}
			for (property, value) in properties_2.iter() {
				if properties_1.get(property) != Some(value) {
					set_style_property(dom, live, property, value, stats)
				}
			}
		}
		(Attribute::Key, Attribute::Key)
		| (Attribute::InlineStyle(_), Attribute::InlineStyle(_))
		| (Attribute::Boolean { .. }, Attribute::Boolean { .. })
		| (Attribute::Data { .. }, Attribute::Data { .. })
		| (Attribute::Plain { .. }, Attribute::Plain { .. }) => apply(dom, live, new, stats),
		(old, new) => {
			trace!("Attribute kind changed. Removing before reapplying.");
			remove(dom, live, old, stats);
			apply(dom, live, new, stats);
		}
	}
}

/// Binds `handler` for `event`, replacing any listener already bound for it.
fn bind<D: Dom>(dom: &mut D, live: &mut LiveNode<D>, event: &str, handler: &EventHandler, stats: &mut PatchStats) {
	unbind(dom, live, event, stats);
	match dom.add_event_listener(&live.node, event, handler) {
		Ok(listener) => {
			stats.listeners_bound += 1;
			live.listeners.insert(event.to_owned(), listener);
		}
		Err(error) => error!("Failed to add event listener {:?}: {}", event, error),
	}
}

fn unbind<D: Dom>(dom: &mut D, live: &mut LiveNode<D>, event: &str, stats: &mut PatchStats) {
	if let Some(listener) = live.listeners.remove(event) {
		stats.listeners_unbound += 1;
		if let Err(error) = dom.remove_event_listener(&live.node, event, listener) {
			error!("Failed to remove event listener {:?}: {}", event, error)
		}
	}
}

fn set_attribute<D: Dom>(dom: &mut D, live: &LiveNode<D>, name: &str, value: &str, stats: &mut PatchStats) {
	stats.attribute_writes += 1;
	if cfg!(feature = "dangerous-logging") {
		trace!(name, value, "Setting attribute");
	}
	if let Err(error) = dom.set_attribute(&live.node, name, value) {
		error!("Could not set attribute {:?}: {}", name, error)
	}
}

fn remove_attribute<D: Dom>(dom: &mut D, live: &LiveNode<D>, name: &str, stats: &mut PatchStats) {
	stats.attribute_writes += 1;
	if let Err(error) = dom.remove_attribute(&live.node, name) {
		error!("Could not remove attribute {:?}: {}", name, error)
	}
}

fn set_style_property<D: Dom>(dom: &mut D, live: &LiveNode<D>, property: &str, value: &str, stats: &mut PatchStats) {
	stats.attribute_writes += 1;
	if let Err(error) = dom.set_style_property(&live.node, property, value) {
		error!("Could not set style property {:?}: {}", property, error)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn class_name_normalizes_to_class() {
		let value = Value::from("todo-list");
		match classify("className", &value).unwrap() {
			Attribute::Plain { name, value } => {
				assert_eq!(name, "class");
				assert_eq!(value, "todo-list");
			}
			other => panic!("unexpected classification {:?}", other),
		}
	}

	#[test]
	fn handlers_need_an_event_name() {
		let handler = Value::Handler(EventHandler::new(|_| ()));
		match classify("onClick", &handler).unwrap() {
			Attribute::Listener { event, .. } => assert_eq!(event, "click"),
			other => panic!("unexpected classification {:?}", other),
		}
		assert!(matches!(classify("on", &handler), Err(Error::InvalidAttributeValue { .. })));
		assert!(matches!(classify("title", &handler), Err(Error::InvalidAttributeValue { .. })));
	}

	#[test]
	fn data_attributes_pass_bools_through() {
		match classify("data-done", &Value::Bool(false)).unwrap() {
			Attribute::Data { name, value } => {
				assert_eq!(name, "data-done");
				assert_eq!(value, "false");
			}
			other => panic!("unexpected classification {:?}", other),
		}
	}

	#[test]
	fn bools_elsewhere_are_presence() {
		assert!(matches!(classify("checked", &Value::Bool(true)).unwrap(), Attribute::Boolean { name: "checked", present: true }));
	}

	#[test]
	fn numbers_render_without_trailing_zeros() {
		match classify("tabindex", &Value::from(3)).unwrap() {
			Attribute::Plain { value, .. } => assert_eq!(value, "3"),
			other => panic!("unexpected classification {:?}", other),
		}
	}

	#[test]
	fn misplaced_maps_are_rejected() {
		assert!(classify("style", &Value::style([("color", "red")])).is_ok());
		assert!(matches!(classify("css", &Value::style([("color", "red")])), Err(Error::InvalidAttributeValue { .. })));
		assert!(matches!(classify("on", &Value::from("click")), Err(Error::InvalidAttributeValue { .. })));
		assert!(matches!(classify("key", &Value::Bool(true)), Err(Error::InvalidAttributeValue { .. })));
	}

	#[test]
	fn non_finite_numbers_are_rejected() {
		for number in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
			assert!(matches!(
				classify("value", &Value::Number(number)),
				Err(Error::InvalidAttributeValue { found: "a non-finite number", .. })
			));
		}
		assert!(matches!(classify("key", &Value::Number(f64::NAN)), Err(Error::InvalidAttributeValue { .. })));
		assert!(classify("value", &Value::Number(-0.5)).is_ok());
	}

	#[test]
	fn malformed_names_are_rejected() {
		assert!(matches!(classify("", &Value::from("x")), Err(Error::InvalidAttributeName(_))));
		assert!(matches!(classify("a b", &Value::from("x")), Err(Error::InvalidAttributeName(_))));
	}
}
