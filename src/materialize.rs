use crate::{
	attributes,
	diff::PatchStats,
	mount::Options,
	Dom, Error, VNode,
};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use tracing::{error, instrument, trace, trace_span};

/// The live binding of one materialized host node.
///
/// Owns the node handle, the listeners bound on it (one per event name) and the bindings of its children,
/// in DOM order. Dropping a [`LiveNode`] without [`unbinding`](`LiveNode::unbind`) it leaves its listeners attached,
/// which for [`WebDom`](`crate::web::WebDom`) means they throw into JavaScript when they fire.
pub struct LiveNode<D: Dom> {
	pub(crate) node: D::Node,
	pub(crate) listeners: HashMap<String, D::Listener>,
	pub(crate) children: Vec<LiveNode<D>>,
}

impl<D: Dom> LiveNode<D> {
	fn new(node: D::Node) -> Self {
		Self {
			node,
			listeners: HashMap::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn node(&self) -> &D::Node {
		&self.node
	}

	#[must_use]
	pub fn children(&self) -> &[LiveNode<D>] {
		&self.children
	}

	/// Listeners bound on this node only.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Listeners bound anywhere in this subtree.
	#[must_use]
	pub fn total_listener_count(&self) -> usize {
		self.listeners.len() + self.children.iter().map(LiveNode::total_listener_count).sum::<usize>()
	}

	/// Removes all listeners in this subtree and hands back the bare node.
	pub fn unbind(self, dom: &mut D) -> D::Node {
		unbind(dom, self, &mut PatchStats::default())
	}
}

impl<D: Dom> Debug for LiveNode<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LiveNode")
			.field("node", &self.node)
			.field("listeners", &self.listeners.keys().collect::<Vec<_>>())
			.field("children", &self.children)
			.finish()
	}
}

/// Creates a detached host subtree for `vnode`.
///
/// The result isn't inserted anywhere. Its listeners stay bound for as long as the returned [`LiveNode`] is kept.
/// If creation fails partway, everything bound so far is unbound again.
///
/// # Errors
///
/// Invalid input (see [`VNode::validate`]), in which case nothing is created, or a failing host.
#[instrument(skip_all, fields(tag = vnode.tag()))]
pub fn materialize<D: Dom>(dom: &mut D, vnode: &VNode) -> Result<LiveNode<D>, Error> {
	vnode.validate(Options::default().depth_limit)?;
	build(dom, vnode, &mut PatchStats::default())
}

/// [`materialize`] without validation. The caller must have validated `vnode`.
pub(crate) fn build<D: Dom>(dom: &mut D, vnode: &VNode, stats: &mut PatchStats) -> Result<LiveNode<D>, Error> {
	match vnode {
		VNode::Text(text) => {
			let span = trace_span!("Creating text node", len = text.len());
			let _enter = span.enter();
			if cfg!(feature = "dangerous-logging") {
				trace!(text = text.as_str());
			}
			stats.created += 1;
			Ok(LiveNode::new(dom.create_text_node(text)))
		}

		VNode::Element(element) => {
			let span = trace_span!("Creating element", tag = element.tag(), children = element.children().len());
			let _enter = span.enter();

			let mut live = LiveNode::new(dom.create_element(element.tag())?);
			stats.created += 1;

			for (name, value) in element.attributes() {
				let attribute = attributes::classify(name, value)?;
				attributes::apply(dom, &mut live, &attribute, stats);
			}

			live.children.reserve_exact(element.children().len());
			for child in element.children() {
				let child = match build(dom, child, stats) {
					Ok(child) => child,
					Err(error) => {
						unbind(dom, live, stats);
						return Err(error);
					}
				};
				if let Err(error) = dom.append_child(&live.node, &child.node) {
					unbind(dom, child, stats);
					unbind(dom, live, stats);
					return Err(error.into());
				}
				live.children.push(child);
			}
			Ok(live)
		}
	}
}

/// Removes the listeners of a to-be-discarded subtree without detaching anything.
pub(crate) fn unbind<D: Dom>(dom: &mut D, live: LiveNode<D>, stats: &mut PatchStats) -> D::Node {
	let LiveNode { node, listeners, children } = live;
	for (event, listener) in listeners {
		stats.listeners_unbound += 1;
		if let Err(error) = dom.remove_event_listener(&node, &event, listener) {
			error!("Failed to remove event listener {:?} while unbinding: {}", event, error)
		}
	}
	for child in children {
		unbind(dom, child, stats);
	}
	node
}
