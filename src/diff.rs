use crate::{
	attributes,
	materialize::{self, LiveNode},
	Dom, Error, VElement, VNode,
};
use core::mem;
use tracing::{level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// Host work done by one [`Mount`](`crate::Mount`) cycle.
///
/// A patch that found nothing to change is all zeros.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchStats {
	/// Host nodes created, including those inside replacement and appended subtrees.
	pub created: usize,
	/// Nodes replaced wholesale because their kind, tag or key changed.
	pub replaced: usize,
	/// Trailing children appended to a reused parent.
	pub appended: usize,
	/// Trailing children removed from a reused parent.
	pub removed: usize,
	pub text_updates: usize,
	/// Attribute, boolean and style property writes and removals.
	pub attribute_writes: usize,
	pub listeners_bound: usize,
	pub listeners_unbound: usize,
}

impl PatchStats {
	#[must_use]
	pub fn is_noop(&self) -> bool {
		*self == Self::default()
	}
}

/// Positional diff/patch over one host.
///
/// Everything passed in must have been validated already.
pub(crate) struct Reconciler<'a, D: Dom> {
	dom: &'a mut D,
	pub(crate) stats: PatchStats,
}

impl<'a, D: Dom> Reconciler<'a, D> {
	pub(crate) fn new(dom: &'a mut D) -> Self {
		Self {
			dom,
			stats: PatchStats::default(),
		}
	}

	pub(crate) fn create(&mut self, vnode: &VNode) -> Result<LiveNode<D>, Error> {
		materialize::build(self.dom, vnode, &mut self.stats)
	}

	pub(crate) fn append(&mut self, parent: &D::Node, child: &LiveNode<D>) -> Result<(), Error> {
		self.dom.append_child(parent, &child.node)?;
		Ok(())
	}

	pub(crate) fn clear(&mut self, parent: &D::Node) -> Result<(), Error> {
		self.dom.clear_children(parent)?;
		Ok(())
	}

	pub(crate) fn unbind(&mut self, live: LiveNode<D>) -> D::Node {
		materialize::unbind(self.dom, live, &mut self.stats)
	}

	/// Unbinds `live` and detaches it from `parent`.
	pub(crate) fn remove(&mut self, parent: &D::Node, live: LiveNode<D>) -> Result<(), Error> {
		let node = self.unbind(live);
		self.dom.remove_child(parent, &node)?;
		Ok(())
	}

	/// Makes the host node bound by `live`, currently reflecting `old`, reflect `new` instead.
	///
	/// `parent` is the host parent of `live`, needed in case the node has to be replaced.
	pub(crate) fn patch_node(&mut self, parent: &D::Node, live: &mut LiveNode<D>, old: &VNode, new: &VNode) -> Result<(), Error> {
		match (old, new) {
			(VNode::Text(t_1), VNode::Text(t_2)) => {
				let span = trace_span!("Diffing text node", old_len = t_1.len(), new_len = t_2.len());
				let _enter = span.enter();
				if t_1 != t_2 {
					if cfg!(feature = "dangerous-logging") {
						trace!(t_1 = t_1.as_str(), t_2 = t_2.as_str(), "Updating text");
					}
					self.dom.set_text(&live.node, t_2)?;
					self.stats.text_updates += 1;
				}
				Ok(())
			}

			(VNode::Element(e_1), VNode::Element(e_2)) if e_1.same_instance(e_2) => {
				let span = trace_span!("Diffing element", tag = e_1.tag());
				let _enter = span.enter();
				self.update_element(live, e_1, e_2)
			}

			// Mismatching nodes: Replace wholesale.
			(n_1, n_2) => {
				let span = trace_span!("Replacing mismatching", old = n_1.tag(), new = n_2.tag());
				let _enter = span.enter();

				if STATIC_MAX_LEVEL >= Level::WARN {
					if let (VNode::Element(e_1), VNode::Element(e_2)) = (n_1, n_2) {
						if e_1.tag() != e_2.tag() && e_1.tag().eq_ignore_ascii_case(e_2.tag()) {
							warn!(
								"Recreating element due to different tag name casing: {:?} -> {:?}",
								e_1.tag(),
								e_2.tag()
							)
						}
					}
				}

				let replacement = self.create(n_2)?;
				if let Err(error) = self.dom.replace_child(parent, &replacement.node, &live.node) {
					self.unbind(replacement);
					return Err(error.into());
				}
				let replaced = mem::replace(live, replacement);
				self.unbind(replaced);
				self.stats.replaced += 1;
				Ok(())
			}
		}
	}

	fn update_element(&mut self, live: &mut LiveNode<D>, e_1: &VElement, e_2: &VElement) -> Result<(), Error> {
		// All attribute writes finish before any child is touched.
		for (name, v_1) in e_1.attributes() {
			if !e_2.attributes().contains_key(name) {
				let removed = attributes::classify(name, v_1)?;
				attributes::remove(self.dom, live, &removed, &mut self.stats);
			}
		}
		for (name, v_2) in e_2.attributes() {
			match e_1.attribute(name) {
				Some(v_1) if v_1.same_as(v_2) => (),
				Some(v_1) => {
					let (old, new) = (attributes::classify(name, v_1)?, attributes::classify(name, v_2)?);
					attributes::patch(self.dom, live, &old, &new, &mut self.stats);
				}
				None => {
					let added = attributes::classify(name, v_2)?;
					attributes::apply(self.dom, live, &added, &mut self.stats);
				}
			}
		}

		self.patch_children(&live.node, &mut live.children, e_1.children(), e_2.children())
	}

	/// Pairs `old` and `new` strictly by index.
	fn patch_children(&mut self, parent: &D::Node, live: &mut Vec<LiveNode<D>>, old: &[VNode], new: &[VNode]) -> Result<(), Error> {
		debug_assert_eq!(live.len(), old.len(), "Live binding out of sync with the previous tree");

		let common = old.len().min(new.len());
		for ((child, n_1), n_2) in live.iter_mut().zip(old).zip(new) {
			self.patch_node(parent, child, n_1, n_2)?;
		}

		if old.len() > common {
			let span = trace_span!("Removing trailing children", count = old.len() - common);
			let _enter = span.enter();
			while live.len() > common {
				if let Some(removed) = live.pop() {
					self.remove(parent, removed)?;
					self.stats.removed += 1;
				}
			}
		}

		if new.len() > common {
			let span = trace_span!("Appending trailing children", count = new.len() - common);
			let _enter = span.enter();
			for n_2 in &new[common..] {
				let added = self.create(n_2)?;
				if let Err(error) = self.append(parent, &added) {
					self.unbind(added);
					return Err(error);
				}
				self.stats.appended += 1;
				live.push(added);
			}
		}

		Ok(())
	}
}
