use crate::{
	diff::{PatchStats, Reconciler},
	materialize::LiveNode,
	Dom, Error, VNode,
};
use core::fmt::{self, Debug, Formatter};
use tracing::{error, info, instrument, trace};

/// Per-[`Mount`] configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	/// Trees nesting deeper than this are rejected before any DOM work, which also bounds recursion.
	pub depth_limit: usize,
}

impl Options {
	pub const DEFAULT_DEPTH_LIMIT: usize = 512;

	#[must_use]
	pub fn depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}
}

impl Default for Options {
	fn default() -> Self {
		Self {
			depth_limit: Self::DEFAULT_DEPTH_LIMIT,
		}
	}
}

/// A mount point: one container element and the tree last rendered into it.
///
/// The rendered tree's root is the container's first child. [`Mount::update`] diffs against the stored tree
/// and replaces it afterwards, so the application never touches the diff baseline itself.
///
/// # Correct Use
///
/// The [`Mount`] must be the only writer to the container's children for as long as it's rendered into.
/// Rendering into the same container through two mounts, or editing the rendered subtree directly,
/// desynchronizes the live binding from the DOM.
pub struct Mount<D: Dom> {
	container: D::Node,
	options: Options,
	rendered: Option<Rendered<D>>,
	last_patch: PatchStats,
}

struct Rendered<D: Dom> {
	tree: VNode,
	root: LiveNode<D>,
}

/// Renders `tree` into `container` and returns the [`Mount`] to [update](`Mount::update`) it through.
///
/// # Errors
///
/// See [`Mount::render`].
pub fn render<D: Dom>(dom: &mut D, tree: VNode, container: D::Node) -> Result<Mount<D>, Error> {
	let mut mount = Mount::new(container);
	mount.render(dom, tree)?;
	Ok(mount)
}

impl<D: Dom> Mount<D> {
	/// Creates an empty mount. Nothing is written to `container` until the first render or update.
	#[must_use]
	pub fn new(container: D::Node) -> Self {
		Self::with_options(container, Options::default())
	}

	#[must_use]
	pub fn with_options(container: D::Node, options: Options) -> Self {
		Self {
			container,
			options,
			rendered: None,
			last_patch: PatchStats::default(),
		}
	}

	/// Clears the container and renders `tree` into it from scratch.
	///
	/// # Errors
	///
	/// Invalid input, in which case the container and the previous tree are left untouched, or a failing host.
	#[instrument(skip_all, fields(container = ?self.container, tag = tree.tag()))]
	pub fn render(&mut self, dom: &mut D, tree: VNode) -> Result<(), Error> {
		tree.validate(self.options.depth_limit)?;
		self.render_validated(dom, tree)
	}

	fn render_validated(&mut self, dom: &mut D, tree: VNode) -> Result<(), Error> {
		let mut reconciler = Reconciler::new(dom);
		let root = reconciler.create(&tree)?;

		if let Some(previous) = self.rendered.take() {
			trace!("Unbinding previously rendered tree.");
			reconciler.unbind(previous.root);
		}
		let inserted = reconciler.clear(&self.container).and_then(|()| reconciler.append(&self.container, &root));
		if let Err(error) = inserted {
			error!("Render failed: {}", error);
			reconciler.unbind(root);
			self.last_patch = reconciler.stats;
			return Err(error);
		}
		reconciler.stats.appended += 1;

		self.finish(reconciler.stats, tree, root);
		Ok(())
	}

	/// Patches the rendered DOM to reflect `next`, reusing host nodes wherever the positional diff allows.
	///
	/// Behaves exactly like [`Mount::render`] if nothing is rendered yet.
	///
	/// # Errors
	///
	/// Invalid input, in which case nothing is changed.
	///
	/// On a host failure the DOM may be partially patched. The previous tree is unbound and dropped in that case,
	/// so the next update renders from scratch.
	#[instrument(skip_all, fields(container = ?self.container, tag = next.tag()))]
	pub fn update(&mut self, dom: &mut D, next: VNode) -> Result<(), Error> {
		next.validate(self.options.depth_limit)?;

		let Some(Rendered { tree: previous, mut root }) = self.rendered.take() else {
			trace!("Nothing rendered yet. Rendering instead.");
			return self.render_validated(dom, next);
		};

		let mut reconciler = Reconciler::new(dom);
		match reconciler.patch_node(&self.container, &mut root, &previous, &next) {
			Ok(()) => {
				self.finish(reconciler.stats, next, root);
				Ok(())
			}
			Err(error) => {
				error!("Patch failed, discarding the previous tree: {}", error);
				reconciler.unbind(root);
				self.last_patch = reconciler.stats;
				Err(error)
			}
		}
	}

	/// Unbinds and removes the rendered tree, returning it.
	///
	/// # Errors
	///
	/// A failing host. The tree is forgotten either way.
	#[instrument(skip_all, fields(container = ?self.container))]
	pub fn unmount(&mut self, dom: &mut D) -> Result<Option<VNode>, Error> {
		let Some(Rendered { tree, root }) = self.rendered.take() else {
			return Ok(None);
		};
		let mut reconciler = Reconciler::new(dom);
		let result = reconciler.remove(&self.container, root);
		reconciler.stats.removed += 1;
		self.last_patch = reconciler.stats;
		result.map(|()| Some(tree))
	}

	fn finish(&mut self, stats: PatchStats, tree: VNode, root: LiveNode<D>) {
		info!(
			"Patched: {} created, {} replaced, {} appended, {} removed, {} text update(s), {} attribute write(s), {}/{} listener(s) bound/unbound",
			stats.created, stats.replaced, stats.appended, stats.removed, stats.text_updates, stats.attribute_writes, stats.listeners_bound, stats.listeners_unbound
		);
		self.last_patch = stats;
		self.rendered = Some(Rendered { tree, root });
	}

	#[must_use]
	pub fn container(&self) -> &D::Node {
		&self.container
	}

	#[must_use]
	pub fn options(&self) -> Options {
		self.options
	}

	/// The tree the next [`Mount::update`] will diff against.
	#[must_use]
	pub fn previous_tree(&self) -> Option<&VNode> {
		self.rendered.as_ref().map(|rendered| &rendered.tree)
	}

	/// The live binding of the container's rendered first child.
	#[must_use]
	pub fn root(&self) -> Option<&LiveNode<D>> {
		self.rendered.as_ref().map(|rendered| &rendered.root)
	}

	/// What the latest render, update or unmount did to the host.
	#[must_use]
	pub fn last_patch(&self) -> PatchStats {
		self.last_patch
	}
}

impl<D: Dom> Debug for Mount<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Mount")
			.field("container", &self.container)
			.field("options", &self.options)
			.field("previous_tree", &self.previous_tree())
			.field("last_patch", &self.last_patch)
			.finish()
	}
}
