// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt::Debug;

use tracing::{instrument, trace};

use crate::{
	adopt_root,
	is_owned_root,
	remove_subtree,
	sealed::Link,
	Arena,
	Error,
	Node,
	NodeToken,
	Result,
	Token,
	TreeId,
	TreeNode,
};

/// A forest of [`Node`] trees.
///
/// A tree holds any number of root nodes, in order. Each root is marked with the tree's [id], and
/// only nodes that are still in the [arena], still have no parent and still carry that mark count
/// as roots: attaching a root beneath another node, adding it to another tree, or removing it
/// from the [arena] takes it out of the forest.
///
/// The nodes themselves live in an [arena] that may be shared by several trees, but a root
/// belongs to at most one of them.
///
/// [id]: Self::id
/// [arena]: Arena
#[derive(Debug)]
pub struct Tree<T: Debug> {
	id: TreeId,
	roots: Vec<Token<Node<T>>>,
}

impl<T: Debug> Default for Tree<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Debug> Tree<T> {
	/// Creates a new, empty tree.
	pub fn new() -> Self {
		Self {
			id: TreeId::next(),
			roots: Vec::new(),
		}
	}

	/// Creates a new tree with a single root node holding `data`.
	pub fn with_root(arena: &mut Arena<Node<T>>, data: T) -> Self {
		let mut tree = Self::new();
		tree.add_root(arena, data);

		tree
	}

	/// Creates a new tree whose single root is the existing `node`.
	///
	/// The `node` is detached from its parent, if it has one, and brings its descendants with it.
	/// If it is a root of another tree, it is taken from that tree.
	///
	/// # Errors
	/// [`Error::NullNode`] if `node` is no longer in the `arena`.
	pub fn from_node(arena: &mut Arena<Node<T>>, node: Token<Node<T>>) -> Result<Self> {
		let mut tree = Self::new();
		tree.add_root_node(arena, node)?;

		Ok(tree)
	}

	/// Returns the id this tree marks its roots with.
	#[inline]
	pub const fn id(&self) -> TreeId {
		self.id
	}

	/// Returns an iterator over the tokens of this tree's root nodes, in order.
	pub fn roots<'tree>(&'tree self, arena: &'tree Arena<Node<T>>) -> impl Iterator<Item = Token<Node<T>>> + 'tree {
		self.roots
			.iter()
			.copied()
			.filter(|root| is_owned_root(arena, *root, self.id))
	}

	/// Creates a new root node holding `data` after the existing roots, returning its token.
	pub fn add_root(&mut self, arena: &mut Arena<Node<T>>, data: T) -> Token<Node<T>> {
		self.insert_root(arena, usize::MAX, data)
	}

	/// Creates a new root node holding `data` at the given `index` among the roots, returning its
	/// token.
	///
	/// If `index` is greater than the number of roots, the new root is added after the existing
	/// roots.
	pub fn insert_root(&mut self, arena: &mut Arena<Node<T>>, index: usize, data: T) -> Token<Node<T>> {
		let root = Node::new(arena, data);
		arena[root].set_owner(Some(self.id));
		self.link_root(arena, index, root);

		root
	}

	/// Adds the existing `node` after the existing roots, returning its token.
	///
	/// See [`insert_root_node`] for details.
	///
	/// # Errors
	/// [`Error::NullNode`] if `node` is no longer in the `arena`.
	///
	/// [`insert_root_node`]: Self::insert_root_node
	pub fn add_root_node(&mut self, arena: &mut Arena<Node<T>>, node: Token<Node<T>>) -> Result<Token<Node<T>>> {
		self.insert_root_node(arena, usize::MAX, node)
	}

	/// Adds the existing `node` at the given `index` among the roots, returning its token.
	///
	/// The `node` is detached from its parent first, bringing its descendants with it. If it is
	/// already one of this tree's roots, it is moved to `index`; if it is a root of another tree,
	/// it is taken from that tree. As for [`insert_root`], an
	/// `index` greater than the number of roots adds the node after the existing roots.
	///
	/// # Errors
	/// [`Error::NullNode`] if `node` is no longer in the `arena`.
	///
	/// [`insert_root`]: Self::insert_root
	pub fn insert_root_node(
		&mut self,
		arena: &mut Arena<Node<T>>,
		index: usize,
		node: Token<Node<T>>,
	) -> Result<Token<Node<T>>> {
		if !arena.contains(node) {
			return Err(Error::NullNode);
		}

		adopt_root(arena, node, self.id);
		self.roots.retain(|root| *root != node);
		self.link_root(arena, index, node);

		Ok(node)
	}

	fn link_root(&mut self, arena: &Arena<Node<T>>, index: usize, root: Token<Node<T>>) {
		// Forget roots that have been removed or attached elsewhere, so `index` counts live roots.
		let id = self.id;
		self.roots.retain(|root| is_owned_root(arena, *root, id));

		let index = index.min(self.roots.len());
		self.roots.insert(index, root);

		trace!(?root, index, "added root");
	}

	/// Removes every root node, along with all of their descendants, from the `arena`.
	///
	/// Returns the number of nodes removed.
	#[instrument(level = "trace", skip(self, arena))]
	pub fn clear(&mut self, arena: &mut Arena<Node<T>>) -> usize {
		let id = self.id;
		let roots: Vec<_> = self
			.roots
			.drain(..)
			.filter(|root| is_owned_root(arena, *root, id))
			.collect();

		roots.into_iter().map(|root| remove_subtree(arena, root)).sum()
	}

	/// Returns the total number of nodes in this tree.
	///
	/// Every root is counted along with its descendants. An empty tree has a size of `0`.
	#[instrument(level = "trace", skip(self, arena))]
	pub fn size(&self, arena: &Arena<Node<T>>) -> usize {
		self.roots(arena).map(|root| 1 + root.subtree_size(arena)).sum()
	}

	/// Returns the number of descendants of `node`, not counting `node` itself.
	///
	/// Unlike [`size`], which counts the roots, this counts only what lies beneath `node`: a node
	/// with no children has a subtree size of `0`.
	///
	/// # Panics
	/// This method will panic if `node` is no longer in the `arena`.
	///
	/// [`size`]: Self::size
	pub fn subtree_size(&self, arena: &Arena<Node<T>>, node: Token<Node<T>>) -> usize {
		node.subtree_size(arena)
	}
}
