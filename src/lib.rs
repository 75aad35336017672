// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(clippy::missing_const_for_fn)]

//! Editable trees whose nodes live in a generational [arena].
//!
//! Two node kinds are provided: the ordered, multi-way [`Node`] (collected into a forest by
//! [`Tree`]), and, with the `binary` feature, the two-slot [`BinaryNode`] (held by a
//! [`BinaryTree`]).
//!
//! Nodes are referred to by [tokens]. Removing a node from its [arena] makes every token
//! referring to it stale; the arena's generation check means a stale token can never be
//! mistaken for a newer node that reuses the same slot.
//!
//! # Examples
//! ```
//! use arena_forest::{Arena, NodeToken, Tree};
//!
//! let mut arena = Arena::new();
//! let mut tree = Tree::new();
//!
//! let germanic = tree.add_root(&mut arena, "Germanic");
//! let west = germanic.append(&mut arena, "West Germanic");
//! west.append(&mut arena, "English");
//! west.append(&mut arena, "Dutch");
//!
//! let north = germanic.append(&mut arena, "North Germanic");
//! north.append(&mut arena, "Swedish");
//!
//! assert_eq!(tree.size(&arena), 6);
//! assert_eq!(tree.subtree_size(&arena, west), 2);
//!
//! // Move Swedish under West Germanic, for the sake of the example.
//! let swedish = north.child(&arena, 0).unwrap();
//! west.insert_node(&mut arena, 0, swedish).unwrap();
//!
//! assert_eq!(north.len(&arena), 0);
//! assert_eq!(*west.child(&arena, 0).unwrap().data(&arena), "Swedish");
//! ```
//!
//! [arena]: Arena
//! [tokens]: Token
//! [`BinaryNode`]: binary::BinaryNode
//! [`BinaryTree`]: binary::BinaryTree

pub mod error;
pub mod iter;

mod node;
mod tree;

#[cfg(feature = "binary")]
pub mod binary;

pub use error::{Error, Result};
pub use node::{Node, NodeRepresentation};
pub use tree::Tree;

pub type ArenaIndex = generational_arena::Index;

use std::{
	fmt::{Debug, Formatter},
	hash::{Hash, Hasher},
	iter::FusedIterator,
	marker::PhantomData,
	mem,
	ops::{Index, IndexMut},
	sync::atomic::{self, AtomicU64},
};

use cfg_attrs::cfg_attrs;
use tracing::trace;

/// Identifies a tree among every tree sharing an [`Arena`].
///
/// A root node records the id of the one tree it belongs to, so adding it to another tree moves
/// it out of the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
	pub(crate) fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(0);

		Self(NEXT.fetch_add(1, atomic::Ordering::Relaxed))
	}
}

/// A reference to a node allocated in an [`Arena`].
///
/// Tokens are [`Copy`] and never keep their node alive: once the node is removed, the token is
/// stale and any [arena] lookup with it fails.
///
/// [arena]: Arena
pub struct Token<N> {
	idx: generational_arena::Index,
	_marker: PhantomData<N>,
}

impl<N> Debug for Token<N> {
	#[inline(always)]
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		self.idx.fmt(f)
	}
}

impl<N, I: Idx> PartialEq<I> for Token<N> {
	#[inline(always)]
	fn eq(&self, other: &I) -> bool {
		self.idx() == other.idx()
	}
}

impl<N> Eq for Token<N> {}

impl<N> Hash for Token<N> {
	#[inline(always)]
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.idx().hash(state)
	}
}

impl<N> Clone for Token<N> {
	#[inline(always)]
	fn clone(&self) -> Self {
		*self
	}
}

impl<N> Copy for Token<N> {}

mod sealed {
	use super::Token;

	/// Seals a trait, restricting external crates from implementing it.
	pub trait Sealed {}

	/// Provides a [`NodeToken`]'s [arena index] and seals the trait.
	///
	/// [`NodeToken`]: super::NodeToken
	/// [arena index]: generational_arena::Index
	pub trait Idx {
		/// Returns this [token]'s [arena index].
		///
		/// [token]: super::NodeToken
		/// [arena index]: generational_arena::Index
		fn idx(&self) -> generational_arena::Index;
	}

	/// Raw link editing used by the crate's attach and detach logic.
	///
	/// None of these keep the other side of the link consistent; callers must.
	pub trait Link: Sized {
		fn set_parent(&mut self, parent: Option<Token<Self>>);

		/// The tree this node is a root of, if any.
		fn owner(&self) -> Option<super::TreeId>;
		fn set_owner(&mut self, owner: Option<super::TreeId>);

		/// Removes `child` from this node's children, returning whether it was one.
		fn unlink_child(&mut self, child: Token<Self>) -> bool;
	}
}

pub(crate) use sealed::*;

impl<N> Token<N> {
	/// Creates a new token wrapping the given [arena index].
	///
	/// [arena index]: generational_arena::Index
	#[inline(always)]
	pub(crate) const fn new(idx: generational_arena::Index) -> Self {
		Self {
			idx,
			_marker: PhantomData,
		}
	}
}

impl<N> Idx for Token<N> {
	#[inline(always)]
	fn idx(&self) -> generational_arena::Index {
		self.idx
	}
}

#[cfg_attrs]
/// A node in an arena-backed tree.
///
/// This trait covers what every node kind shares: its [data], its [parent], and iteration over
/// its [children]. Structural edits that depend on how children are stored live on the
/// concrete node types' tokens.
///
/// # See also
/// The ordered, multi-way node is [`Node`].
#[configure(
	feature = "binary",
	/// The two-slot node is [`BinaryNode`].
	///
	/// [`BinaryNode`]: crate::binary::BinaryNode
	///
)]
/// [data]: Self::data
/// [parent]: Self::parent
/// [children]: Self::children
pub trait TreeNode: Debug + Sealed + Link {
	/// The custom data associated with this node.
	type Data;
	/// The owned form of this node and its descendants once removed from the [arena].
	///
	/// [arena]: Arena
	type Representation;

	/// The iterator returned by [`children`].
	///
	/// [`children`]: Self::children
	type ChildrenIter<'node>: DoubleEndedIterator<Item = Token<Self>> + FusedIterator
	where
		Self: 'node;

	/// Creates a new parentless node allocated in the given `arena` using the given `data`.
	///
	/// The node's [token] is returned.
	///
	/// [token]: Token
	fn new(arena: &mut Arena<Self>, data: Self::Data) -> Token<Self>;

	/// Returns this node's [token].
	///
	/// [token]: Token
	fn token(&self) -> Token<Self>;

	/// Returns the [token] of this node's parent.
	///
	/// If this node is a root node, that means it has no parent and thus [`None`] is returned.
	///
	/// [token]: Token
	fn parent(&self) -> Option<Token<Self>>;

	/// Returns an iterator over the [tokens] of this node's ancestors.
	///
	/// This iterator begins with the node's [parent] and ends with the [root] node (i.e. the
	/// ancestor with no [parent]).
	///
	/// [tokens]: Token
	/// [parent]: Self::parent
	/// [root]: Self::root
	#[inline(always)]
	fn ancestors<'node>(&'node self, arena: &'node Arena<Self>) -> iter::Ancestors<'node, Self> {
		iter::Ancestors::new(arena, self.parent())
	}

	/// Returns the [token] of this node's root node.
	///
	/// The root node is the most distant [ancestor]. If this node has no [parent], its own token
	/// is returned.
	///
	/// [token]: Token
	/// [ancestor]: Self::ancestors
	/// [parent]: Self::parent
	#[inline]
	fn root(&self, arena: &Arena<Self>) -> Token<Self> {
		self.ancestors(arena).last().unwrap_or_else(|| self.token())
	}

	/// Returns a reference to the [data] associated with this node.
	///
	/// [data]: Self::Data
	fn data(&self) -> &Self::Data;

	/// Returns a mutable reference to the [data] associated with this node.
	///
	/// [data]: Self::Data
	fn data_mut(&mut self) -> &mut Self::Data;

	/// Returns an iterator over the [tokens] of this node's children, in order.
	///
	/// [tokens]: Token
	fn children(&self) -> Self::ChildrenIter<'_>;

	/// Returns the number of children this node has.
	fn len(&self) -> usize;

	/// Returns whether this node has no children.
	#[inline]
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns an iterator over the [tokens] of this node's descendants.
	///
	/// This iterator is a breadth-first traversal of the node's descendants: its [children] are
	/// done first, then those [children]'s [children] in the same order, and so on and so on.
	///
	/// [tokens]: Token
	/// [children]: Self::children
	#[inline(always)]
	fn descendants<'node>(&'node self, arena: &'node Arena<Self>) -> iter::Descendants<'node, Self> {
		iter::Descendants::new(self, arena)
	}

	/// Converts this node into its [representation].
	///
	/// This node's descendants are removed from the `arena` and included in the
	/// [representation].
	///
	/// [representation]: Self::Representation
	fn into_representation(self, arena: &mut Arena<Self>) -> Self::Representation;
}

/// Operations available through any node's [token].
///
/// Each method looks its node up in the given [arena].
///
/// # Panics
/// Every method panics if this token is stale, i.e. its node has been removed from the
/// [arena].
///
/// [token]: Token
/// [arena]: Arena
pub trait NodeToken<N: TreeNode>: Idx + Copy + PartialEq + Debug {
	/// Returns this [node]'s parent's token.
	///
	/// If this token refers to a root node, that node will have no parent, so [`None`] is returned.
	///
	/// [node]: TreeNode
	#[inline(always)]
	fn parent(&self, arena: &Arena<N>) -> Option<Token<N>> {
		arena.0[self.idx()].parent()
	}

	/// Returns whether this [node] has no parent.
	///
	/// [node]: TreeNode
	#[inline(always)]
	fn is_root(&self, arena: &Arena<N>) -> bool {
		self.parent(arena).is_none()
	}

	/// Returns an iterator over the tokens of this [node]'s ancestors.
	///
	/// [node]: TreeNode
	#[inline(always)]
	fn ancestors<'arena>(&self, arena: &'arena Arena<N>) -> iter::Ancestors<'arena, N> {
		arena.0[self.idx()].ancestors(arena)
	}

	/// Returns this [node]'s root node.
	///
	/// Internally, this method iterates over the [node]'s [ancestors] to find the last one, so it
	/// is `O(n)` best, average, and worst case.
	///
	/// [node]: TreeNode
	/// [ancestors]: Self::ancestors
	#[inline]
	fn root(&self, arena: &Arena<N>) -> Token<N> {
		arena.0[self.idx()].root(arena)
	}

	/// Returns a reference to the [data] associated with this [node].
	///
	/// [node]: TreeNode
	/// [data]: TreeNode::Data
	#[inline]
	fn data<'arena>(&self, arena: &'arena Arena<N>) -> &'arena N::Data {
		arena.0[self.idx()].data()
	}

	/// Returns a mutable reference to the [data] associated with this [node].
	///
	/// [node]: TreeNode
	/// [data]: TreeNode::Data
	#[inline]
	fn data_mut<'arena>(&self, arena: &'arena mut Arena<N>) -> &'arena mut N::Data {
		arena.0[self.idx()].data_mut()
	}

	/// Returns an iterator over the tokens of this [node]'s children.
	///
	/// [node]: TreeNode
	#[inline]
	fn children<'arena>(&self, arena: &'arena Arena<N>) -> N::ChildrenIter<'arena> {
		arena.0[self.idx()].children()
	}

	/// Returns the number of children this [node] has.
	///
	/// [node]: TreeNode
	#[inline]
	fn len(&self, arena: &Arena<N>) -> usize {
		arena.0[self.idx()].len()
	}

	/// Returns whether this [node] has no children.
	///
	/// [node]: TreeNode
	#[inline]
	fn is_empty(&self, arena: &Arena<N>) -> bool {
		arena.0[self.idx()].is_empty()
	}

	/// Returns an iterator over the tokens of this [node]'s descendants, breadth-first.
	///
	/// [node]: TreeNode
	#[inline]
	fn descendants<'arena>(&self, arena: &'arena Arena<N>) -> iter::Descendants<'arena, N> {
		arena.0[self.idx()].descendants(arena)
	}

	/// Returns the number of this [node]'s descendants.
	///
	/// The [node] itself is not counted: a node without children has a subtree size of `0`.
	///
	/// [node]: TreeNode
	#[inline]
	fn subtree_size(&self, arena: &Arena<N>) -> usize {
		self.descendants(arena).count()
	}

	/// Detaches this [node] from its [parent], returning its token.
	///
	/// The [node] keeps its descendants and remains in the [arena] as a root node, ready to be
	/// attached somewhere else. If it has no [parent], nothing happens.
	///
	/// [node]: TreeNode
	/// [parent]: Self::parent
	/// [arena]: Arena
	#[inline]
	fn detach(&self, arena: &mut Arena<N>) -> Token<N> {
		detach(arena, self.token())
	}

	/// Detaches this [node] from its [parent] and removes it, along with all of its descendants,
	/// from the [arena].
	///
	/// Every token into the removed subtree becomes stale. The number of removed nodes, including
	/// this one, is returned.
	///
	/// [node]: TreeNode
	/// [parent]: Self::parent
	/// [arena]: Arena
	#[inline]
	fn recursive_drop(&self, arena: &mut Arena<N>) -> usize {
		let token = detach(arena, self.token());

		remove_subtree(arena, token)
	}

	/// Swaps the [data] of this [node] with that of `other`.
	///
	/// Neither [node]'s parent nor children are touched.
	///
	/// [node]: TreeNode
	/// [data]: TreeNode::Data
	#[inline]
	fn swap_data(&self, arena: &mut Arena<N>, other: Token<N>) {
		arena.swap_data(self.token(), other);
	}

	/// Returns this token as a plain [`Token`].
	fn token(&self) -> Token<N>;
}

impl<N: TreeNode> NodeToken<N> for Token<N> {
	#[inline(always)]
	fn token(&self) -> Token<N> {
		*self
	}
}

/// An arena in which nodes are allocated.
///
/// Nodes are accessed by using the index operator with their [token]; the non-panicking
/// alternatives are [`get`] and [`get_mut`].
///
/// [token]: Token
/// [`get`]: Self::get
/// [`get_mut`]: Self::get_mut
#[derive(Debug)]
pub struct Arena<Node>(pub(crate) generational_arena::Arena<Node>);

impl<Node> Default for Arena<Node> {
	fn default() -> Self {
		Self::new()
	}
}

impl<Node> Arena<Node> {
	/// Creates a new, empty arena.
	pub fn new() -> Self {
		Self(generational_arena::Arena::new())
	}

	/// Creates a new, empty arena with the given initial `capacity`.
	///
	/// A number of nodes equal to the `capacity` may be allocated in the arena without allocating
	/// further memory for the arena itself.
	pub fn with_capacity(capacity: usize) -> Self {
		Self(generational_arena::Arena::with_capacity(capacity))
	}

	/// Returns the number of nodes currently allocated in the arena, across every tree.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns whether the arena holds no nodes at all.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns whether the given `token` still refers to a node in this arena.
	pub fn contains(&self, token: Token<Node>) -> bool {
		self.0.contains(token.idx())
	}

	/// Returns the node referred to by `token`, or [`None`] if the token is stale.
	pub fn get(&self, token: Token<Node>) -> Option<&Node> {
		self.0.get(token.idx())
	}

	/// Returns the node referred to by `token` mutably, or [`None`] if the token is stale.
	pub fn get_mut(&mut self, token: Token<Node>) -> Option<&mut Node> {
		self.0.get_mut(token.idx())
	}
}

impl<N: TreeNode> Arena<N> {
	/// Swaps the [data] of the nodes referred to by `a` and `b`.
	///
	/// Only the [data] moves: both nodes keep their parents and children. Swapping a node with
	/// itself does nothing.
	///
	/// # Panics
	/// This method will panic if either token is stale.
	///
	/// [data]: TreeNode::Data
	pub fn swap_data(&mut self, a: Token<N>, b: Token<N>) {
		if a == b {
			return;
		}

		match self.0.get2_mut(a.idx(), b.idx()) {
			(Some(a), Some(b)) => mem::swap(a.data_mut(), b.data_mut()),

			_ => panic!("tried to swap the data of a node that is no longer in the `arena`"),
		}
	}
}

impl<Node> Index<Token<Node>> for Arena<Node> {
	type Output = Node;

	#[inline(always)]
	fn index(&self, token: Token<Node>) -> &Self::Output {
		&self.0[token.idx()]
	}
}

impl<Node> IndexMut<Token<Node>> for Arena<Node> {
	#[inline(always)]
	fn index_mut(&mut self, token: Token<Node>) -> &mut Self::Output {
		&mut self.0[token.idx()]
	}
}

/// Detaches `token`'s node from its parent, if it has one.
pub(crate) fn detach<N: TreeNode>(arena: &mut Arena<N>, token: Token<N>) -> Token<N> {
	if let Some(parent) = arena[token].parent() {
		if let Some(parent) = arena.get_mut(parent) {
			parent.unlink_child(token);
		}
		arena[token].set_parent(None);

		trace!(?token, ?parent, "detached node");
	}

	token
}

/// Removes `token`'s node and all of its descendants from the `arena`.
///
/// The parent's link to `token` is left alone. Returns the number of nodes removed.
pub(crate) fn remove_subtree<N: TreeNode>(arena: &mut Arena<N>, token: Token<N>) -> usize {
	let mut stack = vec![token];
	let mut removed = 0;

	// Nodes already removed are skipped, so this terminates even for unchecked cycles.
	while let Some(token) = stack.pop() {
		if let Some(node) = arena.0.remove(token.idx()) {
			stack.extend(node.children());
			removed += 1;
		}
	}

	trace!(?token, removed, "removed subtree");

	removed
}

/// Checks that `new` may be attached beneath `parent` through the safe API.
///
/// `new` must still be in the `arena`, and must be neither `parent` itself nor one of its
/// ancestors.
pub(crate) fn check_attachable<N: TreeNode>(arena: &Arena<N>, parent: Token<N>, new: Token<N>) -> Result<()> {
	if !arena.contains(new) {
		return Err(Error::NullNode);
	}

	if parent == new || parent.ancestors(arena).any(|ancestor| ancestor == new) {
		return Err(Error::WouldCycle);
	}

	Ok(())
}

/// Returns whether `token` refers to a live, parentless node that is a root of `owner`.
pub(crate) fn is_owned_root<N: TreeNode>(arena: &Arena<N>, token: Token<N>, owner: TreeId) -> bool {
	arena
		.get(token)
		.is_some_and(|node| node.parent().is_none() && node.owner() == Some(owner))
}

/// Detaches the live `token`'s node and makes it a root of `owner`, taking it from any other tree.
pub(crate) fn adopt_root<N: TreeNode>(arena: &mut Arena<N>, token: Token<N>, owner: TreeId) -> Token<N> {
	detach(arena, token);
	arena[token].set_owner(Some(owner));

	token
}
