// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary trees: nodes with a [first] and a [second] child slot.
//!
//! [first]: BinaryNode::first
//! [second]: BinaryNode::second

use std::{array, cmp::Ordering, fmt::Debug, iter::Flatten, mem};

use tracing::{instrument, trace};

use crate::{
	check_attachable,
	adopt_root,
	detach,
	is_owned_root,
	remove_subtree,
	sealed::{Idx, Link, Sealed},
	Arena,
	Error,
	NodeToken,
	Result,
	Token,
	TreeId,
	TreeNode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
	First,
	Second,
}

/// A node with at most two children, held in named [first] and [second] slots.
///
/// Like [`Node`], binary nodes compare by their [data] alone, against each other or against a
/// reference to a bare value.
///
/// [first]: Self::first
/// [second]: Self::second
/// [data]: TreeNode::data
/// [`Node`]: crate::Node
#[derive(Debug)]
pub struct BinaryNode<T: Debug> {
	token: Token<Self>,

	parent: Option<Token<Self>>,

	first: Option<Token<Self>>,
	second: Option<Token<Self>>,

	owner: Option<TreeId>,

	data: T,
}

/// The [representation] of a [binary node] after it has been removed from the [arena].
///
/// [representation]: TreeNode::Representation
/// [binary node]: BinaryNode
/// [arena]: Arena
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct BinaryNodeRepresentation<T> {
	/// The representation of the [first child], if there was one.
	///
	/// [first child]: BinaryNode::first
	pub first: Option<Box<BinaryNodeRepresentation<T>>>,
	/// The representation of the [second child], if there was one.
	///
	/// [second child]: BinaryNode::second
	pub second: Option<Box<BinaryNodeRepresentation<T>>>,
	/// The [data] associated with the [binary node].
	///
	/// [binary node]: BinaryNode
	/// [data]: TreeNode::Data
	pub data: T,
}

impl<T> BinaryNodeRepresentation<T> {
	/// Returns the number of nodes in this representation, itself included.
	pub fn node_count(&self) -> usize {
		let mut pending = vec![self];
		let mut count = 0;

		while let Some(representation) = pending.pop() {
			pending.extend(
				[&representation.first, &representation.second]
					.into_iter()
					.flatten()
					.map(|child| &**child),
			);
			count += 1;
		}

		count
	}
}

/// A node whose representation is being built, waiting on its remaining children.
struct PartialRepresentation<T: Debug> {
	data: T,

	pending: array::IntoIter<(Slot, Option<Token<BinaryNode<T>>>), 2>,

	first: Option<Box<BinaryNodeRepresentation<T>>>,
	second: Option<Box<BinaryNodeRepresentation<T>>>,
}

impl<T: Debug> PartialRepresentation<T> {
	fn new(node: BinaryNode<T>) -> Self {
		Self {
			pending: [(Slot::First, node.first), (Slot::Second, node.second)].into_iter(),

			first: None,
			second: None,

			data: node.data,
		}
	}

	fn slot_mut(&mut self, slot: Slot) -> &mut Option<Box<BinaryNodeRepresentation<T>>> {
		match slot {
			Slot::First => &mut self.first,
			Slot::Second => &mut self.second,
		}
	}

	fn finish(self) -> BinaryNodeRepresentation<T> {
		BinaryNodeRepresentation {
			first: self.first,
			second: self.second,
			data: self.data,
		}
	}
}

impl<T: Debug> BinaryNode<T> {
	/// Returns the token of this node's first child.
	#[inline(always)]
	pub const fn first(&self) -> Option<Token<Self>> {
		self.first
	}

	/// Returns the token of this node's second child.
	#[inline(always)]
	pub const fn second(&self) -> Option<Token<Self>> {
		self.second
	}

	const fn slot(&self, slot: Slot) -> Option<Token<Self>> {
		match slot {
			Slot::First => self.first,
			Slot::Second => self.second,
		}
	}

	fn slot_mut(&mut self, slot: Slot) -> &mut Option<Token<Self>> {
		match slot {
			Slot::First => &mut self.first,
			Slot::Second => &mut self.second,
		}
	}

	/// The slot [`insert`] would fill next.
	///
	/// [`insert`]: Token::insert
	const fn free_slot(&self) -> Option<Slot> {
		match (self.first, self.second) {
			(None, _) => Some(Slot::First),
			(Some(_), None) => Some(Slot::Second),
			(Some(_), Some(_)) => None,
		}
	}

	fn slot_of(&self, child: Token<Self>) -> Option<Slot> {
		if self.first == Some(child) {
			Some(Slot::First)
		} else if self.second == Some(child) {
			Some(Slot::Second)
		} else {
			None
		}
	}

	/// Puts `new` into the (empty) `slot` of `parent` and points it back at `parent`.
	fn link(arena: &mut Arena<Self>, parent: Token<Self>, slot: Slot, new: Token<Self>) {
		debug_assert!(arena[parent].slot(slot).is_none());

		let node = &mut arena[new];
		node.parent = Some(parent);
		node.owner = None;

		*arena[parent].slot_mut(slot) = Some(new);

		trace!(?parent, ?new, ?slot, "attached child");
	}

	/// Puts `new` into `slot` of `parent`, detaching and returning the previous occupant.
	fn replace(arena: &mut Arena<Self>, parent: Token<Self>, slot: Slot, new: Token<Self>) -> Option<Token<Self>> {
		let displaced = arena[parent].slot_mut(slot).take();

		if let Some(displaced) = displaced {
			arena[displaced].parent = None;

			trace!(?parent, ?displaced, ?slot, "displaced child");
		}

		Self::link(arena, parent, slot, new);

		displaced
	}

	/// Attaches the live `node` to the next free slot of `parent`.
	///
	/// A slot `node` itself occupies counts as free, since detaching it first empties that slot.
	fn attach_free(arena: &mut Arena<Self>, parent: Token<Self>, node: Token<Self>) -> Result<()> {
		let target = &arena[parent];
		if target.free_slot().is_none() && target.slot_of(node).is_none() {
			return Err(Error::CapacityExceeded);
		}

		detach(arena, node);

		let slot = arena[parent]
			.free_slot()
			.expect("a slot was either already free or freed by detaching the node");
		Self::link(arena, parent, slot, node);

		Ok(())
	}

	/// Unlinks the `child` of `parent` and removes it, with its descendants, from the `arena`.
	fn remove_linked(arena: &mut Arena<Self>, parent: Token<Self>, child: Token<Self>) -> BinaryNodeRepresentation<T> {
		arena[parent].unlink_child(child);

		let node = arena
			.0
			.remove(child.idx())
			.expect("tried to remove child but there was no such node in the `arena`");

		trace!(?parent, token = ?child, "removed child");

		node.into_representation(arena)
	}
}

impl<T: Debug> Sealed for BinaryNode<T> {}

impl<T: Debug> Link for BinaryNode<T> {
	#[inline(always)]
	fn set_parent(&mut self, parent: Option<Token<Self>>) {
		self.parent = parent;
	}

	#[inline(always)]
	fn owner(&self) -> Option<TreeId> {
		self.owner
	}

	#[inline(always)]
	fn set_owner(&mut self, owner: Option<TreeId>) {
		self.owner = owner;
	}

	fn unlink_child(&mut self, child: Token<Self>) -> bool {
		match self.slot_of(child) {
			Some(slot) => {
				*self.slot_mut(slot) = None;

				true
			},

			None => false,
		}
	}
}

impl<T: Debug> TreeNode for BinaryNode<T> {
	type Data = T;
	type Representation = BinaryNodeRepresentation<T>;

	type ChildrenIter<'node> = Flatten<array::IntoIter<Option<Token<Self>>, 2>>
	where
		Self: 'node;

	fn new(arena: &mut Arena<Self>, data: T) -> Token<Self> {
		Token::new(arena.0.insert_with(|idx| Self {
			token: Token::new(idx),

			parent: None,

			first: None,
			second: None,

			owner: None,

			data,
		}))
	}

	#[inline(always)]
	fn token(&self) -> Token<Self> {
		self.token
	}

	#[inline(always)]
	fn parent(&self) -> Option<Token<Self>> {
		self.parent
	}

	#[inline(always)]
	fn data(&self) -> &T {
		&self.data
	}

	#[inline(always)]
	fn data_mut(&mut self) -> &mut T {
		&mut self.data
	}

	#[inline(always)]
	fn children(&self) -> Self::ChildrenIter<'_> {
		[self.first, self.second].into_iter().flatten()
	}

	#[inline]
	fn len(&self) -> usize {
		usize::from(self.first.is_some()) + usize::from(self.second.is_some())
	}

	fn into_representation(self, arena: &mut Arena<Self>) -> BinaryNodeRepresentation<T> {
		let mut ancestors = Vec::new();
		let mut current = PartialRepresentation::new(self);

		loop {
			match current.pending.next() {
				Some((slot, Some(child))) => {
					if let Some(child) = arena.0.remove(child.idx()) {
						let parent = mem::replace(&mut current, PartialRepresentation::new(child));
						ancestors.push((parent, slot));
					}
				},

				Some((_, None)) => {},

				None => {
					let representation = current.finish();

					match ancestors.pop() {
						Some((parent, slot)) => {
							current = parent;
							*current.slot_mut(slot) = Some(Box::new(representation));
						},

						None => return representation,
					}
				},
			}
		}
	}
}

impl<T: Debug + PartialEq> PartialEq for BinaryNode<T> {
	#[inline(always)]
	fn eq(&self, other: &Self) -> bool {
		self.data == other.data
	}
}

impl<'value, T: Debug + PartialEq> PartialEq<&'value T> for BinaryNode<T> {
	#[inline(always)]
	fn eq(&self, other: &&'value T) -> bool {
		self.data == **other
	}
}

impl<T: Debug + PartialOrd> PartialOrd for BinaryNode<T> {
	#[inline(always)]
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		self.data.partial_cmp(&other.data)
	}
}

impl<'value, T: Debug + PartialOrd> PartialOrd<&'value T> for BinaryNode<T> {
	#[inline(always)]
	fn partial_cmp(&self, other: &&'value T) -> Option<Ordering> {
		self.data.partial_cmp(*other)
	}
}

/// Structural edits of a [`BinaryNode`], made through its token.
///
/// # Panics
/// Every method panics if this token is stale, i.e. its node has been removed from the [arena].
/// Tokens passed as arguments are checked instead, failing with [`Error::NullNode`].
///
/// [arena]: Arena
impl<T: Debug> Token<BinaryNode<T>> {
	/// Returns the token of this node's first child.
	#[inline]
	pub fn first(&self, arena: &Arena<BinaryNode<T>>) -> Option<Self> {
		arena[*self].first
	}

	/// Returns the token of this node's second child.
	#[inline]
	pub fn second(&self, arena: &Arena<BinaryNode<T>>) -> Option<Self> {
		arena[*self].second
	}

	/// Creates a new node with the given `data` in the first empty slot, returning its token.
	///
	/// The [first] slot is filled if it is empty, otherwise the [second].
	///
	/// # Errors
	/// [`Error::CapacityExceeded`] if both slots are occupied. Nothing is allocated in that case.
	///
	/// [first]: Self::first
	/// [second]: Self::second
	pub fn insert(&self, arena: &mut Arena<BinaryNode<T>>, data: T) -> Result<Self> {
		let slot = arena[*self].free_slot().ok_or(Error::CapacityExceeded)?;

		let new = BinaryNode::new(arena, data);
		BinaryNode::link(arena, *self, slot, new);

		Ok(new)
	}

	/// Moves the existing `node` into the first empty slot, returning its token.
	///
	/// The `node` is detached from any previous parent first, bringing its descendants with it.
	///
	/// # Errors
	/// - [`Error::NullNode`] if `node` is no longer in the `arena`.
	/// - [`Error::WouldCycle`] if `node` is this node or one of its ancestors.
	/// - [`Error::CapacityExceeded`] if both slots are occupied (by nodes other than `node`).
	pub fn insert_node(&self, arena: &mut Arena<BinaryNode<T>>, node: Self) -> Result<Self> {
		check_attachable(arena, *self, node)?;
		BinaryNode::attach_free(arena, *self, node)?;

		Ok(node)
	}

	/// Creates a new node with the given `data` as this node's first child.
	///
	/// The previous first child, if any, is detached (keeping its own descendants) and returned.
	pub fn set_first(&self, arena: &mut Arena<BinaryNode<T>>, data: T) -> Option<Self> {
		self.set_data(arena, Slot::First, data)
	}

	/// Creates a new node with the given `data` as this node's second child.
	///
	/// The previous second child, if any, is detached (keeping its own descendants) and returned.
	pub fn set_second(&self, arena: &mut Arena<BinaryNode<T>>, data: T) -> Option<Self> {
		self.set_data(arena, Slot::Second, data)
	}

	/// Moves the existing `node` into this node's first slot.
	///
	/// The previous first child, if any, is detached and returned. If `node` is already the first
	/// child, nothing happens and [`None`] is returned.
	///
	/// # Errors
	/// - [`Error::NullNode`] if `node` is no longer in the `arena`.
	/// - [`Error::WouldCycle`] if `node` is this node or one of its ancestors.
	pub fn set_first_node(&self, arena: &mut Arena<BinaryNode<T>>, node: Self) -> Result<Option<Self>> {
		self.set_node(arena, Slot::First, node)
	}

	/// Moves the existing `node` into this node's second slot.
	///
	/// The previous second child, if any, is detached and returned. If `node` is already the second
	/// child, nothing happens and [`None`] is returned.
	///
	/// # Errors
	/// - [`Error::NullNode`] if `node` is no longer in the `arena`.
	/// - [`Error::WouldCycle`] if `node` is this node or one of its ancestors.
	pub fn set_second_node(&self, arena: &mut Arena<BinaryNode<T>>, node: Self) -> Result<Option<Self>> {
		self.set_node(arena, Slot::Second, node)
	}

	fn set_data(&self, arena: &mut Arena<BinaryNode<T>>, slot: Slot, data: T) -> Option<Self> {
		let new = BinaryNode::new(arena, data);

		BinaryNode::replace(arena, *self, slot, new)
	}

	fn set_node(&self, arena: &mut Arena<BinaryNode<T>>, slot: Slot, node: Self) -> Result<Option<Self>> {
		check_attachable(arena, *self, node)?;

		if arena[*self].slot(slot) == Some(node) {
			return Ok(None);
		}

		detach(arena, node);

		Ok(BinaryNode::replace(arena, *self, slot, node))
	}

	/// Detaches this node's first child, returning its token.
	///
	/// The child keeps its descendants and remains in the `arena`. If the first slot is empty,
	/// [`None`] is returned.
	pub fn take_first(&self, arena: &mut Arena<BinaryNode<T>>) -> Option<Self> {
		let child = arena[*self].first;

		child.map(|child| detach(arena, child))
	}

	/// Detaches this node's second child, returning its token.
	///
	/// The child keeps its descendants and remains in the `arena`. If the second slot is empty,
	/// [`None`] is returned.
	pub fn take_second(&self, arena: &mut Arena<BinaryNode<T>>) -> Option<Self> {
		let child = arena[*self].second;

		child.map(|child| detach(arena, child))
	}

	/// Returns the index of `node` among this node's children.
	///
	/// Only occupied slots are counted, so a lone second child is at index `0`. If `node` is not a
	/// child of this node, [`None`] is returned.
	pub fn find_child(&self, arena: &Arena<BinaryNode<T>>, node: Self) -> Option<usize> {
		arena[*self].children().position(|child| child == node)
	}

	/// Removes the child at the given `index`, along with its descendants, from the `arena`.
	///
	/// As for [`find_child`], `index` counts occupied slots only. The removed subtree is returned
	/// as its [representation].
	///
	/// # Errors
	/// [`Error::IndexOutOfRange`] if `index` is not less than the number of children.
	///
	/// [`find_child`]: Self::find_child
	/// [representation]: BinaryNodeRepresentation
	pub fn remove_child(&self, arena: &mut Arena<BinaryNode<T>>, index: usize) -> Result<BinaryNodeRepresentation<T>> {
		let this = &arena[*self];
		let child = this.children().nth(index).ok_or(Error::IndexOutOfRange {
			index,
			len: this.len(),
		})?;

		Ok(BinaryNode::remove_linked(arena, *self, child))
	}

	/// Removes the given child `node`, along with its descendants, from the `arena`.
	///
	/// If `node` is not a child of this node, nothing happens and [`None`] is returned.
	pub fn remove_child_node(
		&self,
		arena: &mut Arena<BinaryNode<T>>,
		node: Self,
	) -> Option<BinaryNodeRepresentation<T>> {
		arena[*self].slot_of(node)?;

		Some(BinaryNode::remove_linked(arena, *self, node))
	}

	/// Exchanges this node's first and second children.
	pub fn swap_children(&self, arena: &mut Arena<BinaryNode<T>>) {
		let this = &mut arena[*self];

		mem::swap(&mut this.first, &mut this.second);
	}

	/// Removes both of this node's children, and their descendants, from the `arena`.
	///
	/// Returns the number of nodes removed.
	pub fn clear_children(&self, arena: &mut Arena<BinaryNode<T>>) -> usize {
		let this = &mut arena[*self];
		let children = [this.first.take(), this.second.take()];

		children.into_iter().flatten().map(|child| remove_subtree(arena, child)).sum()
	}

	/// Removes this node from the `arena`, promoting its children to root nodes.
	///
	/// The node is detached from its parent first. Its [data] is dropped; its `(first, second)`
	/// children keep their own descendants and are returned without a parent.
	///
	/// [data]: TreeNode::data
	pub fn drop_node(&self, arena: &mut Arena<BinaryNode<T>>) -> (Option<Self>, Option<Self>) {
		detach(arena, *self);

		let node = arena
			.0
			.remove(self.idx())
			.expect("tried to drop a node that is no longer in the `arena`");

		for child in node.children() {
			arena[child].parent = None;
		}

		trace!(token = ?self, "dropped node");

		(node.first, node.second)
	}

	/// Attaches this node to the first free slot of `parent` without checking for cycles.
	///
	/// This node is detached from its current parent first. Descendant and ancestor traversals
	/// never terminate on a cyclic structure; break the cycle with [`detach`] before using them
	/// again.
	///
	/// # Errors
	/// - [`Error::NullNode`] if `parent` is no longer in the `arena`.
	/// - [`Error::CapacityExceeded`] if both of `parent`'s slots are occupied.
	///
	/// [`detach`]: crate::NodeToken::detach
	pub fn set_parent_unchecked(&self, arena: &mut Arena<BinaryNode<T>>, parent: Self) -> Result<()> {
		if !arena.contains(parent) {
			return Err(Error::NullNode);
		}

		BinaryNode::attach_free(arena, parent, *self)
	}
}

/// A tree of [`BinaryNode`]s with a single root.
///
/// The root is marked with the tree's [id]. Only a node that is still in the [arena], still has
/// no parent and still carries that mark counts as the root: attaching it beneath another node,
/// or making it the root of another tree, takes it out of this one.
///
/// [id]: Self::id
///
/// [arena]: Arena
#[derive(Debug)]
pub struct BinaryTree<T: Debug> {
	id: TreeId,
	root: Option<Token<BinaryNode<T>>>,
}

impl<T: Debug> Default for BinaryTree<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Debug> BinaryTree<T> {
	/// Creates a new, empty binary tree.
	pub fn new() -> Self {
		Self {
			id: TreeId::next(),
			root: None,
		}
	}

	/// Creates a new binary tree with a root node holding `data`.
	pub fn with_root(arena: &mut Arena<BinaryNode<T>>, data: T) -> Self {
		let id = TreeId::next();
		let root = BinaryNode::new(arena, data);
		arena[root].owner = Some(id);

		Self { id, root: Some(root) }
	}

	/// Returns the id this tree marks its root with.
	#[inline]
	pub const fn id(&self) -> TreeId {
		self.id
	}

	/// Creates a new binary tree whose root is the existing `node`.
	///
	/// The `node` is detached from its parent, if it has one, and brings its descendants with it.
	/// If it is the root of another tree, it is taken from that tree.
	///
	/// # Errors
	/// [`Error::NullNode`] if `node` is no longer in the `arena`.
	pub fn from_node(arena: &mut Arena<BinaryNode<T>>, node: Token<BinaryNode<T>>) -> Result<Self> {
		let mut tree = Self::new();
		tree.set_root_node(arena, node)?;

		Ok(tree)
	}

	/// Returns the token of this tree's root node, if it has one.
	pub fn root(&self, arena: &Arena<BinaryNode<T>>) -> Option<Token<BinaryNode<T>>> {
		self.root.filter(|root| is_owned_root(arena, *root, self.id))
	}

	/// Creates a new root node holding `data`, returning its token.
	///
	/// # Errors
	/// [`Error::AlreadyHasRoot`] if this tree already has a root; [`clear`] it first.
	///
	/// [`clear`]: Self::clear
	pub fn set_root(&mut self, arena: &mut Arena<BinaryNode<T>>, data: T) -> Result<Token<BinaryNode<T>>> {
		if self.root(arena).is_some() {
			return Err(Error::AlreadyHasRoot);
		}

		let root = BinaryNode::new(arena, data);
		arena[root].owner = Some(self.id);
		self.root = Some(root);

		trace!(?root, "set root");

		Ok(root)
	}

	/// Makes the existing `node` this tree's root, returning its token.
	///
	/// The `node` is detached from its parent, if it has one, and brings its descendants with it.
	/// If it is the root of another tree, it is taken from that tree.
	///
	/// # Errors
	/// - [`Error::AlreadyHasRoot`] if this tree already has a root; [`clear`] it first.
	/// - [`Error::NullNode`] if `node` is no longer in the `arena`.
	///
	/// [`clear`]: Self::clear
	pub fn set_root_node(
		&mut self,
		arena: &mut Arena<BinaryNode<T>>,
		node: Token<BinaryNode<T>>,
	) -> Result<Token<BinaryNode<T>>> {
		if self.root(arena).is_some() {
			return Err(Error::AlreadyHasRoot);
		}
		if !arena.contains(node) {
			return Err(Error::NullNode);
		}

		let root = adopt_root(arena, node, self.id);
		self.root = Some(root);

		trace!(?root, "set root");

		Ok(root)
	}

	/// Removes the root node, along with all of its descendants, from the `arena`.
	///
	/// Returns the number of nodes removed.
	#[instrument(level = "trace", skip(self, arena))]
	pub fn clear(&mut self, arena: &mut Arena<BinaryNode<T>>) -> usize {
		match self.root.take().filter(|root| is_owned_root(arena, *root, self.id)) {
			Some(root) => remove_subtree(arena, root),
			None => 0,
		}
	}

	/// Returns the total number of nodes in this tree, the root included.
	///
	/// An empty tree has a size of `0`.
	#[instrument(level = "trace", skip(self, arena))]
	pub fn size(&self, arena: &Arena<BinaryNode<T>>) -> usize {
		self.root(arena).map_or(0, |root| 1 + root.subtree_size(arena))
	}

	/// Returns the number of descendants of `node`, not counting `node` itself.
	///
	/// # Panics
	/// This method will panic if `node` is no longer in the `arena`.
	pub fn subtree_size(&self, arena: &Arena<BinaryNode<T>>, node: Token<BinaryNode<T>>) -> usize {
		node.subtree_size(arena)
	}
}
