// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{
	cmp::Ordering,
	collections::{vec_deque, VecDeque},
	fmt::Debug,
	iter::Copied,
	mem,
	ops::Index,
};

use tracing::trace;

use crate::{
	check_attachable,
	detach,
	remove_subtree,
	sealed::{Idx, Link, Sealed},
	Arena,
	Error,
	Result,
	Token,
	TreeId,
	TreeNode,
};

/// A node with any number of ordered children.
///
/// Children are stored as a [`VecDeque`] of [tokens], so they can be [directly indexed] and
/// [inserted], [removed] or [found] by position. Structural edits are made through the node's
/// [token], e.g. [`append`] and [`detach`].
///
/// Nodes compare by their [data] alone: two nodes holding equal data are equal wherever they are
/// in the [arena]. A node can also be compared against a reference to a bare value.
///
/// `T` represents the [data] associated with the node.
///
/// [tokens]: Token
/// [token]: Token
/// [directly indexed]: Node::index
/// [inserted]: Token::insert
/// [removed]: Token::remove_child
/// [found]: Token::find_child
/// [`append`]: Token::append
/// [`detach`]: crate::NodeToken::detach
/// [data]: Node::data
/// [arena]: Arena
#[derive(Debug)]
pub struct Node<T: Debug> {
	token: Token<Self>,

	parent: Option<Token<Self>>,
	children: VecDeque<Token<Self>>,

	owner: Option<TreeId>,

	data: T,
}

/// The [representation] of a [node] after it has been removed from the [arena].
///
/// [representation]: TreeNode::Representation
/// [node]: Node
/// [arena]: Arena
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct NodeRepresentation<T> {
	/// The [node]'s [children].
	///
	/// [node]: Node
	/// [children]: TreeNode::children
	pub children: VecDeque<NodeRepresentation<T>>,
	/// The [data] associated with the [node].
	///
	/// [node]: Node
	/// [data]: TreeNode::Data
	pub data: T,
}

impl<T> NodeRepresentation<T> {
	/// Returns the number of nodes in this representation, itself included.
	pub fn node_count(&self) -> usize {
		let mut pending = vec![self];
		let mut count = 0;

		while let Some(representation) = pending.pop() {
			pending.extend(&representation.children);
			count += 1;
		}

		count
	}
}

/// A node whose representation is being built, waiting on its remaining children.
struct PartialRepresentation<T: Debug> {
	data: T,

	pending: vec_deque::IntoIter<Token<Node<T>>>,
	children: VecDeque<NodeRepresentation<T>>,
}

impl<T: Debug> PartialRepresentation<T> {
	fn new(node: Node<T>) -> Self {
		Self {
			data: node.data,

			children: VecDeque::with_capacity(node.children.len()),
			pending: node.children.into_iter(),
		}
	}

	fn finish(self) -> NodeRepresentation<T> {
		NodeRepresentation {
			children: self.children,
			data: self.data,
		}
	}
}

impl<T: Debug> Node<T> {
	/// Returns the token of this node's first child, if it has any children.
	#[inline]
	pub fn first(&self) -> Option<Token<Self>> {
		self.children.front().copied()
	}

	/// Returns the token of this node's last child, if it has any children.
	#[inline]
	pub fn last(&self) -> Option<Token<Self>> {
		self.children.back().copied()
	}

	/// Returns the token of the child at the given `index`.
	///
	/// If `index` is out of bounds, [`None`] is returned.
	#[inline]
	pub fn get(&self, index: usize) -> Option<Token<Self>> {
		self.children.get(index).copied()
	}

	/// Inserts `new` into the children at `index`, clamped to the end, and points it back here.
	fn link(arena: &mut Arena<Self>, parent: Token<Self>, index: usize, new: Token<Self>) {
		let node = &mut arena[new];
		node.parent = Some(parent);
		node.owner = None;

		let children = &mut arena[parent].children;
		let index = index.min(children.len());
		children.insert(index, new);

		trace!(?parent, ?new, index, "attached child");
	}

	/// Removes the child `token` from the `arena` and converts it into its representation.
	fn remove_linked(arena: &mut Arena<Self>, token: Token<Self>) -> NodeRepresentation<T> {
		let node = arena
			.0
			.remove(token.idx())
			.expect("tried to remove child but there was no such node in the `arena`");

		trace!(?token, "removed child");

		node.into_representation(arena)
	}
}

impl<T: Debug> Sealed for Node<T> {}

impl<T: Debug> Link for Node<T> {
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
		match self.children.iter().position(|token| *token == child) {
			Some(index) => {
				self.children.remove(index);

				true
			},

			None => false,
		}
	}
}

impl<T: Debug> TreeNode for Node<T> {
	type Data = T;
	type Representation = NodeRepresentation<T>;

	type ChildrenIter<'node> = Copied<vec_deque::Iter<'node, Token<Self>>>
	where
		Self: 'node;

	fn new(arena: &mut Arena<Self>, data: T) -> Token<Self> {
		Token::new(arena.0.insert_with(|idx| Self {
			token: Token::new(idx),

			parent: None,
			children: VecDeque::new(),

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
		self.children.iter().copied()
	}

	#[inline(always)]
	fn len(&self) -> usize {
		self.children.len()
	}

	fn into_representation(self, arena: &mut Arena<Self>) -> NodeRepresentation<T> {
		let mut ancestors = Vec::new();
		let mut current = PartialRepresentation::new(self);

		loop {
			match current.pending.next() {
				Some(child) => {
					if let Some(child) = arena.0.remove(child.idx()) {
						ancestors.push(mem::replace(&mut current, PartialRepresentation::new(child)));
					}
				},

				None => {
					let representation = current.finish();

					match ancestors.pop() {
						Some(parent) => {
							current = parent;
							current.children.push_back(representation);
						},

						None => return representation,
					}
				},
			}
		}
	}
}

impl<T: Debug> Index<usize> for Node<T> {
	type Output = Token<Self>;

	#[inline(always)]
	fn index(&self, index: usize) -> &Self::Output {
		&self.children[index]
	}
}

impl<T: Debug + PartialEq> PartialEq for Node<T> {
	#[inline(always)]
	fn eq(&self, other: &Self) -> bool {
		self.data == other.data
	}
}

impl<'value, T: Debug + PartialEq> PartialEq<&'value T> for Node<T> {
	#[inline(always)]
	fn eq(&self, other: &&'value T) -> bool {
		self.data == **other
	}
}

impl<T: Debug + PartialOrd> PartialOrd for Node<T> {
	#[inline(always)]
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		self.data.partial_cmp(&other.data)
	}
}

impl<'value, T: Debug + PartialOrd> PartialOrd<&'value T> for Node<T> {
	#[inline(always)]
	fn partial_cmp(&self, other: &&'value T) -> Option<Ordering> {
		self.data.partial_cmp(*other)
	}
}

/// Structural edits of a [`Node`], made through its token.
///
/// # Panics
/// Every method panics if this token is stale, i.e. its node has been removed from the [arena].
/// Tokens passed as arguments are checked instead, failing with [`Error::NullNode`].
///
/// [arena]: Arena
impl<T: Debug> Token<Node<T>> {
	/// Creates a new node with the given `data` and pushes it to the end of this node's children.
	///
	/// The new node's token is returned.
	pub fn append(&self, arena: &mut Arena<Node<T>>, data: T) -> Self {
		let new = Node::new(arena, data);
		Node::link(arena, *self, usize::MAX, new);

		new
	}

	/// Moves the existing `node` to the end of this node's children, returning its token.
	///
	/// If `node` already has a parent, it is detached from that parent first. Its own
	/// descendants move with it.
	///
	/// # Errors
	/// - [`Error::NullNode`] if `node` is no longer in the `arena`.
	/// - [`Error::WouldCycle`] if `node` is this node or one of its ancestors.
	pub fn append_node(&self, arena: &mut Arena<Node<T>>, node: Self) -> Result<Self> {
		self.attach(arena, usize::MAX, node)
	}

	/// Creates a new node with the given `data` and inserts it at the given `index` among this
	/// node's children.
	///
	/// If `index` is greater than the number of children, the new node is appended instead.
	pub fn insert(&self, arena: &mut Arena<Node<T>>, index: usize, data: T) -> Self {
		let new = Node::new(arena, data);
		Node::link(arena, *self, index, new);

		new
	}

	/// Moves the existing `node` to the given `index` among this node's children, returning its
	/// token.
	///
	/// The `node` is detached from any previous parent first; `index` is then clamped to the
	/// number of children, exactly as for [`insert`].
	///
	/// # Errors
	/// - [`Error::NullNode`] if `node` is no longer in the `arena`.
	/// - [`Error::WouldCycle`] if `node` is this node or one of its ancestors.
	///
	/// [`insert`]: Self::insert
	pub fn insert_node(&self, arena: &mut Arena<Node<T>>, index: usize, node: Self) -> Result<Self> {
		self.attach(arena, index, node)
	}

	fn attach(&self, arena: &mut Arena<Node<T>>, index: usize, node: Self) -> Result<Self> {
		check_attachable(arena, *self, node)?;

		detach(arena, node);
		Node::link(arena, *self, index, node);

		Ok(node)
	}

	/// Attaches this node beneath `parent` without checking for cycles.
	///
	/// This node is detached from its current parent and pushed to the end of `parent`'s
	/// children, even if `parent` is this node or one of its descendants. Descendant and
	/// ancestor traversals never terminate on a cyclic structure; break the cycle with
	/// [`detach`] before using them again.
	///
	/// # Errors
	/// [`Error::NullNode`] if `parent` is no longer in the `arena`.
	///
	/// [`detach`]: crate::NodeToken::detach
	pub fn set_parent_unchecked(&self, arena: &mut Arena<Node<T>>, parent: Self) -> Result<()> {
		if !arena.contains(parent) {
			return Err(Error::NullNode);
		}

		detach(arena, *self);
		Node::link(arena, parent, usize::MAX, *self);

		Ok(())
	}

	/// Returns the token of the child at the given `index`.
	///
	/// If `index` is out of bounds, [`None`] is returned.
	#[inline]
	pub fn child(&self, arena: &Arena<Node<T>>, index: usize) -> Option<Self> {
		arena[*self].get(index)
	}

	/// Returns the index of `node` among this node's children.
	///
	/// Children are matched by identity, not by [data]. If `node` is not a child of this node,
	/// [`None`] is returned.
	///
	/// [data]: TreeNode::data
	pub fn find_child(&self, arena: &Arena<Node<T>>, node: Self) -> Option<usize> {
		arena[*self].children.iter().position(|child| *child == node)
	}

	/// Removes the child at the given `index`, along with its descendants, from the `arena`.
	///
	/// The removed subtree is returned as its [representation].
	///
	/// # Errors
	/// [`Error::IndexOutOfRange`] if `index` is not less than the number of children.
	///
	/// [representation]: NodeRepresentation
	pub fn remove_child(&self, arena: &mut Arena<Node<T>>, index: usize) -> Result<NodeRepresentation<T>> {
		let children = &mut arena[*self].children;

		let child = children.remove(index).ok_or_else(|| Error::IndexOutOfRange {
			index,
			len: children.len(),
		})?;

		Ok(Node::remove_linked(arena, child))
	}

	/// Removes the given child `node`, along with its descendants, from the `arena`.
	///
	/// If `node` is not a child of this node, nothing happens and [`None`] is returned.
	pub fn remove_child_node(&self, arena: &mut Arena<Node<T>>, node: Self) -> Option<NodeRepresentation<T>> {
		let index = self.find_child(arena, node)?;
		arena[*self].children.remove(index);

		Some(Node::remove_linked(arena, node))
	}

	/// Removes all of this node's children, and their descendants, from the `arena`.
	///
	/// Returns the number of nodes removed.
	pub fn clear_children(&self, arena: &mut Arena<Node<T>>) -> usize {
		let children = mem::take(&mut arena[*self].children);

		children.into_iter().map(|child| remove_subtree(arena, child)).sum()
	}

	/// Removes this node from the `arena`, promoting its children to root nodes.
	///
	/// The node is detached from its parent first. Its [data] is dropped; its children keep
	/// their own descendants and are returned in order, each without a parent.
	///
	/// [data]: TreeNode::data
	pub fn drop_node(&self, arena: &mut Arena<Node<T>>) -> Vec<Self> {
		detach(arena, *self);

		let node = arena
			.0
			.remove(self.idx())
			.expect("tried to drop a node that is no longer in the `arena`");

		let children: Vec<Self> = node.children.into_iter().collect();
		for child in &children {
			arena[*child].parent = None;
		}

		trace!(token = ?self, promoted = children.len(), "dropped node");

		children
	}
}
