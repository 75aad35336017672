// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{collections::VecDeque, iter::FusedIterator};

use crate::{sealed::Idx, Arena, Token, TreeNode};

/// An iterator over the [tokens] of a [node]'s [ancestors].
///
/// This iterator is returned by [`TreeNode::ancestors`].
///
/// [tokens]: Token
/// [node]: TreeNode
/// [ancestors]: TreeNode::ancestors
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Ancestors<'arena, N: TreeNode> {
	arena: &'arena Arena<N>,

	parent: Option<Token<N>>,
}

/// An iterator over the [tokens] of a [node]'s [descendants].
///
/// This iterator is returned by [`TreeNode::descendants`].
///
/// [tokens]: Token
/// [node]: TreeNode
/// [descendants]: TreeNode::descendants
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Descendants<'arena, N: TreeNode + 'arena> {
	arena: &'arena Arena<N>,

	current: Option<N::ChildrenIter<'arena>>,
	stack: VecDeque<N::ChildrenIter<'arena>>,
}

impl<'arena, N: TreeNode> Ancestors<'arena, N> {
	#[inline(always)]
	pub(super) const fn new(arena: &'arena Arena<N>, parent: Option<Token<N>>) -> Self {
		Self { arena, parent }
	}
}

impl<'arena, N: TreeNode> Iterator for Ancestors<'arena, N> {
	type Item = Token<N>;

	#[inline]
	fn next(&mut self) -> Option<Self::Item> {
		self.parent.map(|parent| {
			self.parent = self.arena.0[parent.idx()].parent();

			parent
		})
	}

	#[inline(always)]
	fn size_hint(&self) -> (usize, Option<usize>) {
		match &self.parent {
			None => (0, Some(0)),
			Some(_) => (1, None),
		}
	}
}

impl<'arena, N: TreeNode> FusedIterator for Ancestors<'arena, N> {}

impl<'arena, N: TreeNode + 'arena> Descendants<'arena, N> {
	#[inline(always)]
	pub(super) fn new(node: &'arena N, arena: &'arena Arena<N>) -> Self {
		Self {
			arena,

			current: Some(node.children()),
			stack: VecDeque::new(),
		}
	}
}

impl<'arena, N: TreeNode + 'arena> Iterator for Descendants<'arena, N> {
	type Item = Token<N>;

	fn next(&mut self) -> Option<Self::Item> {
		let arena = self.arena;

		loop {
			let iter = self.current.as_mut()?;

			if let Some(token) = iter.next() {
				// Queue the children of the descendant being returned.
				self.stack.push_back(arena.0[token.idx()].children());

				return Some(token);
			}

			// `current` is exhausted: move on to the next queued `ChildrenIter`. Once the stack is
			// empty too, `current` stays `None`, which is what makes this a `FusedIterator`.
			self.current = self.stack.pop_front();
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		match &self.current {
			// There are no more children iterators to iterate, and so no more descendants are
			// possible.
			None => (0, Some(0)),

			Some(iter) => {
				let (min, max) = iter.size_hint();

				match max {
					// If the upper bound is `0` and the stack is empty, then there can be no more
					// descendants.
					Some(0) if self.stack.is_empty() => (0, Some(0)),

					// Otherwise, children in the current iterator could add extra `ChildrenIter`s
					// to the stack, so we don't know the upper bound.
					_ => (min, None),
				}
			},
		}
	}
}

impl<'arena, N: TreeNode + 'arena> FusedIterator for Descendants<'arena, N> {}
