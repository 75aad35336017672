// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// The ways a structural edit can be refused.
///
/// Every error is raised before the edit touches the [arena], so a failed operation leaves the
/// tree exactly as it was.
///
/// [arena]: crate::Arena
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
	/// A child was requested by an index that is not less than the number of children.
	#[error("the given index ({index}) was out of bounds; there were only {len} children")]
	IndexOutOfRange { index: usize, len: usize },

	/// A token passed as an argument refers to a node that has been removed from the arena.
	#[error("the given node is no longer in the arena")]
	NullNode,

	/// Both of a binary node's child slots are already occupied.
	#[error("binary node already has two children")]
	CapacityExceeded,

	/// The binary tree already has a root node; it must be cleared first.
	#[error("binary tree already has a root node, clear it first")]
	AlreadyHasRoot,

	/// The node would become its own ancestor.
	///
	/// Cycles can only be built deliberately, through `set_parent_unchecked`.
	#[error("tried to attach a node beneath itself or one of its own descendants")]
	WouldCycle,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
