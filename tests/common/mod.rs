//! Common test utilities

#![allow(dead_code)]

use std::sync::Once;

use arena_forest::{Arena, Node, NodeToken, Token, Tree, TreeNode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

/// Installs a global `tracing` subscriber for the test binary, once.
///
/// Set `RUST_LOG=arena_forest=trace` to see every structural edit.
pub fn init_test_setup() {
	TEST_SETUP.call_once(|| {
		let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

		let subscriber = tracing_subscriber::registry().with(
			fmt::layer()
				.with_test_writer()
				.with_target(true)
				.with_filter(env_filter),
		);

		if tracing::dispatcher::has_been_set() {
			return;
		}
		subscriber.try_init().unwrap_or_else(|e| {
			eprintln!("Error: Failed to set up logging: {}", e);
		});
	});
}

pub type IntArena = Arena<Node<i32>>;
pub type IntToken = Token<Node<i32>>;

/// The sample forest used across the tests.
///
/// ```text
/// root (42)
/// └── c1 (42)
///     ├── 0 ── 0 1 2 3 4
///     ├── 1 ── 0 1 2 3 4
///     ├── 2 ── 0 1 2 3 4
///     ├── 3 ── 0 1 2 3 4
///     └── 4 ── 0 1 2 3 4
/// ```
pub struct Sample {
	pub arena: IntArena,
	pub tree: Tree<i32>,
	pub root: IntToken,
	pub c1: IntToken,
}

pub fn sample() -> Sample {
	let mut arena = Arena::new();
	let mut tree = Tree::new();

	let root = tree.add_root(&mut arena, 42);
	let c1 = root.append(&mut arena, 42);

	for i in 0..5 {
		let child = c1.append(&mut arena, i);
		for j in 0..5 {
			child.append(&mut arena, j);
		}
	}

	Sample { arena, tree, root, c1 }
}

/// Collects the data of the given tokens' nodes.
pub fn data_of<N>(arena: &Arena<N>, tokens: impl IntoIterator<Item = Token<N>>) -> Vec<N::Data>
where
	N: TreeNode,
	N::Data: Clone,
{
	tokens.into_iter().map(|token| token.data(arena).clone()).collect()
}

/// Asserts that every node reachable from `root` is linked consistently with its parent: each child
/// points back at the node listing it, and is listed exactly once.
pub fn assert_links_consistent<N: TreeNode>(arena: &Arena<N>, root: Token<N>) {
	let mut pending = vec![root];

	while let Some(token) = pending.pop() {
		let children: Vec<_> = token.children(arena).collect();

		for child in &children {
			assert_eq!(
				child.parent(arena),
				Some(token),
				"{child:?} is a child of {token:?} but its parent is {:?}",
				child.parent(arena)
			);
			assert_eq!(
				children.iter().filter(|other| *other == child).count(),
				1,
				"{child:?} is listed more than once by {token:?}"
			);
		}

		pending.extend(children);
	}
}
