//! Tests for the structural edits of multi-way nodes

mod common;

use arena_forest::{Arena, Error, Node, NodeToken, TreeNode};
use rstest::rstest;

use common::{assert_links_consistent, data_of, init_test_setup, sample, IntArena, IntToken};

fn root_with_children(arena: &mut IntArena, count: i32) -> IntToken {
	let root = Node::new(arena, -1);
	for i in 0..count {
		root.append(arena, i);
	}

	root
}

// ============================================================
// Append / Insert
// ============================================================

#[test]
fn given_node_when_appending_then_child_is_last_and_points_back() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 2);

	let child = root.append(&mut arena, 7);

	assert_eq!(root.len(&arena), 3);
	assert_eq!(arena[root].last(), Some(child));
	assert_eq!(child.parent(&arena), Some(root));
	assert_links_consistent(&arena, root);
}

#[rstest]
#[case::front(0, vec![9, 0, 1, 2])]
#[case::middle(2, vec![0, 1, 9, 2])]
#[case::end(3, vec![0, 1, 2, 9])]
fn given_index_in_range_when_inserting_then_child_lands_at_index(#[case] index: usize, #[case] expected: Vec<i32>) {
	init_test_setup();
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 3);

	let child = root.insert(&mut arena, index, 9);

	assert_eq!(root.find_child(&arena, child), Some(index));
	assert_eq!(data_of(&arena, root.children(&arena)), expected);
	assert_links_consistent(&arena, root);
}

#[rstest]
#[case(4)]
#[case(17)]
#[case(usize::MAX)]
fn given_index_past_end_when_inserting_then_same_as_appending(#[case] index: usize) {
	init_test_setup();
	let mut inserted = Arena::new();
	let mut appended = Arena::new();
	let a = root_with_children(&mut inserted, 3);
	let b = root_with_children(&mut appended, 3);

	a.insert(&mut inserted, index, 9);
	b.append(&mut appended, 9);

	assert_eq!(
		data_of(&inserted, a.children(&inserted)),
		data_of(&appended, b.children(&appended))
	);
}

#[test]
fn given_parented_node_when_appending_elsewhere_then_it_moves() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = Node::new(&mut arena, 0);
	let old_parent = root.append(&mut arena, 1);
	let new_parent = root.append(&mut arena, 2);
	let node = old_parent.append(&mut arena, 3);
	node.append(&mut arena, 4);

	new_parent.append_node(&mut arena, node).unwrap();

	assert!(old_parent.is_empty(&arena));
	assert_eq!(new_parent.child(&arena, 0), Some(node));
	assert_eq!(node.parent(&arena), Some(new_parent));
	assert_eq!(node.subtree_size(&arena), 1);
	assert_links_consistent(&arena, root);
}

#[test]
fn given_existing_child_when_inserting_it_again_then_it_is_repositioned() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 3);
	let last = root.child(&arena, 2).unwrap();

	root.insert_node(&mut arena, 0, last).unwrap();

	assert_eq!(data_of(&arena, root.children(&arena)), [2, 0, 1]);
	assert_links_consistent(&arena, root);
}

#[test]
fn given_ancestor_when_appending_beneath_descendant_then_refused() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = Node::new(&mut arena, 0);
	let child = root.append(&mut arena, 1);
	let grandchild = child.append(&mut arena, 2);

	assert_eq!(grandchild.append_node(&mut arena, root), Err(Error::WouldCycle));
	assert_eq!(child.insert_node(&mut arena, 0, child), Err(Error::WouldCycle));

	assert!(root.is_root(&arena));
	assert_eq!(root.subtree_size(&arena), 2);
	assert_links_consistent(&arena, root);
}

#[test]
fn given_removed_node_when_appending_it_then_null_node() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = Node::new(&mut arena, 0);
	let stale = root.append(&mut arena, 1);
	stale.recursive_drop(&mut arena);

	assert_eq!(root.append_node(&mut arena, stale), Err(Error::NullNode));
	assert_eq!(root.insert_node(&mut arena, 0, stale), Err(Error::NullNode));
	assert!(root.is_empty(&arena));
}

// ============================================================
// Removal
// ============================================================

#[test]
fn given_index_in_range_when_removing_child_then_subtree_is_returned_and_freed() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 3);
	let middle = root.child(&arena, 1).unwrap();
	middle.append(&mut arena, 10);

	let removed = root.remove_child(&mut arena, 1).unwrap();

	assert_eq!(removed.data, 1);
	assert_eq!(removed.node_count(), 2);
	assert!(!arena.contains(middle));
	assert_eq!(arena.len(), 3);
	assert_eq!(data_of(&arena, root.children(&arena)), [0, 2]);
}

#[test]
fn given_index_out_of_range_when_removing_child_then_error_and_untouched() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 3);

	assert_eq!(
		root.remove_child(&mut arena, 3),
		Err(Error::IndexOutOfRange { index: 3, len: 3 })
	);
	assert_eq!(root.len(&arena), 3);
}

#[test]
fn given_non_child_when_removing_by_token_then_nothing_happens() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 2);
	let stranger = Node::new(&mut arena, 5);

	assert_eq!(root.remove_child_node(&mut arena, stranger), None);
	assert!(arena.contains(stranger));
	assert_eq!(root.len(&arena), 2);
}

#[test]
fn given_child_when_removing_by_token_then_it_is_freed() {
	init_test_setup();
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 2);
	let first = root.child(&arena, 0).unwrap();

	let removed = root.remove_child_node(&mut arena, first).unwrap();

	assert_eq!(removed.data, 0);
	assert!(!arena.contains(first));
	assert_eq!(root.find_child(&arena, first), None);
}

#[test]
fn given_nested_children_when_clearing_then_all_descendants_are_freed() {
	init_test_setup();
	let mut s = sample();

	let removed = s.c1.clear_children(&mut s.arena);

	assert_eq!(removed, 30);
	assert!(s.c1.is_empty(&s.arena));
	assert_eq!(s.arena.len(), 2);
}

// ============================================================
// Detach / Drop / RecursiveDrop
// ============================================================

#[test]
fn given_child_when_detaching_then_both_links_are_cleared() {
	init_test_setup();
	let mut s = sample();
	let node = s.c1.child(&s.arena, 1).unwrap();

	let detached = node.detach(&mut s.arena);

	assert_eq!(detached, node);
	assert!(node.is_root(&s.arena));
	assert_eq!(s.c1.find_child(&s.arena, node), None);
	assert_eq!(node.subtree_size(&s.arena), 5);
	assert_links_consistent(&s.arena, s.root);
}

#[test]
fn given_root_when_detaching_then_nothing_changes() {
	init_test_setup();
	let mut s = sample();

	let before = data_of(&s.arena, s.root.descendants(&s.arena));
	let detached = s.root.detach(&mut s.arena);

	assert_eq!(detached, s.root);
	assert!(s.root.is_root(&s.arena));
	assert_eq!(data_of(&s.arena, s.root.descendants(&s.arena)), before);
}

#[test]
fn given_node_when_dropping_then_children_are_promoted() {
	init_test_setup();
	let mut s = sample();
	let node = s.c1.child(&s.arena, 3).unwrap();
	let grandchildren: Vec<_> = node.children(&s.arena).collect();

	let promoted = node.drop_node(&mut s.arena);

	assert_eq!(promoted, grandchildren);
	assert!(!s.arena.contains(node));
	assert!(promoted.iter().all(|child| child.is_root(&s.arena)));
	assert_eq!(s.c1.len(&s.arena), 4);
	assert_links_consistent(&s.arena, s.root);
}

#[test]
fn given_subtree_when_recursively_dropping_then_it_is_gone_and_parent_forgets_it() {
	init_test_setup();
	let mut s = sample();
	let node = s.c1.child(&s.arena, 2).unwrap();
	let grandchild = node.child(&s.arena, 0).unwrap();

	let removed = node.recursive_drop(&mut s.arena);

	assert_eq!(removed, 6);
	assert!(!s.arena.contains(node));
	assert!(!s.arena.contains(grandchild));
	assert_eq!(s.c1.len(&s.arena), 4);
	assert_links_consistent(&s.arena, s.root);
}

// ============================================================
// Data, swap and comparisons
// ============================================================

#[test]
fn given_two_nodes_when_swapping_then_only_data_moves() {
	init_test_setup();
	let mut s = sample();
	let a = s.c1.child(&s.arena, 0).unwrap();
	let b = s.c1.child(&s.arena, 4).unwrap();
	let a_children: Vec<_> = a.children(&s.arena).collect();
	let b_children: Vec<_> = b.children(&s.arena).collect();

	a.swap_data(&mut s.arena, b);

	assert_eq!(*a.data(&s.arena), 4);
	assert_eq!(*b.data(&s.arena), 0);
	assert_eq!(a.children(&s.arena).collect::<Vec<_>>(), a_children);
	assert_eq!(b.children(&s.arena).collect::<Vec<_>>(), b_children);
	assert_eq!(a.parent(&s.arena), Some(s.c1));
	assert_eq!(b.parent(&s.arena), Some(s.c1));

	s.arena.swap_data(a, b);

	assert_eq!(*a.data(&s.arena), 0);
	assert_eq!(*b.data(&s.arena), 4);
}

#[test]
fn given_same_node_when_swapping_then_nothing_happens() {
	let mut arena = Arena::new();
	let node = Node::new(&mut arena, "only");

	node.swap_data(&mut arena, node);

	assert_eq!(*node.data(&arena), "only");
}

#[test]
fn given_nodes_when_comparing_then_data_decides() {
	let mut arena = Arena::new();
	let a = Node::new(&mut arena, 42);
	let b = a.append(&mut arena, 42);
	let c = a.append(&mut arena, 7);

	assert!(arena[a] == arena[b]);
	assert!(arena[a] != arena[c]);
	assert!(arena[c] < arena[a]);
	assert!(arena[a] > arena[c]);
	assert!(arena[a] <= arena[b]);
	assert!(arena[a] >= arena[b]);

	assert!(arena[a] == &42);
	assert!(arena[a] != &7);
	assert!(!(arena[a] < &42));
	assert!(!(arena[a] > &42));
	assert!(arena[a] <= &42);
	assert!(arena[a] >= &42);
}

#[test]
fn given_node_when_assigning_data_then_structure_is_kept() {
	let mut arena = Arena::new();
	let root = root_with_children(&mut arena, 2);

	*root.data_mut(&mut arena) = 100;

	assert_eq!(*arena[root].data(), 100);
	assert_eq!(root.len(&arena), 2);
}

// ============================================================
// Traversal
// ============================================================

#[test]
fn given_tree_when_walking_descendants_then_breadth_first() {
	let mut arena = Arena::new();
	let root = Node::new(&mut arena, 0);
	let a = root.append(&mut arena, 1);
	let b = root.append(&mut arena, 2);
	a.append(&mut arena, 3);
	b.append(&mut arena, 4);
	a.append(&mut arena, 5);

	assert_eq!(data_of(&arena, root.descendants(&arena)), [1, 2, 3, 5, 4]);
}

#[test]
fn given_deep_node_when_walking_ancestors_then_ends_at_root() {
	let s = sample();
	let leaf = s.c1.child(&s.arena, 0).unwrap().child(&s.arena, 0).unwrap();

	let ancestors: Vec<_> = leaf.ancestors(&s.arena).collect();

	assert_eq!(ancestors.len(), 3);
	assert_eq!(ancestors.last(), Some(&s.root));
	assert_eq!(leaf.root(&s.arena), s.root);
	assert_eq!(s.root.root(&s.arena), s.root);
}

// ============================================================
// Unchecked parent assignment
// ============================================================

#[test]
fn given_descendant_when_setting_parent_unchecked_then_cycle_is_built() {
	init_test_setup();
	let mut arena = Arena::new();
	let a = Node::new(&mut arena, 'a');
	let b = a.append(&mut arena, 'b');

	a.set_parent_unchecked(&mut arena, b).unwrap();

	assert_eq!(a.parent(&arena), Some(b));
	assert_eq!(b.parent(&arena), Some(a));

	// Breaking the cycle makes the structure walkable again.
	b.detach(&mut arena);
	assert_eq!(data_of(&arena, b.descendants(&arena)), ['a']);
}

#[test]
fn given_removed_parent_when_setting_parent_unchecked_then_null_node() {
	let mut arena = Arena::new();
	let a = Node::new(&mut arena, 1);
	let gone = Node::new(&mut arena, 2);
	gone.recursive_drop(&mut arena);

	assert_eq!(a.set_parent_unchecked(&mut arena, gone), Err(Error::NullNode));
	assert!(a.is_root(&arena));
}
