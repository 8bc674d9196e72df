//! Balancing strategies.
//!
//! A strategy decides what bookkeeping each node carries and how the tree is repaired after the
//! shared binary-search-tree engine attached or detached a node. The strategies are zero-sized
//! markers used as a type parameter of [`Tree`](crate::Tree).

use core::fmt::Debug;

use crate::raw::{Color, Handle, RawTree, Removal};
use crate::storage::Storage;

#[allow(unreachable_pub)]
mod sealed {
    pub trait Sealed {}
}

/// Which balancing strategy a tree uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TreeKind {
    /// Plain binary search tree, no automatic rebalancing.
    Bst,
    /// Red-black coloring.
    RedBlack,
    /// AVL height balancing.
    Avl,
}

/// A balancing strategy. Implemented by [`Unbalanced`], [`RedBlack`] and [`Avl`] only.
pub trait Balance: Sized + sealed::Sealed {
    /// Per-node bookkeeping.
    type Meta: Copy + Debug + Eq;
    /// Runtime tag of the strategy.
    const KIND: TreeKind;

    /// Bookkeeping reported for the NIL sentinel.
    #[doc(hidden)]
    fn nil_meta() -> Self::Meta;

    /// Bookkeeping of a freshly attached leaf.
    #[doc(hidden)]
    fn leaf_meta() -> Self::Meta;

    /// Repairs the tree after `node` was attached as a leaf.
    #[doc(hidden)]
    fn after_insert<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>, node: Handle);

    /// Repairs the tree after the engine physically unlinked a node.
    #[doc(hidden)]
    fn after_delete<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>, removal: &Removal<Self::Meta>);

    /// Recomputes all bookkeeping after the tree was rebuilt to minimal height.
    #[doc(hidden)]
    fn after_rebuild<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>);
}

/// Plain binary search tree: the shape follows insertion order.
///
/// Use [`Tree::perfectly_balance`](crate::Tree::perfectly_balance) or
/// [`Tree::set_many`](crate::Tree::set_many) to keep it shallow.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Unbalanced;

/// Red-black balancing: every path from a node to a NIL leaf has the same number of black nodes
/// and no red node has a red child.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RedBlack;

/// AVL balancing: sibling subtree heights never differ by more than one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Avl;

impl sealed::Sealed for Unbalanced {}
impl sealed::Sealed for RedBlack {}
impl sealed::Sealed for Avl {}

impl Balance for Unbalanced {
    type Meta = ();
    const KIND: TreeKind = TreeKind::Bst;

    fn nil_meta() {}

    fn leaf_meta() {}

    fn after_insert<K, S: Storage, C>(_tree: &mut RawTree<K, S, Self, C>, _node: Handle) {}

    fn after_delete<K, S: Storage, C>(_tree: &mut RawTree<K, S, Self, C>, _removal: &Removal<()>) {}

    fn after_rebuild<K, S: Storage, C>(_tree: &mut RawTree<K, S, Self, C>) {}
}

impl Balance for RedBlack {
    type Meta = Color;
    const KIND: TreeKind = TreeKind::RedBlack;

    fn nil_meta() -> Color {
        Color::Black
    }

    fn leaf_meta() -> Color {
        Color::Red
    }

    fn after_insert<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>, node: Handle) {
        tree.insert_fixup(node);
    }

    fn after_delete<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>, removal: &Removal<Color>) {
        // Removing a red node never changes a black-height.
        if removal.removed_meta.is_black() {
            tree.delete_fixup(removal.replacement, removal.parent);
        }
    }

    fn after_rebuild<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>) {
        tree.recolor_by_depth();
    }
}

impl Balance for Avl {
    type Meta = i32;
    const KIND: TreeKind = TreeKind::Avl;

    fn nil_meta() -> i32 {
        0
    }

    fn leaf_meta() -> i32 {
        1
    }

    fn after_insert<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>, node: Handle) {
        let parent = tree.parent(node);
        tree.retrace(parent);
    }

    fn after_delete<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>, removal: &Removal<i32>) {
        tree.retrace(removal.parent);
    }

    fn after_rebuild<K, S: Storage, C>(tree: &mut RawTree<K, S, Self, C>) {
        tree.recompute_heights();
    }
}
