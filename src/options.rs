//! Construction options.

use core::cmp::Ordering;

use crate::comparator::{FnComparator, NaturalOrder};

/// Depth-first visiting order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum DfsOrder {
    /// Node, then left subtree, then right subtree.
    Pre,
    /// Left subtree, node, right subtree: ascending key order.
    #[default]
    In,
    /// Left subtree, right subtree, then node.
    Post,
}

/// How [`Tree::dfs`](crate::Tree::dfs) walks the tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum IterationMode {
    /// Explicit stack; never deepens the call stack.
    #[default]
    Iterative,
    /// Plain recursion, one frame per level.
    Recursive,
}

/// Options accepted by [`Tree::with_options`](crate::Tree::with_options).
///
/// Whether values live inside the nodes (map-mode) or in an external store is chosen by the
/// tree's storage type parameter, not by an option.
///
/// # Examples
///
/// ```
/// use ordered_tree::{IterationMode, RedBlackTree, TreeOptions};
///
/// let options = TreeOptions::with_comparator(|a: &i32, b: &i32| b.cmp(a))
///     .iteration_mode(IterationMode::Recursive);
/// let mut tree = RedBlackTree::with_options(options);
/// tree.set(1, "one");
/// tree.set(2, "two");
/// assert_eq!(tree.first().map(|node| *node.key), Some(2));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeOptions<C = NaturalOrder> {
    pub(crate) comparator: C,
    pub(crate) iteration_mode: IterationMode,
}

impl TreeOptions {
    /// Default options: natural key order, iterative traversal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            comparator: NaturalOrder,
            iteration_mode: IterationMode::Iterative,
        }
    }

    /// Orders keys with a closure instead of [`Ord`].
    pub const fn with_comparator<K, F>(compare: F) -> TreeOptions<FnComparator<F>>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        TreeOptions {
            comparator: FnComparator(compare),
            iteration_mode: IterationMode::Iterative,
        }
    }
}

impl<C> TreeOptions<C> {
    /// Replaces the comparator.
    pub fn comparator<D>(self, comparator: D) -> TreeOptions<D> {
        TreeOptions {
            comparator,
            iteration_mode: self.iteration_mode,
        }
    }

    /// Selects the default traversal form.
    #[must_use]
    pub const fn iteration_mode(mut self, mode: IterationMode) -> Self {
        self.iteration_mode = mode;
        self
    }
}
