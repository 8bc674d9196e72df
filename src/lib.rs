//! Arena-backed binary search trees with pluggable balancing for Rust.
//!
//! [`Tree`] is an ordered map whose balancing strategy is a type parameter:
//!
//! - [`Bst`] - plain binary search tree, shaped by insertion order
//! - [`RedBlackTree`] - red-black coloring, at most `2 log2(n + 1)` levels
//! - [`AvlTree`] - AVL height balancing, at most `1.44 log2(n + 2)` levels
//!
//! All three share one search/attach/detach engine and differ only in the fixup they run after
//! a structural change. On top of the ordered-map basics they offer `floor`, `ceiling`, `higher`
//! and `lower` lookups, pruned range search, stable [`NodeId`]s with parent/child navigation,
//! hint-based insertion and a global rebuild to minimal height.
//!
//! # Example
//!
//! ```
//! use ordered_tree::{AvlTree, DfsOrder};
//!
//! let mut tree = AvlTree::new();
//! for key in [11, 3, 15, 1, 8, 13, 16] {
//!     tree.set(key, key * 10);
//! }
//!
//! assert_eq!(tree.get(&8), Some(&80));
//! assert_eq!(tree.lower(&11).map(|node| *node.key), Some(8));
//!
//! let range: Vec<i32> = tree.range_search(3..=13).unwrap().iter().map(|node| *node.key).collect();
//! assert_eq!(range, [3, 8, 11, 13]);
//!
//! let deleted = tree.delete(&11).unwrap();
//! assert_eq!(deleted.value, 110);
//!
//! let preorder: Vec<i32> = tree.dfs(DfsOrder::Pre).iter().map(|node| *node.key).collect();
//! assert_eq!(preorder.len(), 6);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Arena storage** - Nodes live in one slot vector addressed by index; freed slots are reused
//! - **Extremum cache** - Minimum and maximum are cached, so keys beyond either end attach in O(1)
//! - **Two value-storage modes** - Inline values ([`NodeValues`]) or an external value arena
//!   ([`StoreValues`]) so that rotations never move payloads
//!
//! Built on the same engine: [`TreeSet`], [`TreeMultiMap`] and [`TreeMultiSet`].

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
// Sealed trait modules opt out locally, so this cannot be `forbid`.
#![deny(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod balance;
mod comparator;
mod error;
mod options;
mod storage;

#[doc(hidden)]
pub mod raw;
pub mod tree;
pub mod tree_multimap;
pub mod tree_multiset;
pub mod tree_set;

pub use balance::{Avl, Balance, RedBlack, TreeKind, Unbalanced};
pub use comparator::{Comparator, FnComparator, NaturalOrder};
pub use error::TreeError;
pub use options::{DfsOrder, IterationMode, TreeOptions};
pub use raw::Color;
pub use storage::{NodeValues, Storage, StoreValues};
pub use tree::{AvlTree, Bst, Deleted, NodeId, NodeRef, RedBlackTree, Tree};
pub use tree_multimap::TreeMultiMap;
pub use tree_multiset::TreeMultiSet;
pub use tree_set::TreeSet;
