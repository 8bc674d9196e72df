//! Arena-backed binary search tree engine shared by every balancing strategy.
//!
//! Not a stable API; exposed only so the sealed strategy traits can name it.

mod arena;
mod avl;
mod handle;
mod hint;
mod node;
mod raw_tree;
mod red_black;
mod traversal;

pub(crate) use arena::Arena;
pub use handle::Handle;
pub use node::Color;
pub use raw_tree::{RawTree, Removal};
pub(crate) use raw_tree::Relation;
