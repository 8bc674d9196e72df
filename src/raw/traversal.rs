use alloc::vec::Vec;

use super::handle::Handle;
use super::node::Side;
use super::raw_tree::{RawTree, Stack};
use crate::balance::Balance;
use crate::options::{DfsOrder, IterationMode};
use crate::storage::Storage;

impl<K, S: Storage, B: Balance, C> RawTree<K, S, B, C> {
    /// All nodes in ascending key order.
    #[inline]
    pub(crate) fn in_order(&self) -> Vec<Handle> {
        self.dfs_iterative(DfsOrder::In)
    }

    pub(crate) fn dfs(&self, order: DfsOrder, mode: IterationMode) -> Vec<Handle> {
        match mode {
            IterationMode::Iterative => self.dfs_iterative(order),
            IterationMode::Recursive => self.dfs_recursive(order),
        }
    }

    /// Depth-first walk driven by an explicit stack.
    pub(crate) fn dfs_iterative(&self, order: DfsOrder) -> Vec<Handle> {
        let mut visited = Vec::with_capacity(self.len());
        let mut stack = Stack::new();
        match order {
            DfsOrder::Pre => {
                if !self.root().is_nil() {
                    stack.push(self.root());
                }
                while let Some(node) = stack.pop() {
                    visited.push(node);
                    for child in [self.right(node), self.left(node)] {
                        if !child.is_nil() {
                            stack.push(child);
                        }
                    }
                }
            }
            DfsOrder::In => {
                let mut current = self.root();
                loop {
                    while !current.is_nil() {
                        stack.push(current);
                        current = self.left(current);
                    }
                    let Some(node) = stack.pop() else { break };
                    visited.push(node);
                    current = self.right(node);
                }
            }
            DfsOrder::Post => {
                // Node-right-left preorder, reversed.
                if !self.root().is_nil() {
                    stack.push(self.root());
                }
                while let Some(node) = stack.pop() {
                    visited.push(node);
                    for child in [self.left(node), self.right(node)] {
                        if !child.is_nil() {
                            stack.push(child);
                        }
                    }
                }
                visited.reverse();
            }
        }
        visited
    }

    /// Depth-first walk on the call stack. Recursion depth equals the tree height.
    pub(crate) fn dfs_recursive(&self, order: DfsOrder) -> Vec<Handle> {
        let mut visited = Vec::with_capacity(self.len());
        self.visit(self.root(), order, &mut visited);
        visited
    }

    fn visit(&self, node: Handle, order: DfsOrder, visited: &mut Vec<Handle>) {
        if node.is_nil() {
            return;
        }
        if order == DfsOrder::Pre {
            visited.push(node);
        }
        self.visit(self.left(node), order, visited);
        if order == DfsOrder::In {
            visited.push(node);
        }
        self.visit(self.right(node), order, visited);
        if order == DfsOrder::Post {
            visited.push(node);
        }
    }

    /// Threaded (Morris) walk: empty child slots temporarily point back at an ancestor instead of
    /// keeping a stack. Every thread is removed again before returning.
    pub(crate) fn morris(&mut self, order: DfsOrder) -> Vec<Handle> {
        match order {
            DfsOrder::Pre => self.morris_walk(Side::Left, true),
            DfsOrder::In => self.morris_walk(Side::Left, false),
            DfsOrder::Post => {
                let mut visited = self.morris_walk(Side::Right, true);
                visited.reverse();
                visited
            }
        }
    }

    /// Walks `first` subtrees before the opposite ones. With `visit_on_entry` a node is reported
    /// when its thread is laid (preorder), otherwise when the thread is removed (inorder).
    fn morris_walk(&mut self, first: Side, visit_on_entry: bool) -> Vec<Handle> {
        let last = first.flip();
        let mut visited = Vec::with_capacity(self.len());
        let mut current = self.root();
        while !current.is_nil() {
            let inner = self.child(current, first);
            if inner.is_nil() {
                visited.push(current);
                current = self.child(current, last);
                continue;
            }

            let mut thread = inner;
            while !self.child(thread, last).is_nil() && self.child(thread, last) != current {
                thread = self.child(thread, last);
            }

            if self.child(thread, last).is_nil() {
                if visit_on_entry {
                    visited.push(current);
                }
                self.set_child(thread, last, current);
                current = inner;
            } else {
                self.set_child(thread, last, Handle::NIL);
                if !visit_on_entry {
                    visited.push(current);
                }
                current = self.child(current, last);
            }
        }
        visited
    }
}
