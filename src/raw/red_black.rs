use smallvec::SmallVec;

use super::handle::Handle;
use super::node::{Color, Side};
use super::raw_tree::RawTree;
use crate::balance::RedBlack;
use crate::storage::Storage;

impl<K, S: Storage, C> RawTree<K, S, RedBlack, C> {
    /// Color of `node`; NIL is black.
    #[inline]
    pub(crate) fn color(&self, node: Handle) -> Color {
        self.meta(node)
    }

    #[inline]
    fn paint(&mut self, node: Handle, color: Color) {
        self.set_meta(node, color);
    }

    /// Restores the red-black rules after `node` was attached as a red leaf.
    pub(crate) fn insert_fixup(&mut self, mut node: Handle) {
        while self.color(self.parent(node)).is_red() {
            let mut parent = self.parent(node);
            // A red parent is never the root, so the grandparent is real.
            let grandparent = self.parent(parent);
            let side = if self.left(grandparent) == parent { Side::Left } else { Side::Right };
            let uncle = self.child(grandparent, side.flip());

            if self.color(uncle).is_red() {
                self.paint(parent, Color::Black);
                self.paint(uncle, Color::Black);
                self.paint(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            if self.child(parent, side.flip()) == node {
                // Inner grandchild: turn the zig-zag into a straight line first.
                node = parent;
                self.rotate(node, side);
                parent = self.parent(node);
            }
            self.paint(parent, Color::Black);
            self.paint(grandparent, Color::Red);
            self.rotate(grandparent, side.flip());
        }

        let root = self.root();
        self.paint(root, Color::Black);
    }

    /// Resolves the double-black deficiency left at `node` (possibly NIL), whose parent is
    /// `parent`, after a black node was unlinked.
    pub(crate) fn delete_fixup(&mut self, mut node: Handle, mut parent: Handle) {
        while node != self.root() && self.color(node).is_black() {
            let side = if self.left(parent) == node { Side::Left } else { Side::Right };
            let mut sibling = self.child(parent, side.flip());

            if self.color(sibling).is_red() {
                self.paint(sibling, Color::Black);
                self.paint(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, side.flip());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.flip());
            if self.color(near).is_black() && self.color(far).is_black() {
                self.paint(sibling, Color::Red);
                node = parent;
                parent = self.parent(node);
                continue;
            }

            if self.color(far).is_black() {
                self.paint(near, Color::Black);
                self.paint(sibling, Color::Red);
                self.rotate(sibling, side.flip());
                sibling = self.child(parent, side.flip());
            }

            let parent_color = self.color(parent);
            self.paint(sibling, parent_color);
            self.paint(parent, Color::Black);
            let far = self.child(sibling, side.flip());
            self.paint(far, Color::Black);
            self.rotate(parent, side);
            node = self.root();
            parent = Handle::NIL;
        }

        self.paint(node, Color::Black);
    }

    /// Colors a freshly rebuilt minimal-height tree: every level black except an incomplete or
    /// complete deepest level, which is red.
    pub(crate) fn recolor_by_depth(&mut self) {
        let deepest = self.height();
        let mut stack: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        if !self.root().is_nil() {
            stack.push((self.root(), 1));
        }
        while let Some((node, depth)) = stack.pop() {
            let color = if depth == deepest && deepest > 1 { Color::Red } else { Color::Black };
            self.paint(node, color);
            for child in [self.left(node), self.right(node)] {
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }
}
