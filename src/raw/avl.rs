use super::handle::Handle;
use super::node::Side;
use super::raw_tree::RawTree;
use crate::balance::Avl;
use crate::options::DfsOrder;
use crate::storage::Storage;

impl<K, S: Storage, C> RawTree<K, S, Avl, C> {
    /// Height of the subtree rooted at `node`; 0 for NIL, 1 for a leaf.
    #[inline]
    pub(crate) fn node_height(&self, node: Handle) -> i32 {
        self.meta(node)
    }

    /// `height(left) - height(right)`.
    #[inline]
    pub(crate) fn balance_factor(&self, node: Handle) -> i32 {
        self.node_height(self.left(node)) - self.node_height(self.right(node))
    }

    fn update_height(&mut self, node: Handle) {
        let height = 1 + self.node_height(self.left(node)).max(self.node_height(self.right(node)));
        self.set_meta(node, height);
    }

    /// Rotates `node` down toward `side` and refreshes both heights. Returns the subtree's new
    /// root.
    fn rotate_updating(&mut self, node: Handle, side: Side) -> Handle {
        let riser = self.child(node, side.flip());
        self.rotate(node, side);
        self.update_height(node);
        self.update_height(riser);
        riser
    }

    /// Walks from `node` to the root refreshing heights and rotating wherever a balance factor
    /// left `[-1, 1]`.
    pub(crate) fn retrace(&mut self, mut node: Handle) {
        while !node.is_nil() {
            self.update_height(node);
            let balance = self.balance_factor(node);
            if balance > 1 {
                let left = self.left(node);
                if self.balance_factor(left) < 0 {
                    self.rotate_updating(left, Side::Left);
                }
                node = self.rotate_updating(node, Side::Right);
            } else if balance < -1 {
                let right = self.right(node);
                if self.balance_factor(right) > 0 {
                    self.rotate_updating(right, Side::Right);
                }
                node = self.rotate_updating(node, Side::Left);
            }
            node = self.parent(node);
        }
    }

    /// Recomputes every height bottom-up.
    pub(crate) fn recompute_heights(&mut self) {
        for node in self.dfs_iterative(DfsOrder::Post) {
            self.update_height(node);
        }
    }
}
