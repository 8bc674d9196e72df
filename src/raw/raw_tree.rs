use core::cmp::Ordering;
use core::ops::Bound;

use alloc::vec::Vec;
use smallvec::SmallVec;
use tracing::debug;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use crate::balance::Balance;
use crate::comparator::Comparator;
use crate::storage::{NodeValues, Storage};

/// Explicit stack used by descents and traversals; 32 levels covers any balanced tree that fits
/// in the arena without spilling.
pub(crate) type Stack = SmallVec<[Handle; 32]>;

/// Cached extrema of the tree. Both are NIL exactly when the tree is empty.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Header {
    pub(crate) min: Handle,
    pub(crate) max: Handle,
}

impl Header {
    pub(crate) const EMPTY: Self = Self {
        min: Handle::NIL,
        max: Handle::NIL,
    };
}

/// What the engine reports after physically unlinking a node.
#[derive(Clone, Copy, Debug)]
pub struct Removal<M> {
    /// The node (possibly NIL) that took the unlinked node's place.
    pub(crate) replacement: Handle,
    /// Parent of `replacement` after the unlink; the balancing strategy starts here.
    pub(crate) parent: Handle,
    /// Bookkeeping of the node that physically left its position.
    pub(crate) removed_meta: M,
}

/// Result of a top-down probe for a key.
pub(crate) enum Probe {
    Found(Handle),
    Vacant { parent: Handle, side: Side },
}

/// The relational tests supported by [`RawTree::navigate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Relation {
    /// Greatest key `<=` the probe.
    Floor,
    /// Least key `>=` the probe.
    Ceiling,
    /// Least key `>` the probe.
    Higher,
    /// Greatest key `<` the probe.
    Lower,
}

/// The binary search tree engine behind every `Tree`.
pub struct RawTree<K, S: Storage, B: Balance, C> {
    /// Arena storing all tree nodes. NIL is never stored.
    nodes: Arena<Node<K, S::Slot, B::Meta>>,
    /// Value storage (inline or external).
    store: S,
    root: Handle,
    len: usize,
    header: Header,
    cmp: C,
}

impl<K, S: Storage, B: Balance, C> RawTree<K, S, B, C> {
    /// Creates a new, empty tree.
    pub(crate) fn new(cmp: C) -> Self {
        Self {
            nodes: Arena::new(),
            store: S::new(),
            root: Handle::NIL,
            len: 0,
            header: Header::EMPTY,
            cmp,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(cmp: C, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            store: S::with_capacity(capacity),
            root: Handle::NIL,
            len: 0,
            header: Header::EMPTY,
            cmp,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    pub(crate) const fn header(&self) -> Header {
        self.header
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.store.clear();
        self.root = Handle::NIL;
        self.len = 0;
        self.header = Header::EMPTY;
    }

    /// Returns true if `handle` names a live node of this tree.
    #[inline]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.nodes.contains(handle)
    }

    /// The generation of the slot behind `handle`; it changes every time the slot is vacated.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> u32 {
        self.nodes.generation(handle)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &S::Value {
        self.store.get(&self.nodes.get(handle).slot)
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut S::Value {
        let slot = &mut self.nodes.get_mut(handle).slot;
        self.store.get_mut(slot)
    }

    /// Overwrites the value of an existing node, returning the previous one.
    pub(crate) fn replace_value(&mut self, handle: Handle, value: S::Value) -> S::Value {
        let slot = &mut self.nodes.get_mut(handle).slot;
        self.store.replace(slot, value)
    }

    // NIL behaves as a black, height-0 leaf whose links all point back to NIL.

    #[inline]
    pub(crate) fn left(&self, handle: Handle) -> Handle {
        if handle.is_nil() { Handle::NIL } else { self.nodes.get(handle).left() }
    }

    #[inline]
    pub(crate) fn right(&self, handle: Handle) -> Handle {
        if handle.is_nil() { Handle::NIL } else { self.nodes.get(handle).right() }
    }

    #[inline]
    pub(crate) fn parent(&self, handle: Handle) -> Handle {
        if handle.is_nil() { Handle::NIL } else { self.nodes.get(handle).parent() }
    }

    #[inline]
    pub(crate) fn child(&self, handle: Handle, side: Side) -> Handle {
        if handle.is_nil() { Handle::NIL } else { self.nodes.get(handle).child(side) }
    }

    #[inline]
    pub(crate) fn meta(&self, handle: Handle) -> B::Meta {
        if handle.is_nil() { B::nil_meta() } else { self.nodes.get(handle).meta }
    }

    #[inline]
    pub(crate) fn set_meta(&mut self, handle: Handle, meta: B::Meta) {
        if handle.is_nil() {
            debug_assert_eq!(meta, B::nil_meta(), "`RawTree::set_meta()` - NIL bookkeeping is fixed!");
            return;
        }
        self.nodes.get_mut(handle).meta = meta;
    }

    #[inline]
    pub(crate) fn set_left(&mut self, handle: Handle, left: Handle) {
        assert!(!handle.is_nil(), "`RawTree::set_left()` - NIL has no children!");
        self.nodes.get_mut(handle).set_left(left);
    }

    #[inline]
    pub(crate) fn set_right(&mut self, handle: Handle, right: Handle) {
        assert!(!handle.is_nil(), "`RawTree::set_right()` - NIL has no children!");
        self.nodes.get_mut(handle).set_right(right);
    }

    #[inline]
    pub(crate) fn set_child(&mut self, handle: Handle, side: Side, child: Handle) {
        match side {
            Side::Left => self.set_left(handle, child),
            Side::Right => self.set_right(handle, child),
        }
    }

    /// Parent writes to NIL are dropped; NIL is shared and never tracks a parent.
    #[inline]
    pub(crate) fn set_parent(&mut self, handle: Handle, parent: Handle) {
        if !handle.is_nil() {
            self.nodes.get_mut(handle).set_parent(parent);
        }
    }

    /// Rewires `u`'s parent so that `v` takes `u`'s place.
    pub(crate) fn transplant(&mut self, u: Handle, v: Handle) {
        let parent = self.parent(u);
        if parent.is_nil() {
            self.root = v;
        } else if self.left(parent) == u {
            self.set_left(parent, v);
        } else {
            self.set_right(parent, v);
        }
        self.set_parent(v, parent);
    }

    pub(crate) fn leftmost(&self, mut handle: Handle) -> Handle {
        while !self.left(handle).is_nil() {
            handle = self.left(handle);
        }
        handle
    }

    pub(crate) fn rightmost(&self, mut handle: Handle) -> Handle {
        while !self.right(handle).is_nil() {
            handle = self.right(handle);
        }
        handle
    }

    /// In-order predecessor of `handle`, NIL at the minimum.
    pub(crate) fn predecessor(&self, handle: Handle) -> Handle {
        let left = self.left(handle);
        if !left.is_nil() {
            return self.rightmost(left);
        }
        let mut current = handle;
        let mut parent = self.parent(current);
        while !parent.is_nil() && self.left(parent) == current {
            current = parent;
            parent = self.parent(parent);
        }
        parent
    }

    /// In-order successor of `handle`, NIL at the maximum.
    pub(crate) fn successor(&self, handle: Handle) -> Handle {
        let right = self.right(handle);
        if !right.is_nil() {
            return self.leftmost(right);
        }
        let mut current = handle;
        let mut parent = self.parent(current);
        while !parent.is_nil() && self.right(parent) == current {
            current = parent;
            parent = self.parent(parent);
        }
        parent
    }

    /// Left rotation around `x`: its right child takes its place.
    pub(crate) fn rotate_left(&mut self, x: Handle) {
        let y = self.right(x);
        assert!(!y.is_nil(), "`RawTree::rotate_left()` - `x` has no right child!");
        let beta = self.left(y);
        self.set_right(x, beta);
        self.set_parent(beta, x);
        self.transplant(x, y);
        self.set_left(y, x);
        self.set_parent(x, y);
    }

    /// Right rotation around `x`: its left child takes its place.
    pub(crate) fn rotate_right(&mut self, x: Handle) {
        let y = self.left(x);
        assert!(!y.is_nil(), "`RawTree::rotate_right()` - `x` has no left child!");
        let beta = self.right(y);
        self.set_left(x, beta);
        self.set_parent(beta, x);
        self.transplant(x, y);
        self.set_right(y, x);
        self.set_parent(x, y);
    }

    /// Rotates `x` down toward `side`.
    #[inline]
    pub(crate) fn rotate(&mut self, x: Handle, side: Side) {
        match side {
            Side::Left => self.rotate_left(x),
            Side::Right => self.rotate_right(x),
        }
    }

    /// Attaches a new leaf under `parent` (NIL for the first node) and lets the balancing
    /// strategy repair the tree. Keeps the extremum cache current.
    pub(crate) fn attach(&mut self, parent: Handle, side: Side, key: K, value: S::Value) -> Handle {
        let slot = self.store.store(value);
        let node = self.nodes.alloc(Node::new(key, slot, B::leaf_meta()));
        self.len += 1;

        if parent.is_nil() {
            assert!(self.root.is_nil(), "`RawTree::attach()` - tree already has a root!");
            self.root = node;
            self.header = Header { min: node, max: node };
        } else {
            assert!(self.child(parent, side).is_nil(), "`RawTree::attach()` - child slot is occupied!");
            self.set_child(parent, side, node);
            self.set_parent(node, parent);
            // Rotations never change which node is leftmost/rightmost, so this is the only
            // place an insertion can move the extrema.
            if side == Side::Left && parent == self.header.min {
                self.header.min = node;
            }
            if side == Side::Right && parent == self.header.max {
                self.header.max = node;
            }
        }

        B::after_insert(self, node);
        node
    }

    /// Physically unlinks `z`, frees its slot and lets the balancing strategy repair the tree.
    ///
    /// With two children, `z`'s in-order successor `y` is moved into `z`'s position (keeping its
    /// handle) and inherits `z`'s bookkeeping; the fixup then starts at `y`'s old position.
    pub(crate) fn remove(&mut self, z: Handle) -> (K, S::Value, Removal<B::Meta>) {
        let z_left = self.left(z);
        let z_right = self.right(z);

        let removal = if z_left.is_nil() {
            let removal = Removal {
                replacement: z_right,
                parent: self.parent(z),
                removed_meta: self.meta(z),
            };
            self.transplant(z, z_right);
            removal
        } else if z_right.is_nil() {
            let removal = Removal {
                replacement: z_left,
                parent: self.parent(z),
                removed_meta: self.meta(z),
            };
            self.transplant(z, z_left);
            removal
        } else {
            let y = self.leftmost(z_right);
            let removed_meta = self.meta(y);
            let x = self.right(y);
            let parent = if self.parent(y) == z {
                y
            } else {
                let y_parent = self.parent(y);
                self.transplant(y, x);
                self.set_right(y, z_right);
                self.set_parent(z_right, y);
                y_parent
            };
            self.transplant(z, y);
            self.set_left(y, z_left);
            self.set_parent(z_left, y);
            let z_meta = self.meta(z);
            self.set_meta(y, z_meta);
            Removal {
                replacement: x,
                parent,
                removed_meta,
            }
        };

        let was_min = self.header.min == z;
        let was_max = self.header.max == z;
        let (key, slot) = self.nodes.take(z).into_parts();
        let value = self.store.take(slot);
        self.len -= 1;

        B::after_delete(self, &removal);

        if self.root.is_nil() {
            self.header = Header::EMPTY;
        } else {
            if was_min {
                self.header.min = self.leftmost(self.root);
            }
            if was_max {
                self.header.max = self.rightmost(self.root);
            }
        }

        (key, value, removal)
    }

    /// Structural check of the extremum cache: `min` must sit at the end of the root's left spine
    /// and `max` at the end of its right spine.
    pub(crate) fn cache_is_plausible(&self) -> bool {
        if self.root.is_nil() {
            return self.header == Header::EMPTY;
        }
        let Header { min, max } = self.header;
        self.nodes.contains(min)
            && self.nodes.contains(max)
            && self.left(min).is_nil()
            && self.right(max).is_nil()
            && self.on_spine(min, Self::left)
            && self.on_spine(max, Self::right)
    }

    /// Returns true if every step from `node` up to the root leaves a `side` child.
    fn on_spine(&self, mut node: Handle, side: fn(&Self, Handle) -> Handle) -> bool {
        while node != self.root {
            let parent = self.parent(node);
            if parent.is_nil() || side(self, parent) != node {
                return false;
            }
            node = parent;
        }
        true
    }

    /// Recomputes the extremum cache from the tree shape. Returns true if it had drifted.
    pub(crate) fn repair_cache(&mut self) -> bool {
        let fresh = if self.root.is_nil() {
            Header::EMPTY
        } else {
            Header {
                min: self.leftmost(self.root),
                max: self.rightmost(self.root),
            }
        };
        let drifted = fresh != self.header;
        if drifted {
            debug!(stale = ?self.header, ?fresh, "repaired extremum cache");
            self.header = fresh;
        }
        drifted
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for child in [self.left(node), self.right(node)] {
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Relinks every node into a tree of minimal height without touching keys or values, then
    /// lets the strategy recompute its bookkeeping.
    pub(crate) fn rebuild_balanced(&mut self) {
        let order = self.in_order();
        self.root = self.link_balanced(&order, Handle::NIL);
        B::after_rebuild(self);
        debug!(len = self.len, height = self.height(), "rebuilt tree to minimal height");
    }

    fn link_balanced(&mut self, sorted: &[Handle], parent: Handle) -> Handle {
        if sorted.is_empty() {
            return Handle::NIL;
        }
        let mid = sorted.len() / 2;
        let node = sorted[mid];
        let left = self.link_balanced(&sorted[..mid], node);
        let right = self.link_balanced(&sorted[mid + 1..], node);
        let n = self.nodes.get_mut(node);
        n.set_left(left);
        n.set_right(right);
        n.set_parent(parent);
        node
    }

    /// Removes every entry, returning them in ascending key order.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, S::Value)> {
        let order = self.in_order();
        let mut result = Vec::with_capacity(order.len());
        for handle in order {
            let (key, slot) = self.nodes.take(handle).into_parts();
            result.push((key, self.store.take(slot)));
        }
        self.clear();
        result
    }

    /// Builds a map-mode tree with the same shape whose values are `f(key, value)`.
    pub(crate) fn map_values<W>(&self, mut f: impl FnMut(&K, &S::Value) -> W) -> RawTree<K, NodeValues<W>, B, C>
    where
        K: Clone,
        C: Clone,
    {
        let store = &self.store;
        let nodes = self.nodes.map(|node| node.map_slot(|key, slot| f(key, store.get(slot))));
        RawTree {
            nodes,
            store: NodeValues::new(),
            root: self.root,
            len: self.len,
            header: self.header,
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, S: Storage, B: Balance, C: Comparator<K>> RawTree<K, S, B, C> {
    #[inline]
    pub(crate) fn compare(&self, a: &K, b: &K) -> Ordering {
        self.cmp.compare(a, b)
    }

    /// Descends from the root to `key` or to the empty slot where it belongs.
    pub(crate) fn probe(&self, key: &K) -> Probe {
        let mut parent = Handle::NIL;
        let mut side = Side::Left;
        let mut current = self.root;
        while !current.is_nil() {
            parent = current;
            side = match self.cmp.compare(key, self.key(current)) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Probe::Found(current),
            };
            current = self.child(current, side);
        }
        Probe::Vacant { parent, side }
    }

    /// Finds the node holding `key`, NIL if absent.
    pub(crate) fn search(&self, key: &K) -> Handle {
        match self.probe(key) {
            Probe::Found(node) => node,
            Probe::Vacant { .. } => Handle::NIL,
        }
    }

    /// Inserts or updates `key`. Returns the node and, for an existing key, the replaced value.
    ///
    /// Keys beyond the cached minimum or maximum are attached directly to that node.
    pub(crate) fn insert(&mut self, key: K, value: S::Value) -> (Handle, Option<S::Value>) {
        if self.root.is_nil() {
            return (self.attach(Handle::NIL, Side::Left, key, value), None);
        }
        if !self.cache_is_plausible() {
            self.repair_cache();
        }

        let Header { min, max } = self.header;
        match self.cmp.compare(&key, self.key(max)) {
            Ordering::Greater => return (self.attach(max, Side::Right, key, value), None),
            Ordering::Equal => return (max, Some(self.replace_value(max, value))),
            Ordering::Less => {}
        }
        match self.cmp.compare(&key, self.key(min)) {
            Ordering::Less => return (self.attach(min, Side::Left, key, value), None),
            Ordering::Equal => return (min, Some(self.replace_value(min, value))),
            Ordering::Greater => {}
        }

        match self.probe(&key) {
            Probe::Found(node) => (node, Some(self.replace_value(node, value))),
            Probe::Vacant { parent, side } => (self.attach(parent, side, key, value), None),
        }
    }

    /// Removes `key` if present.
    pub(crate) fn delete(&mut self, key: &K) -> Option<(K, S::Value, Removal<B::Meta>)> {
        let node = self.search(key).real()?;
        Some(self.remove(node))
    }

    /// Single descent keeping the best candidate satisfying `relation`.
    pub(crate) fn navigate(&self, key: &K, relation: Relation) -> Handle {
        let mut best = Handle::NIL;
        let mut current = self.root;
        while !current.is_nil() {
            let order = self.cmp.compare(self.key(current), key);
            let qualifies = match relation {
                Relation::Floor => order != Ordering::Greater,
                Relation::Ceiling => order != Ordering::Less,
                Relation::Higher => order == Ordering::Greater,
                Relation::Lower => order == Ordering::Less,
            };
            if qualifies && order == Ordering::Equal {
                return current;
            }
            // Floor/Lower improve toward larger keys, Ceiling/Higher toward smaller ones.
            let improve = match relation {
                Relation::Floor | Relation::Lower => Side::Right,
                Relation::Ceiling | Relation::Higher => Side::Left,
            };
            if qualifies {
                best = current;
                current = self.child(current, improve);
            } else {
                current = self.child(current, improve.flip());
            }
        }
        best
    }

    /// Collects, in ascending order, every node within `[low, high]` as given by the bounds.
    /// Subtrees entirely below `low` are never entered, and the walk stops at the first key
    /// past `high`.
    pub(crate) fn range(&self, low: Bound<&K>, high: Bound<&K>) -> Vec<Handle> {
        let above_low = |node: Handle| match low {
            Bound::Included(low) => self.cmp.compare(self.key(node), low) != Ordering::Less,
            Bound::Excluded(low) => self.cmp.compare(self.key(node), low) == Ordering::Greater,
            Bound::Unbounded => true,
        };
        let below_high = |node: Handle| match high {
            Bound::Included(high) => self.cmp.compare(self.key(node), high) != Ordering::Greater,
            Bound::Excluded(high) => self.cmp.compare(self.key(node), high) == Ordering::Less,
            Bound::Unbounded => true,
        };

        let mut result = Vec::new();
        let mut stack = Stack::new();
        let mut current = self.root;
        loop {
            while !current.is_nil() {
                if above_low(current) {
                    stack.push(current);
                    current = self.left(current);
                } else {
                    // This node and its whole left subtree sit below `low`.
                    current = self.right(current);
                }
            }
            let Some(node) = stack.pop() else { break };
            if !below_high(node) {
                break;
            }
            result.push(node);
            current = self.right(node);
        }
        result
    }
}

impl<K: Clone, T, M: Copy> Node<K, T, M> {
    /// Copies the node with a converted slot, keeping links and bookkeeping.
    pub(crate) fn map_slot<U>(&self, f: impl FnOnce(&K, &T) -> U) -> Node<K, U, M> {
        let mut node = Node::new(self.key().clone(), f(self.key(), &self.slot), self.meta);
        node.set_left(self.left());
        node.set_right(self.right());
        node.set_parent(self.parent());
        node
    }
}

impl<K: Clone, S: Storage + Clone, B: Balance, C: Clone> Clone for RawTree<K, S, B, C>
where
    S::Slot: Clone,
{
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            store: self.store.clone(),
            root: self.root,
            len: self.len,
            header: self.header,
            cmp: self.cmp.clone(),
        }
    }
}

#[cfg(test)]
impl<K, S: Storage, B: Balance, C> RawTree<K, S, B, C> {
    /// Overwrites the extremum cache, simulating a corrupted header.
    pub(crate) fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    pub(crate) fn live_slots(&self) -> usize {
        self.nodes.len()
    }
}
