use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Bound, Index, RangeBounds};
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use alloc::vec::Vec;

use crate::balance::{Avl, Balance, RedBlack, TreeKind, Unbalanced};
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::options::{DfsOrder, IterationMode, TreeOptions};
use crate::raw::{Color, Handle, RawTree, Relation};
use crate::storage::{NodeValues, Storage};

/// Stable identifier of a node inside one tree.
///
/// An id stays valid until its node is deleted. Rotations, rebalancing and
/// [`Tree::perfectly_balance`] never change which id holds which key. Once the node is deleted
/// the id is rejected with [`TreeError::StaleNode`], even after a later insertion reuses its
/// slot. Ids are also rejected by every tree other than the one that issued them, clones
/// included.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId {
    tree: u32,
    slot: u32,
    generation: u32,
}

impl NodeId {
    fn handle(self) -> Handle {
        Handle::from_raw(self.slot).unwrap_or(Handle::NIL)
    }
}

static NEXT_TREE_TAG: AtomicU32 = AtomicU32::new(1);

/// Hands out the tag that scopes a tree's [`NodeId`]s.
fn next_tree_tag() -> u32 {
    NEXT_TREE_TAG.fetch_add(1, AtomicOrdering::Relaxed)
}

/// A read-only view of one node: its entry and its links.
#[derive(Debug)]
pub struct NodeRef<'a, K, V> {
    pub id: NodeId,
    pub key: &'a K,
    pub value: &'a V,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

/// An entry removed from a tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deleted<K, V> {
    pub key: K,
    pub value: V,
    /// The node where rebalancing started: the parent of the position the removed node
    /// physically left. `None` when that position was the root, that is when the tree became
    /// empty or the root's only child took its place.
    pub rebalance_root: Option<NodeId>,
}

/// An ordered map built on a binary search tree, generic over its balancing strategy.
///
/// * `B` picks the strategy: [`Unbalanced`], [`RedBlack`] (default) or [`Avl`].
/// * `C` orders the keys; [`NaturalOrder`] uses [`Ord`].
/// * `S` picks where values live: inline in the nodes ([`NodeValues`], map-mode) or in a separate
///   value arena ([`StoreValues`](crate::StoreValues)) so that rotations never move payloads.
///
/// The tree caches its minimum and maximum node. Inserting a key beyond either end attaches it
/// directly to that node without a descent, which makes ascending or descending bulk loads cost
/// O(1) plus rebalancing per key.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by the comparator, changes while it is in the tree. The behavior
/// resulting from such a logic error is not specified, but will not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use ordered_tree::RedBlackTree;
///
/// let mut prices = RedBlackTree::new();
/// prices.set(30, "thirty");
/// prices.set(10, "ten");
/// prices.set(20, "twenty");
///
/// assert_eq!(prices.get(&20), Some(&"twenty"));
/// assert_eq!(prices.floor(&25).map(|node| *node.key), Some(20));
/// assert_eq!(prices.ceiling(&25).map(|node| *node.key), Some(30));
///
/// let keys: Vec<_> = prices.keys().copied().collect();
/// assert_eq!(keys, [10, 20, 30]);
/// ```
pub struct Tree<K, V, B: Balance = RedBlack, C = NaturalOrder, S: Storage<Value = V> = NodeValues<V>> {
    raw: RawTree<K, S, B, C>,
    iteration_mode: IterationMode,
    tag: u32,
    _values: PhantomData<V>,
}

/// Plain binary search tree in map-mode.
pub type Bst<K, V, C = NaturalOrder> = Tree<K, V, Unbalanced, C, NodeValues<V>>;

/// Red-black tree in map-mode.
pub type RedBlackTree<K, V, C = NaturalOrder> = Tree<K, V, RedBlack, C, NodeValues<V>>;

/// AVL tree in map-mode.
pub type AvlTree<K, V, C = NaturalOrder> = Tree<K, V, Avl, C, NodeValues<V>>;

/// An iterator over the entries of a [`Tree`], in ascending key order.
///
/// This `struct` is created by the [`iter`](Tree::iter) method.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, B: Balance, C, S: Storage<Value = V>> {
    raw: &'a RawTree<K, S, B, C>,
    front: Handle,
    back: Handle,
    remaining: usize,
    _marker: PhantomData<&'a V>,
}

/// An iterator over the keys of a [`Tree`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, B: Balance, C, S: Storage<Value = V>> {
    inner: Iter<'a, K, V, B, C, S>,
}

/// An iterator over the values of a [`Tree`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, B: Balance, C, S: Storage<Value = V>> {
    inner: Iter<'a, K, V, B, C, S>,
}

/// An owning iterator over the entries of a [`Tree`], sorted by key.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

impl<K, V, B: Balance> Tree<K, V, B, NaturalOrder, NodeValues<V>> {
    /// Makes a new, empty tree ordered by [`Ord`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.set("b", 2);
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TreeOptions::new())
    }

    /// Makes a new, empty tree with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(NaturalOrder, capacity),
            iteration_mode: IterationMode::Iterative,
            tag: next_tree_tag(),
            _values: PhantomData,
        }
    }
}

impl<K: Ord, V, B: Balance> Tree<K, V, B, NaturalOrder, NodeValues<V>> {
    /// Builds a tree from entries already in strictly ascending key order.
    ///
    /// Every entry is attached at the cached maximum, so no descent happens.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnsortedInput`] if a key is not greater than the one before it.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::{AvlTree, TreeError};
    ///
    /// let tree = AvlTree::from_sorted_entries([(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();
    /// assert_eq!(tree.height(), 2);
    ///
    /// let unsorted = AvlTree::from_sorted_entries([(1, 'a'), (1, 'b')]);
    /// assert_eq!(unsorted.unwrap_err(), TreeError::UnsortedInput { index: 1 });
    /// ```
    pub fn from_sorted_entries<I>(entries: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tree = Self::new();
        for (index, (key, value)) in entries.into_iter().enumerate() {
            if let Some(last) = tree.raw.header().max.real()
                && tree.raw.compare(&key, tree.raw.key(last)) != Ordering::Greater
            {
                return Err(TreeError::UnsortedInput { index });
            }
            tree.raw.insert(key, value);
        }
        Ok(tree)
    }
}

impl<K: Ord, B: Balance> Tree<K, (), B, NaturalOrder, NodeValues<()>> {
    /// Builds a tree of bare keys.
    pub fn from_keys<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut tree = Self::new();
        tree.set_many(keys.into_iter().map(|key| (key, ())));
        tree
    }
}

impl<K, V, B: Balance, C, S: Storage<Value = V>> Tree<K, V, B, C, S> {
    /// Makes a new, empty tree from explicit options.
    pub fn with_options(options: TreeOptions<C>) -> Self {
        Self {
            raw: RawTree::new(options.comparator),
            iteration_mode: options.iteration_mode,
            tag: next_tree_tag(),
            _values: PhantomData,
        }
    }

    /// The options this tree was built with.
    #[must_use]
    pub fn options(&self) -> TreeOptions<C>
    where
        C: Clone,
    {
        TreeOptions {
            comparator: self.raw.comparator().clone(),
            iteration_mode: self.iteration_mode,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of nodes the tree can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns `true` if values live inside the nodes rather than in an external store.
    #[must_use]
    pub const fn is_map_mode(&self) -> bool {
        S::MAP_MODE
    }

    /// The balancing strategy of this tree.
    #[must_use]
    pub const fn kind(&self) -> TreeKind {
        B::KIND
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
        // Slot generations restart with the arena.
        self.tag = next_tree_tag();
    }

    fn node_ref(&self, handle: Handle) -> NodeRef<'_, K, V> {
        NodeRef {
            id: self.id(handle),
            key: self.raw.key(handle),
            value: self.raw.value(handle),
            left: self.raw.left(handle).real().map(|h| self.id(h)),
            right: self.raw.right(handle).real().map(|h| self.id(h)),
            parent: self.raw.parent(handle).real().map(|h| self.id(h)),
        }
    }

    fn id(&self, handle: Handle) -> NodeId {
        NodeId {
            tree: self.tag,
            slot: handle.to_raw(),
            generation: self.raw.generation(handle),
        }
    }

    fn live(&self, id: NodeId) -> Result<Handle, TreeError> {
        let handle = id.handle();
        if id.tree == self.tag && self.raw.contains(handle) && self.raw.generation(handle) == id.generation {
            Ok(handle)
        } else {
            Err(TreeError::StaleNode(id))
        }
    }

    fn remove_handle(&mut self, handle: Handle) -> Deleted<K, V> {
        let (key, value, removal) = self.raw.remove(handle);
        Deleted {
            key,
            value,
            rebalance_root: removal.parent.real().map(|h| self.id(h)),
        }
    }

    /// Looks up a node by id. `None` if the id is stale.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, K, V>> {
        self.live(id).ok().map(|handle| self.node_ref(handle))
    }

    /// The root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.root().real().map(|handle| self.node_ref(handle))
    }

    /// The node with the smallest key.
    ///
    /// # Complexity
    ///
    /// O(1) - read from the extremum cache.
    #[must_use]
    pub fn first(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.header().min.real().map(|handle| self.node_ref(handle))
    }

    /// The node with the largest key.
    ///
    /// # Complexity
    ///
    /// O(1) - read from the extremum cache.
    #[must_use]
    pub fn last(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.header().max.real().map(|handle| self.node_ref(handle))
    }

    /// The in-order predecessor of `id`; `Ok(None)` at the minimum.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `id` is not a live node.
    pub fn predecessor(&self, id: NodeId) -> Result<Option<NodeRef<'_, K, V>>, TreeError> {
        let handle = self.live(id)?;
        Ok(self.raw.predecessor(handle).real().map(|handle| self.node_ref(handle)))
    }

    /// The in-order successor of `id`; `Ok(None)` at the maximum.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `id` is not a live node.
    pub fn successor(&self, id: NodeId) -> Result<Option<NodeRef<'_, K, V>>, TreeError> {
        let handle = self.live(id)?;
        Ok(self.raw.successor(handle).real().map(|handle| self.node_ref(handle)))
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// The iterator walks successor links starting from the cached extrema, so it is
    /// double-ended and knows its exact length.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::RedBlackTree;
    ///
    /// let tree = RedBlackTree::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some((&1, &"a")));
    /// assert_eq!(iter.next_back(), Some((&3, &"c")));
    /// assert_eq!(iter.len(), 1);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, B, C, S> {
        let header = self.raw.header();
        Iter {
            raw: &self.raw,
            front: header.min,
            back: header.max,
            remaining: self.raw.len(),
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V, B, C, S> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V, B, C, S> {
        Values { inner: self.iter() }
    }

    /// Visits every node depth-first in `order`, using the tree's configured
    /// [`IterationMode`].
    #[must_use]
    pub fn dfs(&self, order: DfsOrder) -> Vec<NodeRef<'_, K, V>> {
        self.dfs_with(order, self.iteration_mode)
    }

    /// Visits every node depth-first in `order` with an explicit [`IterationMode`].
    #[must_use]
    pub fn dfs_with(&self, order: DfsOrder, mode: IterationMode) -> Vec<NodeRef<'_, K, V>> {
        self.raw.dfs(order, mode).into_iter().map(|handle| self.node_ref(handle)).collect()
    }

    /// Visits every node depth-first in `order` using threaded (Morris) traversal.
    ///
    /// No stack is kept: empty child links temporarily point back at ancestors, which is why
    /// this needs `&mut self`. All links are restored before it returns.
    pub fn morris(&mut self, order: DfsOrder) -> Vec<NodeRef<'_, K, V>> {
        let handles = self.raw.morris(order);
        handles.into_iter().map(|handle| self.node_ref(handle)).collect()
    }

    /// Removes the node `id`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `id` is not a live node.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Deleted<K, V>, TreeError> {
        let handle = self.live(id)?;
        Ok(self.remove_handle(handle))
    }

    /// Removes every entry for which `predicate` returns `true`, in ascending key order.
    ///
    /// # Complexity
    ///
    /// O(n + m log n) for m removed entries.
    pub fn delete_where<F>(&mut self, mut predicate: F) -> Vec<Deleted<K, V>>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<Handle> = self
            .raw
            .in_order()
            .into_iter()
            .filter(|&handle| predicate(self.raw.key(handle), self.raw.value(handle)))
            .collect();
        doomed.into_iter().map(|handle| self.remove_handle(handle)).collect()
    }

    /// Removes the first entry, in ascending key order, for which `predicate` returns `true`.
    pub fn delete_first_where<F>(&mut self, mut predicate: F) -> Option<Deleted<K, V>>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut handle = self.raw.header().min;
        while !handle.is_nil() {
            if predicate(self.raw.key(handle), self.raw.value(handle)) {
                return Some(self.remove_handle(handle));
            }
            handle = self.raw.successor(handle);
        }
        None
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let min = self.raw.header().min.real()?;
        let (key, value, _) = self.raw.remove(min);
        Some((key, value))
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let max = self.raw.header().max.real()?;
        let (key, value, _) = self.raw.remove(max);
        Some((key, value))
    }

    /// Relinks the whole tree into one of minimal height. Keys, values and node ids are kept;
    /// AVL heights and red-black colors are recomputed.
    ///
    /// Mostly useful for [`Bst`], whose shape otherwise follows insertion order.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Bst;
    ///
    /// let mut tree: Bst<i32, ()> = (0..127).map(|key| (key, ())).collect();
    /// assert_eq!(tree.height(), 127);
    /// tree.perfectly_balance();
    /// assert_eq!(tree.height(), 7);
    /// ```
    pub fn perfectly_balance(&mut self) {
        self.raw.rebuild_balanced();
    }

    /// Recomputes the cached minimum and maximum from the tree shape. Returns `true` if the cache
    /// had drifted. Insertions already repair the cache whenever it fails a cheap sanity check.
    pub fn repair_cache(&mut self) -> bool {
        self.raw.repair_cache()
    }

    /// Builds a map-mode tree with the same shape, node ids and strategy whose values are
    /// `f(key, value)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::RedBlackTree;
    ///
    /// let tree = RedBlackTree::from([(1, 10), (2, 20)]);
    /// let halves = tree.map(|_, value| value / 2);
    /// assert_eq!(halves.get(&2), Some(&10));
    /// ```
    pub fn map<W, F>(&self, f: F) -> Tree<K, W, B, C, NodeValues<W>>
    where
        K: Clone,
        C: Clone,
        F: FnMut(&K, &V) -> W,
    {
        Tree {
            raw: self.raw.map_values(f),
            iteration_mode: self.iteration_mode,
            tag: next_tree_tag(),
            _values: PhantomData,
        }
    }
}

impl<K, V, B: Balance, C: Comparator<K>, S: Storage<Value = V>> Tree<K, V, B, C, S> {
    /// Inserts or updates `key`. Returns `true` if the key was not present before.
    ///
    /// Updating an existing key replaces its value in place; the tree shape does not change.
    ///
    /// # Complexity
    ///
    /// O(1) plus rebalancing for a key beyond the current minimum or maximum, O(log n) otherwise
    /// for balanced strategies.
    pub fn set(&mut self, key: K, value: V) -> bool {
        self.raw.insert(key, value).1.is_none()
    }

    /// Inserts or updates `key`, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value).1
    }

    /// Inserts or updates `key`, starting from `hint` instead of the root.
    ///
    /// When `key` belongs directly before or after `hint` in key order it is attached without a
    /// descent. Any other hint, including a stale id, falls back to [`Tree::set`]. Passing the
    /// id returned by the previous call makes sorted bulk loading cheap.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// let mut hint = tree.set_with_hint(0, "zero", None);
    /// for key in 1..100 {
    ///     hint = tree.set_with_hint(key, "n", Some(hint));
    /// }
    /// assert_eq!(tree.len(), 100);
    /// ```
    pub fn set_with_hint(&mut self, key: K, value: V, hint: Option<NodeId>) -> NodeId {
        let hint = hint.and_then(|id| self.live(id).ok()).unwrap_or(Handle::NIL);
        let node = self.raw.insert_with_hint(hint, key, value).0;
        self.id(node)
    }

    /// Inserts every entry.
    ///
    /// For [`Unbalanced`] trees the entries are first sorted and then inserted middle-first, so
    /// the plain tree ends up with minimal height. Later duplicates win, as with repeated
    /// [`Tree::set`].
    pub fn set_many<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        if B::KIND != TreeKind::Bst {
            for (key, value) in entries {
                self.raw.insert(key, value);
            }
            return;
        }

        let mut sorted: Vec<(K, V)> = entries.into_iter().collect();
        let cmp = self.raw.comparator();
        sorted.sort_by(|a, b| cmp.compare(&a.0, &b.0));
        let mut unique: Vec<(K, V)> = Vec::with_capacity(sorted.len());
        for entry in sorted {
            if let Some(last) = unique.last_mut()
                && self.raw.compare(&last.0, &entry.0) == Ordering::Equal
            {
                *last = entry;
            } else {
                unique.push(entry);
            }
        }
        let mut pending: Vec<Option<(K, V)>> = unique.into_iter().map(Some).collect();
        self.insert_middle_first(&mut pending);
    }

    fn insert_middle_first(&mut self, entries: &mut [Option<(K, V)>]) {
        if entries.is_empty() {
            return;
        }
        let mid = entries.len() / 2;
        if let Some((key, value)) = entries[mid].take() {
            self.raw.insert(key, value);
        }
        let (left, right) = entries.split_at_mut(mid);
        self.insert_middle_first(left);
        self.insert_middle_first(&mut right[1..]);
    }

    /// Returns a reference to the value of `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.raw.search(key).real().map(|handle| self.raw.value(handle))
    }

    /// Returns a mutable reference to the value of `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let handle = self.raw.search(key).real()?;
        Some(self.raw.value_mut(handle))
    }

    /// Returns the node holding `key`.
    #[must_use]
    pub fn get_node(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        self.raw.search(key).real().map(|handle| self.node_ref(handle))
    }

    /// Returns `true` if the tree contains `key`.
    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        !self.raw.search(key).is_nil()
    }

    fn navigate(&self, key: &K, relation: Relation) -> Option<NodeRef<'_, K, V>> {
        self.raw.navigate(key, relation).real().map(|handle| self.node_ref(handle))
    }

    /// The node with the greatest key `<= key`.
    #[must_use]
    pub fn floor(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        self.navigate(key, Relation::Floor)
    }

    /// The node with the least key `>= key`.
    #[must_use]
    pub fn ceiling(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        self.navigate(key, Relation::Ceiling)
    }

    /// The node with the least key `> key`.
    #[must_use]
    pub fn higher(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        self.navigate(key, Relation::Higher)
    }

    /// The node with the greatest key `< key`.
    #[must_use]
    pub fn lower(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        self.navigate(key, Relation::Lower)
    }

    fn check_range<R: RangeBounds<K>>(&self, range: &R) -> Result<(), TreeError> {
        if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
            (range.start_bound(), range.end_bound())
        {
            let order = self.raw.compare(start, end);
            let valid =
                if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                    order == Ordering::Less
                } else {
                    order != Ordering::Greater
                };
            if !valid {
                return Err(TreeError::InvalidRange);
            }
        }
        Ok(())
    }

    /// Returns, in ascending key order, every node whose key lies in `range`.
    ///
    /// Subtrees entirely outside the range are never visited.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidRange`] if the range starts after it ends.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Bst;
    ///
    /// let tree: Bst<i32, ()> = Bst::from_keys([10, 5, 15, 3, 7, 12, 20]);
    /// let keys: Vec<i32> = tree.range_search(5..=12).unwrap().iter().map(|node| *node.key).collect();
    /// assert_eq!(keys, [5, 7, 10, 12]);
    /// assert!(tree.range_search(12..5).is_err());
    /// ```
    pub fn range_search<R: RangeBounds<K>>(&self, range: R) -> Result<Vec<NodeRef<'_, K, V>>, TreeError> {
        self.check_range(&range)?;
        let handles = self.raw.range(range.start_bound(), range.end_bound());
        Ok(handles.into_iter().map(|handle| self.node_ref(handle)).collect())
    }

    /// Removes `key`. Deleting a missing key is a no-op returning `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::from([(1, "a"), (2, "b")]);
    /// let deleted = tree.delete(&1).unwrap();
    /// assert_eq!((deleted.key, deleted.value), (1, "a"));
    /// assert!(tree.delete(&1).is_none());
    /// ```
    pub fn delete(&mut self, key: &K) -> Option<Deleted<K, V>> {
        let handle = self.raw.search(key).real()?;
        Some(self.remove_handle(handle))
    }

    /// Removes every entry whose key lies in `range`, in ascending key order.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidRange`] if the range starts after it ends.
    pub fn delete_range<R: RangeBounds<K>>(&mut self, range: R) -> Result<Vec<Deleted<K, V>>, TreeError> {
        self.check_range(&range)?;
        let doomed = self.raw.range(range.start_bound(), range.end_bound());
        Ok(doomed.into_iter().map(|handle| self.remove_handle(handle)).collect())
    }

    /// Returns a tree of the same kind holding only the entries for which `predicate` returns
    /// `true`.
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        K: Clone,
        V: Clone,
        C: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        let mut result = Self::with_options(self.options());
        // Ascending input always lands on the cached maximum.
        for (key, value) in self.iter().filter(|(key, value)| predicate(*key, *value)) {
            result.raw.insert(key.clone(), value.clone());
        }
        result
    }
}

impl<K, V, C, S: Storage<Value = V>> Tree<K, V, RedBlack, C, S> {
    /// The color of node `id`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `id` is not a live node.
    pub fn color(&self, id: NodeId) -> Result<Color, TreeError> {
        Ok(self.raw.color(self.live(id)?))
    }
}

impl<K, V, C, S: Storage<Value = V>> Tree<K, V, Avl, C, S> {
    /// The stored height of node `id` (1 for a leaf).
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `id` is not a live node.
    pub fn node_height(&self, id: NodeId) -> Result<i32, TreeError> {
        Ok(self.raw.node_height(self.live(id)?))
    }

    /// `height(left) - height(right)` at node `id`; always within `-1..=1`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `id` is not a live node.
    pub fn balance_factor(&self, id: NodeId) -> Result<i32, TreeError> {
        Ok(self.raw.balance_factor(self.live(id)?))
    }
}

impl<K, V, B, C, S> Clone for Tree<K, V, B, C, S>
where
    K: Clone,
    B: Balance,
    C: Clone,
    S: Storage<Value = V> + Clone,
    S::Slot: Clone,
{
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            iteration_mode: self.iteration_mode,
            tag: next_tree_tag(),
            _values: PhantomData,
        }
    }
}

impl<K: PartialEq, V: PartialEq, B: Balance, C, S: Storage<Value = V>> PartialEq for Tree<K, V, B, C, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, B: Balance, C, S: Storage<Value = V>> Eq for Tree<K, V, B, C, S> {}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance, C, S: Storage<Value = V>> fmt::Debug for Tree<K, V, B, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, B: Balance, C: Default, S: Storage<Value = V>> Default for Tree<K, V, B, C, S> {
    fn default() -> Self {
        Self::with_options(TreeOptions::new().comparator(C::default()))
    }
}

impl<K, V, B: Balance, C: Comparator<K>, S: Storage<Value = V>> Index<&K> for Tree<K, V, B, C, S> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, B: Balance, C: Comparator<K> + Default, S: Storage<Value = V>> FromIterator<(K, V)> for Tree<K, V, B, C, S> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<K, V, B: Balance, C: Comparator<K>, S: Storage<Value = V>> Extend<(K, V)> for Tree<K, V, B, C, S> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.raw.insert(key, value);
        }
    }
}

impl<K: Ord, V, B: Balance, const N: usize> From<[(K, V); N]> for Tree<K, V, B, NaturalOrder, NodeValues<V>> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V, B: Balance, C, S: Storage<Value = V>> IntoIterator for &'a Tree<K, V, B, C, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, B, C, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, B: Balance, C, S: Storage<Value = V>> IntoIterator for Tree<K, V, B, C, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the tree, sorted by key.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K: 'a, V: 'a, B: Balance, C, S: Storage<Value = V>> Iterator for Iter<'a, K, V, B, C, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let raw = self.raw;
        let node = self.front;
        self.front = raw.successor(node);
        self.remaining -= 1;
        Some((raw.key(node), raw.value(node)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a, B: Balance, C, S: Storage<Value = V>> DoubleEndedIterator for Iter<'a, K, V, B, C, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let raw = self.raw;
        let node = self.back;
        self.back = raw.predecessor(node);
        self.remaining -= 1;
        Some((raw.key(node), raw.value(node)))
    }
}

impl<K, V, B: Balance, C, S: Storage<Value = V>> ExactSizeIterator for Iter<'_, K, V, B, C, S> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, B: Balance, C, S: Storage<Value = V>> FusedIterator for Iter<'_, K, V, B, C, S> {}

impl<K, V, B: Balance, C, S: Storage<Value = V>> Clone for Iter<'_, K, V, B, C, S> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<K, V, B: Balance, C, S: Storage<Value = V>> fmt::Debug for Iter<'_, K, V, B, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<'a, K: 'a, V: 'a, B: Balance, C, S: Storage<Value = V>> Iterator for Keys<'a, K, V, B, C, S> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, V: 'a, B: Balance, C, S: Storage<Value = V>> DoubleEndedIterator for Keys<'a, K, V, B, C, S> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V, B: Balance, C, S: Storage<Value = V>> ExactSizeIterator for Keys<'_, K, V, B, C, S> {}

impl<K, V, B: Balance, C, S: Storage<Value = V>> FusedIterator for Keys<'_, K, V, B, C, S> {}

impl<'a, K: 'a, V: 'a, B: Balance, C, S: Storage<Value = V>> Iterator for Values<'a, K, V, B, C, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, V: 'a, B: Balance, C, S: Storage<Value = V>> DoubleEndedIterator for Values<'a, K, V, B, C, S> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, B: Balance, C, S: Storage<Value = V>> ExactSizeIterator for Values<'_, K, V, B, C, S> {}

impl<K, V, B: Balance, C, S: Storage<Value = V>> FusedIterator for Values<'_, K, V, B, C, S> {}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}
