use core::fmt;
use core::iter::FusedIterator;

use alloc::collections::VecDeque;
use alloc::collections::vec_deque;

use crate::balance::RedBlack;
use crate::comparator::{Comparator, NaturalOrder};
use crate::options::TreeOptions;
use crate::storage::StoreValues;
use crate::tree::{self, Tree};

type Buckets<K, V, C> = Tree<K, VecDeque<V>, RedBlack, C, StoreValues<VecDeque<V>>>;

/// An ordered map from each key to one or more values.
///
/// Backed by a red-black tree in external-store mode: every node keeps only its key and a handle
/// to the key's bucket of values, so rebalancing never moves a bucket. Values under one key keep
/// their insertion order, and the oldest value leaves first.
///
/// # Examples
///
/// ```
/// use ordered_tree::TreeMultiMap;
///
/// let mut log = TreeMultiMap::new();
/// log.add(2, "b1");
/// log.add(1, "a");
/// log.add(2, "b2");
///
/// assert_eq!(log.get(&2).unwrap(), &["b1", "b2"]);
/// assert_eq!(log.len(), 3);
/// assert_eq!(log.distinct_len(), 2);
/// assert_eq!(log.delete_one(&2), Some("b1"));
///
/// let flat: Vec<_> = log.iter().collect();
/// assert_eq!(flat, [(&1, &"a"), (&2, &"b2")]);
/// ```
pub struct TreeMultiMap<K, V, C = NaturalOrder> {
    tree: Buckets<K, V, C>,
    len: usize,
}

/// An iterator over every `(key, value)` pair of a [`TreeMultiMap`]: ascending keys, then
/// insertion order within a key.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C> {
    buckets: tree::Iter<'a, K, VecDeque<V>, RedBlack, C, StoreValues<VecDeque<V>>>,
    current: Option<(&'a K, vec_deque::Iter<'a, V>)>,
    remaining: usize,
}

impl<K, V> TreeMultiMap<K, V> {
    /// Makes a new, empty multimap ordered by [`Ord`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TreeOptions::new())
    }
}

impl<K, V, C> TreeMultiMap<K, V, C> {
    /// Makes a new, empty multimap from explicit options.
    pub fn with_options(options: TreeOptions<C>) -> Self {
        Self {
            tree: Tree::with_options(options),
            len: 0,
        }
    }

    /// Total number of values across all keys.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Number of distinct keys.
    #[must_use]
    pub const fn distinct_len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.len = 0;
    }

    /// The smallest key and its values.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &VecDeque<V>)> {
        self.tree.first().map(|node| (node.key, node.value))
    }

    /// The largest key and its values.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &VecDeque<V>)> {
        self.tree.last().map(|node| (node.key, node.value))
    }

    /// Gets an iterator over every `(key, value)` pair.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            buckets: self.tree.iter(),
            current: None,
            remaining: self.len,
        }
    }

    /// Gets an iterator over the distinct keys, ascending.
    pub fn keys(&self) -> tree::Keys<'_, K, VecDeque<V>, RedBlack, C, StoreValues<VecDeque<V>>> {
        self.tree.keys()
    }
}

impl<K, V, C: Comparator<K>> TreeMultiMap<K, V, C> {
    /// Appends `value` to the bucket of `key`.
    pub fn add(&mut self, key: K, value: V) {
        if let Some(bucket) = self.tree.get_mut(&key) {
            bucket.push_back(value);
        } else {
            self.tree.set(key, VecDeque::from([value]));
        }
        self.len += 1;
    }

    /// All values under `key`, oldest first.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&VecDeque<V>> {
        self.tree.get(key)
    }

    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        self.tree.has(key)
    }

    /// Number of values under `key`.
    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        self.get(key).map_or(0, VecDeque::len)
    }

    /// Removes `key` with all its values.
    pub fn delete(&mut self, key: &K) -> VecDeque<V> {
        let values = self.tree.delete(key).map(|deleted| deleted.value).unwrap_or_default();
        self.len -= values.len();
        values
    }

    /// Removes the oldest value under `key`; the key goes away with its last value.
    pub fn delete_one(&mut self, key: &K) -> Option<V> {
        let bucket = self.tree.get_mut(key)?;
        let value = bucket.pop_front()?;
        if bucket.is_empty() {
            self.tree.delete(key);
        }
        self.len -= 1;
        Some(value)
    }

    /// The greatest key `<= key` and its values.
    #[must_use]
    pub fn floor(&self, key: &K) -> Option<(&K, &VecDeque<V>)> {
        self.tree.floor(key).map(|node| (node.key, node.value))
    }

    /// The least key `>= key` and its values.
    #[must_use]
    pub fn ceiling(&self, key: &K) -> Option<(&K, &VecDeque<V>)> {
        self.tree.ceiling(key).map(|node| (node.key, node.value))
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for TreeMultiMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            len: self.len,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for TreeMultiMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.tree.iter()).finish()
    }
}

impl<K, V, C: Default> Default for TreeMultiMap<K, V, C> {
    fn default() -> Self {
        Self {
            tree: Tree::default(),
            len: 0,
        }
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for TreeMultiMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for TreeMultiMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a TreeMultiMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: 'a, V: 'a, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = &mut self.current
                && let Some(value) = values.next()
            {
                self.remaining -= 1;
                return Some((*key, value));
            }
            let (key, bucket) = self.buckets.next()?;
            self.current = Some((key, bucket.iter()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}
