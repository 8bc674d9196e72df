use core::fmt;
use core::iter::FusedIterator;

use crate::balance::RedBlack;
use crate::comparator::{Comparator, NaturalOrder};
use crate::options::TreeOptions;
use crate::storage::NodeValues;
use crate::tree::{self, RedBlackTree};

/// An ordered multiset: each distinct key is stored once, with its multiplicity.
///
/// # Examples
///
/// ```
/// use ordered_tree::TreeMultiSet;
///
/// let mut words = TreeMultiSet::new();
/// for word in ["b", "a", "b", "c", "b"] {
///     words.add(word);
/// }
/// assert_eq!(words.count(&"b"), 3);
/// assert_eq!(words.len(), 5);
/// assert_eq!(words.distinct_len(), 3);
///
/// words.delete_one(&"b");
/// let all: Vec<_> = words.iter().copied().collect();
/// assert_eq!(all, ["a", "b", "b", "c"]);
/// ```
pub struct TreeMultiSet<K, C = NaturalOrder> {
    tree: RedBlackTree<K, usize, C>,
    len: usize,
}

/// An iterator over a [`TreeMultiSet`] that yields each key as often as it was added.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, C> {
    counts: tree::Iter<'a, K, usize, RedBlack, C, NodeValues<usize>>,
    current: Option<(&'a K, usize)>,
    remaining: usize,
}

impl<K> TreeMultiSet<K> {
    /// Makes a new, empty multiset ordered by [`Ord`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TreeOptions::new())
    }
}

impl<K, C> TreeMultiSet<K, C> {
    /// Makes a new, empty multiset from explicit options.
    pub fn with_options(options: TreeOptions<C>) -> Self {
        Self {
            tree: RedBlackTree::with_options(options),
            len: 0,
        }
    }

    /// Total multiplicity.
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

    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.tree.first().map(|node| node.key)
    }

    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.tree.last().map(|node| node.key)
    }

    /// Gets an iterator yielding every key once per occurrence, ascending.
    pub fn iter(&self) -> Iter<'_, K, C> {
        Iter {
            counts: self.tree.iter(),
            current: None,
            remaining: self.len,
        }
    }

    /// Gets an iterator over `(key, count)` pairs, ascending.
    pub fn counts(&self) -> tree::Iter<'_, K, usize, RedBlack, C, NodeValues<usize>> {
        self.tree.iter()
    }
}

impl<K, C: Comparator<K>> TreeMultiSet<K, C> {
    /// Adds one occurrence of `key`, returning its new count.
    pub fn add(&mut self, key: K) -> usize {
        self.add_n(key, 1)
    }

    /// Adds `n` occurrences of `key`, returning its new count. Adding zero leaves the set
    /// unchanged.
    pub fn add_n(&mut self, key: K, n: usize) -> usize {
        if n == 0 {
            return self.count(&key);
        }
        self.len += n;
        if let Some(count) = self.tree.get_mut(&key) {
            *count += n;
            *count
        } else {
            self.tree.set(key, n);
            n
        }
    }

    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        self.tree.get(key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        self.tree.has(key)
    }

    /// Removes one occurrence of `key`. Returns `false` if it was absent.
    pub fn delete_one(&mut self, key: &K) -> bool {
        let Some(count) = self.tree.get_mut(key) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.tree.delete(key);
        }
        self.len -= 1;
        true
    }

    /// Removes every occurrence of `key`, returning how many there were.
    pub fn delete_all(&mut self, key: &K) -> usize {
        let removed = self.tree.delete(key).map_or(0, |deleted| deleted.value);
        self.len -= removed;
        removed
    }

    /// The greatest key `<= key`.
    #[must_use]
    pub fn floor(&self, key: &K) -> Option<&K> {
        self.tree.floor(key).map(|node| node.key)
    }

    /// The least key `>= key`.
    #[must_use]
    pub fn ceiling(&self, key: &K) -> Option<&K> {
        self.tree.ceiling(key).map(|node| node.key)
    }
}

impl<K: Clone, C: Clone> Clone for TreeMultiSet<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            len: self.len,
        }
    }
}

impl<K: PartialEq, C> PartialEq for TreeMultiSet<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, C> Eq for TreeMultiSet<K, C> {}

impl<K: fmt::Debug, C> fmt::Debug for TreeMultiSet<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.tree.iter()).finish()
    }
}

impl<K, C: Default> Default for TreeMultiSet<K, C> {
    fn default() -> Self {
        Self {
            tree: RedBlackTree::default(),
            len: 0,
        }
    }
}

impl<K, C: Comparator<K> + Default> FromIterator<K> for TreeMultiSet<K, C> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K, C: Comparator<K>> Extend<K> for TreeMultiSet<K, C> {
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<'a, K, C> IntoIterator for &'a TreeMultiSet<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: 'a, C> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            if let Some((key, left)) = &mut self.current
                && *left > 0
            {
                *left -= 1;
                self.remaining -= 1;
                return Some(*key);
            }
            let (key, count) = self.counts.next()?;
            self.current = Some((key, *count));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, C> ExactSizeIterator for Iter<'_, K, C> {}

impl<K, C> FusedIterator for Iter<'_, K, C> {}
