use core::fmt;
use core::iter::FusedIterator;
use core::ops::RangeBounds;

use alloc::vec::Vec;

use crate::balance::RedBlack;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::options::TreeOptions;
use crate::storage::NodeValues;
use crate::tree::{self, RedBlackTree};

/// An ordered set based on a red-black [`Tree`](crate::Tree) of bare keys.
///
/// # Examples
///
/// ```
/// use ordered_tree::TreeSet;
///
/// let mut books = TreeSet::new();
/// books.add("A Dance With Dragons");
/// books.add("To Kill a Mockingbird");
/// books.add("The Odyssey");
///
/// assert!(books.has(&"The Odyssey"));
/// assert!(!books.add("The Odyssey"));
/// assert_eq!(books.first(), Some(&"A Dance With Dragons"));
/// assert_eq!(books.higher(&"The Odyssey"), Some(&"To Kill a Mockingbird"));
/// ```
pub struct TreeSet<K, C = NaturalOrder> {
    tree: RedBlackTree<K, (), C>,
}

/// An iterator over the keys of a [`TreeSet`], in ascending order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, C> {
    inner: tree::Keys<'a, K, (), RedBlack, C, NodeValues<()>>,
}

/// An owning iterator over the keys of a [`TreeSet`].
pub struct IntoIter<K> {
    inner: tree::IntoIter<K, ()>,
}

impl<K> TreeSet<K> {
    /// Makes a new, empty set ordered by [`Ord`].
    #[must_use]
    pub fn new() -> Self {
        Self { tree: RedBlackTree::new() }
    }
}

impl<K, C> TreeSet<K, C> {
    /// Makes a new, empty set from explicit options.
    pub fn with_options(options: TreeOptions<C>) -> Self {
        Self {
            tree: RedBlackTree::with_options(options),
        }
    }

    /// Returns the number of keys.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// The smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.tree.first().map(|node| node.key)
    }

    /// The largest key.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.tree.last().map(|node| node.key)
    }

    pub fn pop_first(&mut self) -> Option<K> {
        self.tree.pop_first().map(|(key, ())| key)
    }

    pub fn pop_last(&mut self) -> Option<K> {
        self.tree.pop_last().map(|(key, ())| key)
    }

    /// Gets an iterator over the keys, in ascending order.
    pub fn iter(&self) -> Iter<'_, K, C> {
        Iter { inner: self.tree.keys() }
    }
}

impl<K, C: Comparator<K>> TreeSet<K, C> {
    /// Adds `key`. Returns `true` if it was not present.
    pub fn add(&mut self, key: K) -> bool {
        self.tree.set(key, ())
    }

    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        self.tree.has(key)
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.tree.delete(key).is_some()
    }

    #[must_use]
    pub fn floor(&self, key: &K) -> Option<&K> {
        self.tree.floor(key).map(|node| node.key)
    }

    #[must_use]
    pub fn ceiling(&self, key: &K) -> Option<&K> {
        self.tree.ceiling(key).map(|node| node.key)
    }

    #[must_use]
    pub fn higher(&self, key: &K) -> Option<&K> {
        self.tree.higher(key).map(|node| node.key)
    }

    #[must_use]
    pub fn lower(&self, key: &K) -> Option<&K> {
        self.tree.lower(key).map(|node| node.key)
    }

    /// Keys within `range`, ascending.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidRange`] if the range starts after it ends.
    pub fn range_search<R: RangeBounds<K>>(&self, range: R) -> Result<Vec<&K>, TreeError> {
        Ok(self.tree.range_search(range)?.into_iter().map(|node| node.key).collect())
    }

    /// Removes every key for which `predicate` returns `true`, returning them in ascending order.
    pub fn delete_where<F>(&mut self, mut predicate: F) -> Vec<K>
    where
        F: FnMut(&K) -> bool,
    {
        self.tree
            .delete_where(|key, ()| predicate(key))
            .into_iter()
            .map(|deleted| deleted.key)
            .collect()
    }
}

impl<K: Clone, C: Clone> Clone for TreeSet<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: PartialEq, C> PartialEq for TreeSet<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, C> Eq for TreeSet<K, C> {}

impl<K: fmt::Debug, C> fmt::Debug for TreeSet<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, C: Default> Default for TreeSet<K, C> {
    fn default() -> Self {
        Self { tree: Default::default() }
    }
}

impl<K, C: Comparator<K> + Default> FromIterator<K> for TreeSet<K, C> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K, C: Comparator<K>> Extend<K> for TreeSet<K, C> {
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for TreeSet<K> {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<'a, K, C> IntoIterator for &'a TreeSet<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, C> IntoIterator for TreeSet<K, C> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> IntoIter<K> {
        IntoIter {
            inner: self.tree.into_iter(),
        }
    }
}

impl<'a, K: 'a, C> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, C> DoubleEndedIterator for Iter<'a, K, C> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back()
    }
}

impl<K, C> ExactSizeIterator for Iter<'_, K, C> {}

impl<K, C> FusedIterator for Iter<'_, K, C> {}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, ())| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(key, ())| key)
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}
