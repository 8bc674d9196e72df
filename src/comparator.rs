use core::cmp::Ordering;
use core::fmt;

/// A total order over keys of type `K`.
///
/// Every tree is parameterized by a comparator. [`NaturalOrder`] defers to [`Ord`]; closures are
/// wrapped in [`FnComparator`].
///
/// It is a logic error for a comparator to be inconsistent (non-transitive, or to change its
/// answer for the same pair of keys while they are in a tree). The behavior resulting from such a
/// logic error is not specified, but will not result in undefined behavior.
pub trait Comparator<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The comparator used when none is given: the key type's [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Adapts a closure `Fn(&K, &K) -> Ordering` into a [`Comparator`].
///
/// # Examples
///
/// ```
/// use ordered_tree::{Comparator, FnComparator};
///
/// let reverse = FnComparator(|a: &i32, b: &i32| b.cmp(a));
/// assert!(reverse.compare(&1, &2).is_gt());
/// ```
#[derive(Clone, Copy)]
pub struct FnComparator<F>(pub F);

impl<K: ?Sized, F> Comparator<K> for FnComparator<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator(..)")
    }
}
