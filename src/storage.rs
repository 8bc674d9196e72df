//! Where a tree keeps its values.
//!
//! In map-mode ([`NodeValues`]) every value lives inside its node. In external-store mode
//! ([`StoreValues`]) a node only carries a slot handle and the value sits in a side arena, so
//! rotations and rebuilds relink nodes without ever touching the payload. Both modes run through
//! the same tree algorithms; only this trait differs.

use crate::raw::{Arena, Handle};

#[allow(unreachable_pub)]
mod sealed {
    pub trait Sealed {}
}

/// Value-storage strategy of a tree. Implemented by [`NodeValues`] and [`StoreValues`] only.
pub trait Storage: sealed::Sealed {
    /// The value type stored.
    type Value;
    /// What each node carries for its value.
    #[doc(hidden)]
    type Slot;
    /// `true` when values live inside the nodes.
    const MAP_MODE: bool;

    #[doc(hidden)]
    fn new() -> Self;
    #[doc(hidden)]
    fn with_capacity(capacity: usize) -> Self;
    #[doc(hidden)]
    fn store(&mut self, value: Self::Value) -> Self::Slot;
    #[doc(hidden)]
    fn get<'a>(&'a self, slot: &'a Self::Slot) -> &'a Self::Value;
    #[doc(hidden)]
    fn get_mut<'a>(&'a mut self, slot: &'a mut Self::Slot) -> &'a mut Self::Value;
    #[doc(hidden)]
    fn take(&mut self, slot: Self::Slot) -> Self::Value;
    #[doc(hidden)]
    fn clear(&mut self);

    #[doc(hidden)]
    fn replace(&mut self, slot: &mut Self::Slot, value: Self::Value) -> Self::Value {
        core::mem::replace(self.get_mut(slot), value)
    }
}

/// Map-mode storage: values are kept inline in the tree nodes.
pub struct NodeValues<V>(core::marker::PhantomData<V>);

impl<V> sealed::Sealed for NodeValues<V> {}

impl<V> Clone for NodeValues<V> {
    fn clone(&self) -> Self {
        Self(core::marker::PhantomData)
    }
}

impl<V> Storage for NodeValues<V> {
    type Value = V;
    type Slot = V;
    const MAP_MODE: bool = true;

    fn new() -> Self {
        Self(core::marker::PhantomData)
    }

    fn with_capacity(_capacity: usize) -> Self {
        Self::new()
    }

    #[inline]
    fn store(&mut self, value: V) -> V {
        value
    }

    #[inline]
    fn get<'a>(&'a self, slot: &'a V) -> &'a V {
        slot
    }

    #[inline]
    fn get_mut<'a>(&'a mut self, slot: &'a mut V) -> &'a mut V {
        slot
    }

    #[inline]
    fn take(&mut self, slot: V) -> V {
        slot
    }

    fn clear(&mut self) {}
}

/// External-store storage: nodes hold a handle into a separate value arena.
pub struct StoreValues<V> {
    values: Arena<V>,
}

impl<V> sealed::Sealed for StoreValues<V> {}

impl<V: Clone> Clone for StoreValues<V> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
        }
    }
}

#[cfg(test)]
impl<V> StoreValues<V> {
    /// Number of values held by the store.
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

impl<V> Storage for StoreValues<V> {
    type Value = V;
    type Slot = Handle;
    const MAP_MODE: bool = false;

    fn new() -> Self {
        Self { values: Arena::new() }
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Arena::with_capacity(capacity),
        }
    }

    #[inline]
    fn store(&mut self, value: V) -> Handle {
        self.values.alloc(value)
    }

    #[inline]
    fn get<'a>(&'a self, slot: &'a Handle) -> &'a V {
        self.values.get(*slot)
    }

    #[inline]
    fn get_mut<'a>(&'a mut self, slot: &'a mut Handle) -> &'a mut V {
        self.values.get_mut(*slot)
    }

    #[inline]
    fn take(&mut self, slot: Handle) -> V {
        self.values.take(slot)
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn node_values_pass_values_through() {
        let mut store: NodeValues<&str> = NodeValues::new();
        let mut slot = store.store("a");
        assert_eq!(*store.get(&slot), "a");
        assert_eq!(store.replace(&mut slot, "b"), "a");
        assert_eq!(store.take(slot), "b");
    }

    #[test]
    fn store_values_indirect_through_arena() {
        let mut store: StoreValues<&str> = StoreValues::new();
        let mut a = store.store("a");
        let b = store.store("b");
        assert_eq!(store.len(), 2);
        *store.get_mut(&mut a) = "aa";
        assert_eq!(*store.get(&a), "aa");
        assert_eq!(store.take(b), "b");
        assert_eq!(store.len(), 1);
        store.clear();
        assert_eq!(store.len(), 0);
    }
}
