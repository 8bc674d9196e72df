use alloc::vec::Vec;

use super::handle::Handle;

#[derive(Clone)]
struct Slot<T> {
    generation: u32,
    element: Option<T>,
}

/// Slot storage addressed by [`Handle`]. Freed slots go onto a free-list and are reused by the
/// next allocation, so handles stay small and stable while the element is alive.
///
/// Every slot counts how often it has been vacated. A handle plus the generation read at the
/// time it was issued tells a live element apart from a later occupant of the same slot.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()].element = Some(element);
            h
        } else {
            // Handle::MAX is the largest index a handle can encode.
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Slot {
                generation: 0,
                element: Some(element),
            });
            Handle::from_index(self.slots.len() - 1)
        }
    }

    /// Returns true if `handle` names an occupied slot of this arena.
    #[inline]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        !handle.is_nil() && self.slots.get(handle.to_index()).is_some_and(|slot| slot.element.is_some())
    }

    /// The number of times the slot behind `handle` has been vacated.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> u32 {
        self.slots[handle.to_index()].generation
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].element.as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].element.as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.to_index()];
        let element = slot.element.take().expect("`Arena::take()` - `handle` is invalid!");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle);
        element
    }

    #[cfg(test)]
    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Builds a new arena with the same slot layout, converting every live element with `f`.
    /// Handles into `self` stay valid for the result.
    pub(crate) fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Arena<U> {
        Arena {
            slots: self
                .slots
                .iter()
                .map(|slot| Slot {
                    generation: slot.generation,
                    element: slot.element.as_ref().map(&mut f),
                })
                .collect(),
            free: self.free.clone(),
        }
    }
}
