#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Index of a node slot in the tree's arena.
///
/// Raw value `0` is reserved for the NIL sentinel; real slots are stored as `index + 1`, so a
/// NIL comparison is a plain integer equality check.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Handle(RawHandle);

impl Handle {
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;
    pub(crate) const NIL: Self = Self(0);

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self((index + 1) as RawHandle)
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        assert!(!self.is_nil(), "`Handle::to_index()` - NIL has no slot!");
        (self.0 - 1) as usize
    }

    #[inline]
    pub(crate) const fn is_nil(self) -> bool {
        self.0 == 0
    }

    /// Converts a NIL handle into `None`.
    #[inline]
    pub(crate) const fn real(self) -> Option<Self> {
        if self.is_nil() { None } else { Some(self) }
    }

    #[inline]
    pub(crate) const fn to_raw(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_raw(raw: u32) -> Option<Self> {
        if raw == 0 || raw as usize > Self::MAX + 1 {
            None
        } else {
            Some(Self(raw as RawHandle))
        }
    }
}
