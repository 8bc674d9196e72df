use super::handle::Handle;

/// Red-black node color. NIL is always [`Color::Black`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Self::Red)
    }

    #[must_use]
    pub const fn is_black(self) -> bool {
        matches!(self, Self::Black)
    }
}

/// A binary search tree node living in the arena.
///
/// `slot` is whatever the storage mode keeps per node: the value itself in map-mode, a handle into
/// the external value store otherwise. `meta` is the balancing strategy's bookkeeping (color,
/// height or nothing). Keys are never reassigned after creation.
#[derive(Clone)]
pub(crate) struct Node<K, T, M> {
    key: K,
    pub(crate) slot: T,
    pub(crate) meta: M,
    left: Handle,
    right: Handle,
    parent: Handle,
}

impl<K, T, M> Node<K, T, M> {
    /// Creates a detached leaf.
    pub(crate) const fn new(key: K, slot: T, meta: M) -> Self {
        Self {
            key,
            slot,
            meta,
            left: Handle::NIL,
            right: Handle::NIL,
            parent: Handle::NIL,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn left(&self) -> Handle {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Handle {
        self.right
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Handle {
        self.parent
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Handle) {
        self.left = left;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Handle) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Handle) {
        self.parent = parent;
    }

    /// Returns the child on the requested side.
    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Handle {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn into_parts(self) -> (K, T) {
        (self.key, self.slot)
    }
}

/// Which child slot of a parent a node hangs from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}
