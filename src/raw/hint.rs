use core::cmp::Ordering;

use tracing::trace;

use super::handle::Handle;
use super::node::Side;
use super::raw_tree::RawTree;
use crate::balance::Balance;
use crate::comparator::Comparator;
use crate::storage::Storage;

impl<K, S: Storage, B: Balance, C: Comparator<K>> RawTree<K, S, B, C> {
    /// Inserts `key` next to `hint` without a top-down search when `key` belongs directly before
    /// or after it. Any other hint (freed, foreign, not adjacent) degrades to [`RawTree::insert`].
    pub(crate) fn insert_with_hint(&mut self, hint: Handle, key: K, value: S::Value) -> (Handle, Option<S::Value>) {
        if !self.contains(hint) {
            trace!(?hint, "hint is not a live node, falling back to descent");
            return self.insert(key, value);
        }
        if !self.cache_is_plausible() {
            self.repair_cache();
        }

        let side = match self.compare(&key, self.key(hint)) {
            Ordering::Equal => return (hint, Some(self.replace_value(hint, value))),
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
        };

        // The in-order neighbour on the same side bounds the gap `key` must fall into.
        let neighbour = match side {
            Side::Left => self.predecessor(hint),
            Side::Right => self.successor(hint),
        };
        if !neighbour.is_nil() {
            let outside = match side {
                Side::Left => Ordering::Less,
                Side::Right => Ordering::Greater,
            };
            let order = self.compare(&key, self.key(neighbour));
            if order == Ordering::Equal {
                return (neighbour, Some(self.replace_value(neighbour, value)));
            }
            if order == outside {
                trace!(?hint, "key is not adjacent to hint, falling back to descent");
                return self.insert(key, value);
            }
        }

        // Between `neighbour` and `hint` exactly one of the two facing slots is empty.
        let node = if self.child(hint, side).is_nil() {
            self.attach(hint, side, key, value)
        } else {
            self.attach(neighbour, side.flip(), key, value)
        };
        (node, None)
    }
}
